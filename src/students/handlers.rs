use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::dto::{
    is_valid_email, CountResponse, CreateStudentRequest, DeleteResponse, StudentResponse,
    StudentsResponse, UpsertData, UpsertResponse, REQUIRED_FIELDS,
};
use super::repo::Student;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/count", get(student_count))
        .route(
            "/students/email/:email",
            get(get_by_email).delete(delete_by_email),
        )
        .route(
            "/students/zeta/:zeta_id",
            get(get_by_zeta).delete(delete_by_zeta),
        )
}

#[instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<StudentsResponse>> {
    let students = Student::list_all(&state.db).await?;
    let count = Student::count(&state.db).await?;
    Ok(Json(StudentsResponse {
        success: true,
        count,
        students,
    }))
}

#[instrument(skip(state))]
pub async fn student_count(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = Student::count(&state.db).await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

#[instrument(skip(state))]
pub async fn get_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<StudentResponse>> {
    match Student::get_by_email(&state.db, &email).await? {
        Some(student) => Ok(Json(StudentResponse {
            success: true,
            student,
        })),
        None => Err(ApiError::not_found("Student", "email", email)),
    }
}

#[instrument(skip(state))]
pub async fn get_by_zeta(
    State(state): State<AppState>,
    Path(zeta_id): Path<String>,
) -> ApiResult<Json<StudentResponse>> {
    match Student::get_by_zeta_id(&state.db, &zeta_id).await? {
        Some(student) => Ok(Json(StudentResponse {
            success: true,
            student,
        })),
        None => Err(ApiError::not_found("Student", "zetaId", zeta_id)),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<CreateStudentRequest>,
) -> ApiResult<(StatusCode, Json<UpsertResponse>)> {
    let missing = payload.missing_required();
    if !missing.is_empty() {
        warn!(?missing, "student payload incomplete");
        return Err(ApiError::MissingFields(REQUIRED_FIELDS.to_vec()));
    }

    let input = payload.as_input();
    if !is_valid_email(input.email) {
        return Err(ApiError::Validation {
            error: "Invalid email",
            details: None,
        });
    }

    match Student::upsert(&state.db, input).await {
        Ok((action, student)) => {
            info!(zeta_id = %student.zeta_id, action = action.as_str(), "student saved");
            Ok((
                StatusCode::CREATED,
                Json(UpsertResponse {
                    success: true,
                    message: format!("Student {} successfully", action.as_str()),
                    data: UpsertData { action, student },
                }),
            ))
        }
        Err(e) => {
            warn!(error = %e, "student upsert rejected");
            Err(ApiError::Validation {
                error: "Failed to save student",
                details: Some(e.to_string()),
            })
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if Student::delete_by_email(&state.db, &email).await? {
        info!(%email, "student deleted");
        Ok(Json(DeleteResponse {
            success: true,
            message: "Student deleted successfully".into(),
        }))
    } else {
        Err(ApiError::not_found("Student", "email", email))
    }
}

#[instrument(skip(state))]
pub async fn delete_by_zeta(
    State(state): State<AppState>,
    Path(zeta_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if Student::delete_by_zeta_id(&state.db, &zeta_id).await? {
        info!(%zeta_id, "student deleted");
        Ok(Json(DeleteResponse {
            success: true,
            message: "Student deleted successfully".into(),
        }))
    } else {
        Err(ApiError::not_found("Student", "zetaId", zeta_id))
    }
}
