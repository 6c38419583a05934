use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::UpsertAction;

use super::repo::{NewStudent, Student};

/// Body of `POST /api/students`. Everything is optional at the serde level
/// so that missing fields surface as one 400 listing the required set
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub zeta_id: Option<String>,
}

pub const REQUIRED_FIELDS: &[&str] = &["name", "first_name", "last_name", "email", "zeta_id"];

impl CreateStudentRequest {
    /// Names of required fields that are absent or blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.first_name) {
            missing.push("first_name");
        }
        if blank(&self.last_name) {
            missing.push("last_name");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if blank(&self.zeta_id) {
            missing.push("zeta_id");
        }
        missing
    }

    /// Borrow the validated fields. Call only after `missing_required`
    /// returned empty.
    pub fn as_input(&self) -> NewStudent<'_> {
        NewStudent {
            name: self.name.as_deref().unwrap_or_default(),
            phone: self.phone.as_deref().filter(|p| !p.trim().is_empty()),
            first_name: self.first_name.as_deref().unwrap_or_default(),
            last_name: self.last_name.as_deref().unwrap_or_default(),
            email: self.email.as_deref().unwrap_or_default(),
            address: self.address.as_deref().filter(|a| !a.trim().is_empty()),
            zeta_id: self.zeta_id.as_deref().unwrap_or_default(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    pub success: bool,
    pub count: i64,
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub success: bool,
    pub student: Student,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UpsertData {
    pub action: UpsertAction,
    #[serde(flatten)]
    pub student: Student,
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
    pub message: String,
    pub data: UpsertData,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}
