use bees::{app, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bees=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    db::ensure_schema(&state.db).await?;
    db::migrate_role_column(&state.db).await;
    db::seed_superadmins(&state.db).await;
    tracing::info!(
        users = db::user_count_or_zero(&state.db).await,
        students = db::student_count_or_zero(&state.db).await,
        "database ready"
    );

    let db = state.db.clone();
    let router = app::build_app(state);
    app::serve(router).await?;

    db.close().await;
    tracing::info!("database connection closed");
    Ok(())
}
