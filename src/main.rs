use asistenti::{app, db, social::challenges, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "asistenti=debug,axum=info,tower_http=info".to_string());
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
    db::migrate(&state.db).await?;

    if let Err(e) = challenges::ensure_weekly_challenge(&state.db).await {
        tracing::warn!(error = %e, "seeding weekly challenge failed; continuing");
    }

    app::serve(app::build_app(state)).await
}
