// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, config::AppState};

// GET /api/health
// Faz uma ida ao banco: pool morto aparece como 500.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Serviço e banco respondendo", body = String),
        (status = 500, description = "Banco indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok((StatusCode::OK, "OK"))
}
