use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::health::{DbStatusResponse, HealthResponse};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::error;

/// Liveness probe; 503 while the database is unreachable
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn healthcheck(pool: &State<PgPool>) -> Custom<Json<HealthResponse>> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    match repo.server_time().await {
        Ok(_) => Custom(Status::Ok, Json(HealthResponse { status: "ok".to_string() })),
        Err(e) => {
            error!(error = %e, "health check failed");
            Custom(
                Status::ServiceUnavailable,
                Json(HealthResponse {
                    status: "offline".to_string(),
                }),
            )
        }
    }
}

/// Database status and server time for the status panel
#[openapi(tag = "Health")]
#[get("/test-db")]
pub async fn test_db(pool: &State<PgPool>) -> Result<Json<DbStatusResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let server_time = repo.server_time().await.map_err(|e| AppError::offline("Database connection failed", e))?;

    Ok(Json(DbStatusResponse {
        status: "Online".to_string(),
        server_time,
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck, test_db]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::database_client;
    use rocket::http::Status;
    use serde_json::Value;

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn health_and_status_panel_report_online() {
        let client = database_client().await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = client.get("/api/test-db").dispatch().await.into_json().await.unwrap();
        assert_eq!(body["status"], "Online");
        assert!(body["serverTime"].as_str().is_some_and(|t| t.len() == 19));
    }
}
