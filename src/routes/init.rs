use crate::auth::BearerToken;
use crate::auth::token::TokenService;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::init::InitStatus;
use crate::service::init_state;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Report whether first-run setup is pending and whether the bearer token is live
#[openapi(tag = "Initialization")]
#[get("/check-init")]
pub async fn check_init(pool: &State<PgPool>, tokens: &State<TokenService>, bearer: BearerToken) -> Result<Json<InitStatus>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let status = init_state::resolve(&repo, tokens.inner(), bearer.0.as_deref()).await?;
    Ok(Json(status))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![check_init]
}
