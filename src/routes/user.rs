use crate::auth::MaybeUser;
use crate::auth::token::TokenService;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::init::SuccessResponse;
use crate::models::user::{LoginRequest, LoginResponse, SaveUserRequest};
use crate::service::auth::AuthService;
use crate::service::user;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Exchange handle and password for a 30-day bearer token
#[openapi(tag = "Authentication")]
#[post("/login", data = "<payload>")]
pub async fn login(pool: &State<PgPool>, tokens: &State<TokenService>, payload: Json<LoginRequest>) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let token = AuthService::new(&repo, tokens.inner())
        .login(&payload.user_handle, &payload.user_password)
        .await?;

    Ok(Json(LoginResponse { success: true, token }))
}

/// Register a user (open during first run, administrators only afterwards)
#[openapi(tag = "Users")]
#[post("/save-user", data = "<payload>")]
pub async fn save_user(pool: &State<PgPool>, caller: MaybeUser, payload: Json<SaveUserRequest>) -> Result<Json<SuccessResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    user::register(&repo, caller.0.as_ref(), &payload).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![login, save_user]
}
