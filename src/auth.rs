pub mod token;

use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::Principal;
use crate::service::auth::AuthService;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Parameter, ParameterValue};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use sqlx::PgPool;
use token::TokenService;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub(crate) fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// The raw bearer token, if the request carried one. Never fails.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let token = req.headers().get_one("Authorization").and_then(parse_bearer).map(str::to_string);
        Outcome::Success(BearerToken(token))
    }
}

async fn authenticate(req: &Request<'_>, token: &str) -> Result<Option<Principal>, AppError> {
    let (Some(pool), Some(tokens)) = (req.rocket().state::<PgPool>(), req.rocket().state::<TokenService>()) else {
        return Err(AppError::configuration("database pool or token service not managed"));
    };

    let repo = PostgresRepository { pool: pool.clone() };
    match AuthService::new(&repo, tokens).authenticate(token).await {
        Ok(principal) => {
            req.local_cache(|| Some(principal.clone()));
            Ok(Some(principal))
        }
        Err(AppError::Unauthorized) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The authenticated caller, or `None` when the token is missing or rejected.
/// Used by the setup endpoints, which are open during first run.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for MaybeUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization").and_then(parse_bearer) else {
            return Outcome::Success(MaybeUser(None));
        };

        match authenticate(req, token).await {
            Ok(principal) => Outcome::Success(MaybeUser(principal)),
            Err(e) => Outcome::Error((Status::InternalServerError, e)),
        }
    }
}

/// `Authorization` as an optional header, for routes that also serve anonymous callers.
fn optional_bearer_header(generator: &mut OpenApiGenerator) -> RequestHeaderInput {
    RequestHeaderInput::Parameter(Parameter {
        name: "Authorization".to_string(),
        location: "header".to_string(),
        description: Some("Optional `Bearer <token>` from POST /api/login.".to_string()),
        required: false,
        deprecated: false,
        allow_empty_value: false,
        value: ParameterValue::Schema {
            style: None,
            explode: None,
            allow_reserved: false,
            schema: generator.json_schema::<String>(),
            example: None,
            examples: None,
        },
        extensions: Object::default(),
    })
}

impl<'a> OpenApiFromRequest<'a> for BearerToken {
    fn from_request_input(generator: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(optional_bearer_header(generator))
    }
}

impl<'a> OpenApiFromRequest<'a> for MaybeUser {
    fn from_request_input(generator: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(optional_bearer_header(generator))
    }
}
