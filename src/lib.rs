mod auth;
pub mod client;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::app_error::AppError;
pub use models::health::DbStatusResponse;
pub use models::init::{InitStatus, SuccessResponse};
pub use models::user::{LoginRequest, LoginResponse, SaveUserRequest};
pub use models::vessel::{GetVesselResponse, SaveVesselRequest, VesselName, VesselResponse};

use crate::auth::token::TokenService;
use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over logging.level, e.g. RUST_LOG=info,muirgen::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

/// Unexpected failures are fatal: log through tracing, then let the process die so
/// the supervisor restarts it.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "unrecoverable error, terminating");
        default_hook(info);
    }));
}

fn build_cors(cors_config: &config::CorsConfig) -> Result<rocket_cors::Cors, AppError> {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        return Err(AppError::configuration(
            "Invalid CORS configuration: wildcard origins (*) cannot be combined with credentials",
        ));
    }

    let allowed_origins = if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Authorization", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
    .to_cors()
    .map_err(|e| AppError::configuration(format!("Failed to create CORS fairing: {e}")))
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Result<Rocket<Build>, AppError> {
    let route_specs = [
        app_routes::init::routes(),
        app_routes::user::routes(),
        app_routes::vessel::routes(),
        app_routes::health::routes(),
    ];

    let mut openapi_list = Vec::new();
    for (routes, openapi) in route_specs {
        rocket = rocket.mount(base_path, routes);
        openapi_list.push(("", openapi));
    }

    if enable_swagger {
        let openapi_docs = marge_spec_list(&openapi_list).map_err(|e| AppError::configuration(format!("Could not merge OpenAPI spec: {e}")))?;
        let settings = rocket_okapi::settings::OpenApiSettings::default();
        rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

        let swagger = SwaggerUIConfig {
            url: format!("{base_path}/openapi.json"),
            ..Default::default()
        };
        rocket = rocket.mount(format!("{base_path}/docs"), make_swagger_ui(&swagger));
    }

    Ok(rocket)
}

/// Assembles the server. Refuses to build without a usable token secret or with an
/// invalid CORS setup.
pub fn build_rocket(config: Config) -> Result<Rocket<Build>, AppError> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let tokens = TokenService::from_config(&config.auth)?;
    let cors = build_cors(&config.cors)?;
    let base_path = normalize_base_path(&config.api.base_path);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    let rocket = rocket::custom(figment)
        .manage(tokens)
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database));

    let rocket = mount_api_routes(rocket, &base_path, config.api.enable_swagger)?;

    Ok(rocket.register(
        base_path.as_str(),
        catchers![
            app_routes::error::bad_request,
            app_routes::error::unauthorized,
            app_routes::error::forbidden,
            app_routes::error::not_found,
            app_routes::error::conflict,
            app_routes::error::unprocessable,
            app_routes::error::internal_error,
        ],
    ))
}
