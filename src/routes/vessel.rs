use crate::auth::MaybeUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::UserRepository;
use crate::database::vessel::VesselRepository;
use crate::error::app_error::AppError;
use crate::models::init::SuccessResponse;
use crate::models::vessel::{GetVesselResponse, SaveVesselRequest, VesselName};
use crate::service::vessel::VesselService;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

const VESSEL_OFFLINE: &str = "Database Offline";

async fn load_vessel<R>(repo: &R) -> Result<GetVesselResponse, AppError>
where
    R: UserRepository + VesselRepository,
{
    VesselService::new(repo)
        .active_singleton()
        .await
        .map_err(|e| e.into_offline(VESSEL_OFFLINE))
}

/// The active vessel, or `{setupRequired: true}` before one exists
#[openapi(tag = "Vessels")]
#[get("/get-vessel")]
pub async fn get_vessel(pool: &State<PgPool>) -> Result<Json<GetVesselResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(load_vessel(&repo).await?))
}

/// Create a vessel (open during first run, administrators only afterwards)
#[openapi(tag = "Vessels")]
#[post("/save-vessel", data = "<payload>")]
pub async fn save_vessel(pool: &State<PgPool>, caller: MaybeUser, payload: Json<SaveVesselRequest>) -> Result<Json<SuccessResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    VesselService::new(&repo).create(caller.0.as_ref(), &payload).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Active vessels by name, for user assignment
#[openapi(tag = "Vessels")]
#[get("/vessels/get-active")]
pub async fn list_active_vessels(pool: &State<PgPool>) -> Result<Json<Vec<VesselName>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(VesselService::new(&repo).list_active_names().await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_vessel, save_vessel, list_active_vessels]
}

#[cfg(test)]
mod tests {
    use super::load_vessel;
    use crate::test_utils::{MockRepository, database_client};
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn get_vessel_reports_database_offline() {
        let err = load_vessel(&MockRepository::offline()).await.unwrap_err();
        assert_eq!(err.to_string(), "Database Offline");
        assert_eq!(Status::from(&err), Status::InternalServerError);
    }

    #[tokio::test]
    async fn get_vessel_without_vessels_asks_for_setup() {
        let response = load_vessel(&MockRepository::default()).await.unwrap();
        assert_eq!(serde_json::to_value(response).unwrap(), json!({ "setupRequired": true }));
    }

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn get_vessel_before_and_after_setup() {
        let client = database_client().await;

        let body: Value = client.get("/api/get-vessel").dispatch().await.into_json().await.unwrap();
        assert_eq!(body, json!({ "setupRequired": true }));

        let response = client
            .post("/api/save-vessel")
            .header(ContentType::JSON)
            .body(json!({ "vesselName": "Muirgen", "vesselOfficialNumber": "404123", "vesselKeelOffset": 1.5 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = client.get("/api/get-vessel").dispatch().await.into_json().await.unwrap();
        assert_eq!(body["vesselName"], json!("Muirgen"));
        assert_eq!(body["vesselOfficialNumber"], json!("404123"));
        assert_eq!(body["vesselKeelOffset"], json!(1.5));
        assert_eq!(body["setupRequired"], json!(false));

        let names: Value = client.get("/api/vessels/get-active").dispatch().await.into_json().await.unwrap();
        assert_eq!(names[0]["name"], json!("Muirgen"));
    }
}
