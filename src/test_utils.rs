use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::{UserRepository, hash_password};
use crate::database::vessel::VesselRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, Principal, SaveUserRequest, User};
use crate::models::vessel::{SaveVesselRequest, Vessel, VesselName};
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

pub const TEST_SECRET: &str = "unit-test-secret-unit-test-secret-0123";

pub fn new_user(handle: &str, password: &str, is_admin: bool) -> NewUser {
    NewUser {
        handle: handle.to_string(),
        name: format!("{handle} of the watch"),
        password: password.to_string(),
        is_admin,
        vessel_uuid: None,
    }
}

pub fn save_user_request(handle: &str, is_admin: bool) -> SaveUserRequest {
    SaveUserRequest {
        user_handle: handle.to_string(),
        user_name: format!("{handle} of the watch"),
        user_password: "hunter22".to_string(),
        user_is_admin: is_admin,
        user_vessel_uuid: None,
    }
}

pub fn new_vessel(name: &str) -> SaveVesselRequest {
    SaveVesselRequest {
        vessel_name: name.to_string(),
        ..SaveVesselRequest::default()
    }
}

pub fn principal_of(user: &User) -> Principal {
    Principal::from(user)
}

/// In-memory stand-in for Postgres. Rows keep insertion order, which doubles as
/// creation order.
#[derive(Default)]
pub struct MockRepository {
    users: Mutex<Vec<User>>,
    vessels: Mutex<Vec<Vessel>>,
    offline: bool,
}

impl MockRepository {
    /// Every call fails the way an unreachable database does.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline {
            return Err(AppError::db("Database offline", sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn count_users(&self) -> Result<i64, AppError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn count_active_users(&self) -> Result<i64, AppError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().iter().filter(|u| u.is_active).count() as i64)
    }

    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AppError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.is_active && u.handle == handle).cloned())
    }

    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.is_active && u.uuid == *id).cloned())
    }

    async fn upsert_user(&self, id: &Uuid, user: &NewUser) -> Result<User, AppError> {
        self.check_online()?;
        let password_hash = hash_password(&user.password)?;
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.is_active && u.handle == user.handle && u.uuid != *id) {
            return Err(AppError::UserAlreadyExists(user.handle.clone()));
        }

        if let Some(existing) = users.iter_mut().find(|u| u.uuid == *id) {
            existing.handle = user.handle.clone();
            existing.name = user.name.clone();
            existing.password_hash = password_hash;
            existing.is_admin = user.is_admin;
            existing.vessel_uuid = user.vessel_uuid;
            return Ok(existing.clone());
        }

        let stored = User {
            uuid: *id,
            handle: user.handle.clone(),
            name: user.name.clone(),
            password_hash,
            is_admin: user.is_admin,
            is_active: true,
            vessel_uuid: user.vessel_uuid,
            created_at: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn set_user_active(&self, id: &Uuid, active: bool) -> Result<(), AppError> {
        self.check_online()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.uuid == *id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.is_active = active;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VesselRepository for MockRepository {
    async fn count_active_vessels(&self) -> Result<i64, AppError> {
        self.check_online()?;
        Ok(self.vessels.lock().unwrap().iter().filter(|v| v.is_active).count() as i64)
    }

    async fn get_active_vessel(&self) -> Result<Option<Vessel>, AppError> {
        self.check_online()?;
        Ok(self.vessels.lock().unwrap().iter().find(|v| v.is_active).cloned())
    }

    async fn get_active_vessel_by_id(&self, id: &Uuid) -> Result<Option<Vessel>, AppError> {
        self.check_online()?;
        Ok(self.vessels.lock().unwrap().iter().find(|v| v.is_active && v.uuid == *id).cloned())
    }

    async fn list_active_vessel_names(&self) -> Result<Vec<VesselName>, AppError> {
        self.check_online()?;
        let mut names: Vec<VesselName> = self
            .vessels
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.is_active)
            .map(|v| VesselName {
                uuid: v.uuid,
                name: v.name.clone(),
            })
            .collect();
        names.sort_by(|a, b| a.name.cmp(&b.name).then(a.uuid.cmp(&b.uuid)));
        Ok(names)
    }

    async fn upsert_vessel(&self, id: &Uuid, request: &SaveVesselRequest) -> Result<Vessel, AppError> {
        self.check_online()?;
        let mut vessels = self.vessels.lock().unwrap();
        let created_at = vessels.iter().find(|v| v.uuid == *id).map(|v| v.created_at).unwrap_or_else(Utc::now);
        let is_active = vessels.iter().find(|v| v.uuid == *id).map(|v| v.is_active).unwrap_or(true);

        let vessel = Vessel {
            uuid: *id,
            name: request.vessel_name.clone(),
            flag_nation: request.vessel_flag_nation.clone(),
            port_of_registry: request.vessel_port_of_registry.clone(),
            build_details: request.vessel_build_details.clone(),
            official_number: request.vessel_official_number.clone(),
            hull_id_number: request.vessel_hull_identification_number.clone(),
            keel_offset: request.vessel_keel_offset,
            waterline_offset: request.vessel_waterline_offset,
            is_active,
            created_at,
        };

        match vessels.iter_mut().find(|v| v.uuid == *id) {
            Some(existing) => *existing = vessel.clone(),
            None => vessels.push(vessel.clone()),
        }
        Ok(vessel)
    }

    async fn set_vessel_active(&self, id: &Uuid, active: bool) -> Result<(), AppError> {
        self.check_online()?;
        let mut vessels = self.vessels.lock().unwrap();
        let vessel = vessels
            .iter_mut()
            .find(|v| v.uuid == *id)
            .ok_or_else(|| AppError::NotFound("Vessel not found".to_string()))?;
        vessel.is_active = active;
        Ok(())
    }
}

/// Connects to `DATABASE_URL`, applies migrations and empties the tables.
/// Only used by tests marked `#[ignore = "requires database"]`.
pub async fn database_repository() -> PostgresRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = sqlx::PgPool::connect(&url).await.expect("database reachable");
    crate::db::MIGRATOR.run(&pool).await.expect("migrations apply");
    sqlx::query("TRUNCATE users, vessels").execute(&pool).await.expect("tables truncated");
    PostgresRepository { pool }
}

/// A tracked local client against a freshly emptied database.
pub async fn database_client() -> rocket::local::asynchronous::Client {
    database_repository().await;

    let mut config = crate::Config::default();
    config.database.url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    config.database.run_migrations = false;
    config.auth.token_secret = Some(TEST_SECRET.to_string());

    let rocket = crate::build_rocket(config).expect("server builds");
    rocket::local::asynchronous::Client::tracked(rocket).await.expect("valid rocket instance")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_upsert_keeps_identity_and_creation_time() {
        let repo = MockRepository::default();
        let created = repo.create_vessel(&new_vessel("Muirgen")).await.unwrap();
        let updated = repo.upsert_vessel(&created.uuid, &new_vessel("Muirgen II")).await.unwrap();

        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.count_active_vessels().await.unwrap(), 1);
    }
}
