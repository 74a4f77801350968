use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, User};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use uuid::Uuid;

/// A real Argon2 hash generated once, used as a timing decoy so that logins for
/// unknown handles cost the same as logins with a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("dummy-never-matches").ok());

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user ever stored, active or not.
    async fn count_users(&self) -> Result<i64, AppError>;
    async fn count_active_users(&self) -> Result<i64, AppError>;
    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AppError>;
    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    /// Inserts or replaces the user stored under `id`. The password is hashed here.
    async fn upsert_user(&self, id: &Uuid, user: &NewUser) -> Result<User, AppError>;
    async fn set_user_active(&self, id: &Uuid, active: bool) -> Result<(), AppError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        self.upsert_user(&Uuid::new_v4(), user).await
    }
}

const USER_COLUMNS: &str = "uuid, handle, name, password_hash, is_admin, is_active, vessel_uuid, created_at";

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn count_users(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn count_active_users(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE handle = $1 AND is_active"))
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE uuid = $1 AND is_active"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn upsert_user(&self, id: &Uuid, user: &NewUser) -> Result<User, AppError> {
        let password_hash = hash_password(&user.password)?;

        let stored = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (uuid, handle, name, password_hash, is_admin, vessel_uuid)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (uuid) DO UPDATE
            SET handle = EXCLUDED.handle,
                name = EXCLUDED.name,
                password_hash = EXCLUDED.password_hash,
                is_admin = EXCLUDED.is_admin,
                vessel_uuid = EXCLUDED.vessel_uuid
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&user.handle)
        .bind(&user.name)
        .bind(&password_hash)
        .bind(user.is_admin)
        .bind(user.vessel_uuid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_user_insert(&user.handle, e))?;

        Ok(stored)
    }

    async fn set_user_active(&self, id: &Uuid, active: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE uuid = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

/// Hashes a plaintext password into a PHC string (salt embedded).
pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(user: &User, password: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials)
}

/// Throwaway verification for logins against unknown handles.
pub(crate) fn dummy_verify(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref()
        && let Ok(parsed) = PasswordHash::new(hash)
    {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}
