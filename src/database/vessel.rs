use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::vessel::{SaveVesselRequest, Vessel, VesselName};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait VesselRepository: Send + Sync {
    async fn count_active_vessels(&self) -> Result<i64, AppError>;
    /// The earliest-created active vessel.
    async fn get_active_vessel(&self) -> Result<Option<Vessel>, AppError>;
    async fn get_active_vessel_by_id(&self, id: &Uuid) -> Result<Option<Vessel>, AppError>;
    /// Active vessels ordered by name.
    async fn list_active_vessel_names(&self) -> Result<Vec<VesselName>, AppError>;
    async fn upsert_vessel(&self, id: &Uuid, request: &SaveVesselRequest) -> Result<Vessel, AppError>;
    async fn set_vessel_active(&self, id: &Uuid, active: bool) -> Result<(), AppError>;

    async fn create_vessel(&self, request: &SaveVesselRequest) -> Result<Vessel, AppError> {
        self.upsert_vessel(&Uuid::new_v4(), request).await
    }
}

const VESSEL_COLUMNS: &str = "uuid, name, flag_nation, port_of_registry, build_details, official_number, hull_id_number, keel_offset, waterline_offset, is_active, created_at";

#[async_trait::async_trait]
impl VesselRepository for PostgresRepository {
    async fn count_active_vessels(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vessels WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn get_active_vessel(&self) -> Result<Option<Vessel>, AppError> {
        let vessel = sqlx::query_as::<_, Vessel>(&format!(
            r#"
            SELECT {VESSEL_COLUMNS}
            FROM vessels
            WHERE is_active
            ORDER BY created_at ASC, uuid ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(vessel)
    }

    async fn get_active_vessel_by_id(&self, id: &Uuid) -> Result<Option<Vessel>, AppError> {
        let vessel = sqlx::query_as::<_, Vessel>(&format!("SELECT {VESSEL_COLUMNS} FROM vessels WHERE uuid = $1 AND is_active"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vessel)
    }

    async fn list_active_vessel_names(&self) -> Result<Vec<VesselName>, AppError> {
        let names = sqlx::query_as::<_, VesselName>(
            r#"
            SELECT uuid, name
            FROM vessels
            WHERE is_active
            ORDER BY name ASC, uuid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn upsert_vessel(&self, id: &Uuid, request: &SaveVesselRequest) -> Result<Vessel, AppError> {
        let vessel = sqlx::query_as::<_, Vessel>(&format!(
            r#"
            INSERT INTO vessels (uuid, name, flag_nation, port_of_registry, build_details, official_number, hull_id_number, keel_offset, waterline_offset)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (uuid) DO UPDATE
            SET name = EXCLUDED.name,
                flag_nation = EXCLUDED.flag_nation,
                port_of_registry = EXCLUDED.port_of_registry,
                build_details = EXCLUDED.build_details,
                official_number = EXCLUDED.official_number,
                hull_id_number = EXCLUDED.hull_id_number,
                keel_offset = EXCLUDED.keel_offset,
                waterline_offset = EXCLUDED.waterline_offset
            RETURNING {VESSEL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.vessel_name)
        .bind(&request.vessel_flag_nation)
        .bind(&request.vessel_port_of_registry)
        .bind(&request.vessel_build_details)
        .bind(&request.vessel_official_number)
        .bind(&request.vessel_hull_identification_number)
        .bind(request.vessel_keel_offset)
        .bind(request.vessel_waterline_offset)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to save vessel", e))?;

        Ok(vessel)
    }

    async fn set_vessel_active(&self, id: &Uuid, active: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE vessels SET is_active = $1 WHERE uuid = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vessel not found".to_string()));
        }
        Ok(())
    }
}
