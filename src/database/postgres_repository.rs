use sqlx::PgPool;

#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}

impl PostgresRepository {
    /// Round-trips to the database and returns its local wall-clock time.
    pub async fn server_time(&self) -> Result<String, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT TO_CHAR(LOCALTIMESTAMP, 'YYYY-MM-DD HH24:MI:SS')")
            .fetch_one(&self.pool)
            .await
    }
}
