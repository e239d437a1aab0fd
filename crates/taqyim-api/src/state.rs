use taqyim_core::db::DbPool;
use taqyim_core::IngestConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: IngestConfig,
}

impl AppState {
    pub async fn new(database_url: &str, config: IngestConfig) -> anyhow::Result<Self> {
        let pool = taqyim_core::db::connect(database_url).await?;
        taqyim_core::db::run_migrations(&pool).await?;
        Ok(Self { pool, config })
    }
}
