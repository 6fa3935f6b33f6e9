use crate::application::{AdminDashboard, ManagePolls, PollQueries};
use crate::config::AppConfig;
use crate::infrastructure::db;
use election_errors::AppError;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub poll_queries: Arc<PollQueries>,
    pub manage_polls: Arc<ManagePolls>,
    pub dashboard: Arc<AdminDashboard>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        Self {
            poll_queries: Arc::new(PollQueries::new(Arc::clone(&db))),
            manage_polls: Arc::new(ManagePolls::new(Arc::clone(&db))),
            dashboard: Arc::new(AdminDashboard::new(db)),
        }
    }

    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let conn = db::create_connection(&config.database)
            .await
            .map_err(|e| AppError::Database(format!("failed to connect: {e}")))?;
        tracing::info!("Database connected");

        if config.run_migrations {
            db::run_migrations(&conn)
                .await
                .map_err(|e| AppError::Database(format!("failed to migrate: {e}")))?;
        }

        Ok(Self::new(conn))
    }
}
