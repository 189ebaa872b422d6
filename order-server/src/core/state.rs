use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::message::{IntakeHandler, MessageBus, TransportConfig};
use crate::orders::{IntakeService, QueryService};
use crate::utils::AppError;

/// Server state - shared handles to every service
///
/// Cheap to clone (everything inside is a pool, an `Arc`, or channel
/// handles); one copy per task.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Configuration (immutable) |
/// | pool | SqlitePool | Embedded database |
/// | intake | IntakeService | Submission pipeline (owns the allocator) |
/// | query | QueryService | Read-only order queries |
/// | bus | MessageBus | Intake message channel |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database pool
    pub pool: SqlitePool,
    /// Submission pipeline; the single owner of order mutations
    pub intake: IntakeService,
    /// Read-only query operations
    pub query: QueryService,
    /// Intake message bus
    pub bus: MessageBus,
}

impl ServerState {
    /// Initialize server state from configuration.
    ///
    /// Creates the working directory layout, opens the database (running
    /// migrations), seeds the sequence allocator from the store and wires
    /// the services.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("orders.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Self::with_pool(config, db.pool).await
    }

    /// Wire services around an already opened pool (tests use an in-memory
    /// database here).
    pub async fn with_pool(config: &Config, pool: SqlitePool) -> Result<Self, AppError> {
        let intake = IntakeService::seed(pool.clone()).await?;
        let query = QueryService::new(pool.clone());
        let bus = MessageBus::from_config(TransportConfig {
            tcp_listen_addr: format!("0.0.0.0:{}", config.intake_tcp_port),
            channel_capacity: config.channel_capacity,
        });

        Ok(Self {
            config: config.clone(),
            pool,
            intake,
            query,
            bus,
        })
    }

    /// Start background tasks. Must be called before serving traffic.
    ///
    /// Spawns the intake handler that turns bus frames into submissions.
    pub fn start_background_tasks(&self) {
        let handler = IntakeHandler::new(&self.bus, self.intake.clone());
        tokio::spawn(handler.run());
    }
}
