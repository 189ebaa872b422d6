use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/order-server | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP query API port |
/// | INTAKE_TCP_PORT | 8081 | Intake message channel port |
/// | CHANNEL_CAPACITY | 1024 | Bus broadcast channel capacity |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/orders HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: String,
    /// HTTP query API port
    pub http_port: u16,
    /// Intake TCP channel port (clients stream orders here)
    pub intake_tcp_port: u16,
    /// Bus broadcast channel capacity
    pub channel_capacity: usize,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/order-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            intake_tcp_port: std::env::var("INTAKE_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override selected settings. Mostly used by tests.
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        intake_tcp_port: u16,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.intake_tcp_port = intake_tcp_port;
        config
    }

    /// Directory holding the SQLite database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rolling log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the working directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
