//! Order Server - streaming order intake and query service
//!
//! # Architecture
//!
//! - **Intake channel** (`message`): framed TCP/Memory transport message bus
//!   carrying order submissions; one response per request.
//! - **Order pipeline** (`orders`): validator, sequence allocator, intake
//!   service and query service — the only code that touches order state.
//! - **Database** (`db`): embedded SQLite storage via sqlx.
//! - **HTTP API** (`api`): read-only query endpoints.
//!
//! # Module structure
//!
//! ```text
//! order-server/src/
//! ├── core/          # Config, state, server
//! ├── orders/        # Validator, allocator, intake, query
//! ├── db/            # Database layer
//! ├── message/       # Intake message bus
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Errors, logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use orders::{IntakeService, OrderRejection, QueryService, SequenceAllocator, SubmitOutcome};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
