//! zone-reporter: report this instance's deployment zone over HTTP.
//!
//! The zone is resolved once at startup from a TOML file, the environment or
//! the command line, and served read-only as JSON from `GET /zone`.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod zone;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
pub use zone::Zone;
