pub mod client;
pub mod config;
pub mod error;
pub mod proto;

// Convenient re-exports (so call sites can do `builderport_client::Client`, etc.)
pub use client::{Client, SessionState};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ServerFailure};
pub use proto::{Reply, ZoneEntry};
