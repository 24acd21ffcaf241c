//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → endpoint set + dispatcher built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the endpoint set never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BalancerConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::LimitsConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
pub use loader::{ConfigError, ConfigOverrides, load_config, read_config};
