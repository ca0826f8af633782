//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → shared via ArcSwap to configured profiles
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → only lists and secrets changed? atomic swap of the snapshot
//!     → configured profiles read the new lists and secrets
//! ```
//!
//! # Design Decisions
//! - A snapshot is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The profile registry, routes, client address extraction and
//!   observability never change after startup

use std::sync::Arc;

use arc_swap::ArcSwap;

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{GuardConfig, ProfileConfig, ProfileSettings, RoutePolicyConfig, SignedTokenConfig};
pub use watcher::ConfigWatcher;

/// Configuration snapshot shared with profiles and swapped on reload.
pub type SharedConfig = Arc<ArcSwap<GuardConfig>>;

/// Wrap a loaded configuration for sharing.
pub fn shared(config: GuardConfig) -> SharedConfig {
    Arc::new(ArcSwap::from_pointee(config))
}
