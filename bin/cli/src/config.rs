//! CLI configuration.
//!
//! Loaded via the `config` crate from an optional file (format picked by
//! extension) layered under `CADENCE__*` environment variables, e.g.
//! `CADENCE__JITTER_SEED=7`.

use cadence_trigger::{JitterSource, RandomJitter, TriggerConfig};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Top-level CLI configuration.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// The trigger definition to evaluate.
    pub trigger: TriggerConfig,

    /// Seed for jitter offsets. Unseeded runs draw from the OS.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

impl CliConfig {
    /// Loads configuration from `path` (if given) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or required configuration
    /// is missing or invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// The jitter source combinators should draw from.
    #[must_use]
    pub fn jitter_source(&self) -> Arc<dyn JitterSource> {
        match self.jitter_seed {
            Some(seed) => Arc::new(RandomJitter::seeded(seed)),
            None => Arc::new(RandomJitter::new()),
        }
    }
}
