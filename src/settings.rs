//! Startup settings for deprecation reporting.
//!
//! Lets applications pick the reporting behavior and metrics naming from a
//! YAML file instead of code, so the reaction to deprecated calls can be
//! tightened per environment (warn in development, raise in CI).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::error::Error;
use crate::metrics::DeprecationMetrics;
use crate::reporter::Reporter;

/// Settings for deprecation reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Reaction to deprecated invocations
    #[serde(default)]
    pub behavior: BehaviorTag,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Install the configured behavior on an existing reporter.
    pub fn apply(&self, reporter: &Reporter) -> Result<(), Error> {
        reporter.set_behavior(Behavior::from(self.behavior))
    }

    /// Build a reporter configured by these settings.
    pub fn build_reporter(&self) -> Result<Reporter, Error> {
        let reporter = Reporter::with_metrics(DeprecationMetrics::new(&self.metrics.prefix));
        self.apply(&reporter)?;
        Ok(reporter)
    }
}

/// File syntax for the fixed behavior tags. Custom handlers have no file
/// syntax; they are installed in code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorTag {
    /// Do nothing on deprecated invocations
    Silence,

    /// Warn on the diagnostic sink (default)
    #[default]
    Warn,

    /// Fail deprecated invocations
    Raise,
}

impl From<BehaviorTag> for Behavior {
    fn from(tag: BehaviorTag) -> Self {
        match tag {
            BehaviorTag::Silence => Behavior::Silence,
            BehaviorTag::Warn => Behavior::Warn,
            BehaviorTag::Raise => Behavior::Raise,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Prefix for metric names
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            prefix: default_metrics_prefix(),
        }
    }
}

fn default_metrics_prefix() -> String {
    "deprecations".to_string()
}
