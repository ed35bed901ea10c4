//! `[logging]` section

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Subscriber output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(format!("unknown log format {:?} (expected pretty or json)", s))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for every target
    pub level: String,
    pub format: LogFormat,
    /// Per-module overrides keyed by module under `modelgate::`
    /// (`directory = "debug"` becomes `modelgate::directory=debug`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_levels: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// First configured level that tracing would not accept, as
    /// `(field, value)`.
    pub fn invalid_level(&self) -> Option<(String, String)> {
        if LevelFilter::from_str(&self.level).is_err() {
            return Some(("logging.level".to_string(), self.level.clone()));
        }
        self.component_levels
            .iter()
            .find(|(_, level)| LevelFilter::from_str(level).is_err())
            .map(|(component, level)| {
                (
                    format!("logging.component_levels.{}", component),
                    level.clone(),
                )
            })
    }
}
