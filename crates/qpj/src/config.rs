//! Runtime-tunable knobs, following this workspace's `gvthread_runtime::config`
//! env-var-plus-builder pattern.
//!
//! `G_MAX` and `S_MAX` are not here: they size fixed-length arrays and a
//! `u8` occupancy bitmask baked into [`crate::wss::WorkSlotSet`]'s layout,
//! so they stay compile-time `const`s (`spec.md` §6) rather than runtime
//! config. What's left to configure is purely observability.

use crate::env::{env_get, env_get_bool};
use crate::qlog::{self, LogLevel};

/// QPJ's runtime configuration: logging verbosity and whether log lines
/// carry a timestamp.
#[derive(Debug, Clone)]
pub struct QpjConfig {
    pub log_level: LogLevel,
    pub log_time: bool,
}

pub mod defaults {
    pub const LOG_LEVEL: &str = "warn";
    pub const LOG_TIME: bool = false;
}

impl QpjConfig {
    /// Read configuration from the environment (`QPJ_LOG_LEVEL`, `QPJ_LOG_TIME`),
    /// falling back to [`defaults`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let level_str: String = env_get("QPJ_LOG_LEVEL", defaults::LOG_LEVEL.to_string());
        QpjConfig {
            log_level: LogLevel::from_str_lossy(&level_str),
            log_time: env_get_bool("QPJ_LOG_TIME", defaults::LOG_TIME),
        }
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_time(mut self, enabled: bool) -> Self {
        self.log_time = enabled;
        self
    }

    /// Apply this configuration to the process-wide logger.
    ///
    /// `log_time` is read directly by [`crate::qlog`] from `QPJ_LOG_TIME` at
    /// first use and has no programmatic setter today; only `log_level` is
    /// pushed through here. Call this once, early, before any [`crate::wss::WorkSlotSet`]
    /// is used from more than one thread.
    pub fn apply(&self) {
        qlog::set_log_level(self.log_level);
    }
}

impl Default for QpjConfig {
    fn default() -> Self {
        QpjConfig { log_level: LogLevel::from_str_lossy(defaults::LOG_LEVEL), log_time: defaults::LOG_TIME }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let cfg = QpjConfig::default();
        assert_eq!(cfg.log_level, LogLevel::from_str_lossy(defaults::LOG_LEVEL));
        assert_eq!(cfg.log_time, defaults::LOG_TIME);
    }

    #[test]
    fn builder_methods_override_fields() {
        let cfg = QpjConfig::default().with_log_level(LogLevel::Trace).with_log_time(true);
        assert_eq!(cfg.log_level, LogLevel::Trace);
        assert!(cfg.log_time);
    }
}
