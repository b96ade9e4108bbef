//! Dispatch configuration
//!
//! Process-wide defaults read by [`crate::Dispatcher::global`]. A dispatcher
//! built with [`crate::Dispatcher::with_config`] ignores them.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use tracing::warn;

/// Environment variable toggling the accelerated path
pub const ENV_ACCELERATE: &str = "EXTREMIS_ACCELERATE";
/// Environment variable toggling loud fallback logging
pub const ENV_LOG_FALLBACKS: &str = "EXTREMIS_LOG_FALLBACKS";
/// Environment variable holding the minimum element count worth accelerating
pub const ENV_MIN_ACCELERATED_LEN: &str = "EXTREMIS_MIN_ACCELERATED_LEN";

/// Global kill switch for the accelerated path
static ACCELERATION_ENABLED: AtomicBool = AtomicBool::new(true);

static GLOBAL_DISPATCH_CONFIG: OnceLock<RwLock<DispatchConfig>> = OnceLock::new();

/// Configuration for accelerated dispatch and fallback behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DispatchConfig {
    /// Try the accelerated backend when a reduction is eligible
    pub accelerate: bool,
    /// Log backend fallbacks at `warn` instead of `debug`
    pub log_fallbacks: bool,
    /// Inputs with fewer elements always take the generic path
    pub min_accelerated_len: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            accelerate: true,
            log_fallbacks: false,
            min_accelerated_len: 1,
        }
    }
}

impl DispatchConfig {
    /// Defaults overridden by `EXTREMIS_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_ACCELERATE) {
            match parse_flag(&value) {
                Some(flag) => config.accelerate = flag,
                None => warn!(variable = ENV_ACCELERATE, %value, "ignoring unparseable flag"),
            }
        }
        if let Some(value) = lookup(ENV_LOG_FALLBACKS) {
            match parse_flag(&value) {
                Some(flag) => config.log_fallbacks = flag,
                None => warn!(variable = ENV_LOG_FALLBACKS, %value, "ignoring unparseable flag"),
            }
        }
        if let Some(value) = lookup(ENV_MIN_ACCELERATED_LEN) {
            match value.trim().parse::<usize>() {
                Ok(len) => config.min_accelerated_len = len,
                Err(_) => warn!(
                    variable = ENV_MIN_ACCELERATED_LEN,
                    %value,
                    "ignoring unparseable length"
                ),
            }
        }
        config
    }

    /// Set whether the accelerated backend is tried
    pub fn with_acceleration(mut self, accelerate: bool) -> Self {
        self.accelerate = accelerate;
        self
    }

    /// Set the minimum element count for the accelerated path
    pub fn with_min_accelerated_len(mut self, len: usize) -> Self {
        self.min_accelerated_len = len;
        self
    }

    /// Log fallbacks loudly
    pub fn with_fallback_logging(mut self, enabled: bool) -> Self {
        self.log_fallbacks = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn global_config_lock() -> &'static RwLock<DispatchConfig> {
    GLOBAL_DISPATCH_CONFIG.get_or_init(|| RwLock::new(DispatchConfig::from_env()))
}

/// Get the global dispatch configuration
pub fn get_dispatch_config() -> DispatchConfig {
    let mut config = global_config_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    config.accelerate &= is_acceleration_enabled();
    config
}

/// Replace the global dispatch configuration
pub fn set_dispatch_config(config: DispatchConfig) {
    *global_config_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// Enable or disable the accelerated path globally
pub fn set_acceleration_enabled(enabled: bool) {
    ACCELERATION_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if the accelerated path is globally enabled
pub fn is_acceleration_enabled() -> bool {
    ACCELERATION_ENABLED.load(Ordering::SeqCst)
}
