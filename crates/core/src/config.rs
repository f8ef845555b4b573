// Engine Configuration

/// Default bound on concurrently rendering jobs
pub const DEFAULT_MAX_CONCURRENT_RENDERS: usize = 4;

/// Default age after which a PROCESSING job is considered stuck (10 minutes)
pub const DEFAULT_STALE_PROCESSING_AFTER_MS: i64 = 10 * 60 * 1000;

/// Default interval between stale-job sweeps (1 minute)
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60 * 1000;

/// Runtime configuration for the report engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on jobs rendering at the same time
    pub max_concurrent_renders: usize,
    /// Age after which a PROCESSING job is treated as orphaned by the sweeper
    pub stale_processing_after_ms: i64,
    /// Interval between periodic sweeps
    pub sweep_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_renders: DEFAULT_MAX_CONCURRENT_RENDERS,
            stale_processing_after_ms: DEFAULT_STALE_PROCESSING_AFTER_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `REPORTMILL_*` environment variables, falling
    /// back to defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_renders: env_parse(
                "REPORTMILL_MAX_CONCURRENT_RENDERS",
                defaults.max_concurrent_renders,
            ),
            stale_processing_after_ms: env_parse(
                "REPORTMILL_STALE_PROCESSING_AFTER_MS",
                defaults.stale_processing_after_ms,
            ),
            sweep_interval_ms: env_parse(
                "REPORTMILL_SWEEP_INTERVAL_MS",
                defaults.sweep_interval_ms,
            ),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
