use log::LevelFilter;
use nexus_engine::{BackendSettings, EngineSettings};
use nexus_logging::LogDestination;

pub const ENV_BACKEND_URL: &str = "NEXUS_BACKEND_URL";
pub const ENV_LOG: &str = "NEXUS_LOG";
pub const ENV_LOG_LEVEL: &str = "NEXUS_LOG_LEVEL";
pub const ENV_SIM_SEED: &str = "NEXUS_SIM_SEED";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            log_destination: LogDestination::File,
            log_level: LevelFilter::Info,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`. Bad values keep their default and yield a warning,
    /// returned because logging is not up yet when this runs.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        if let Some(raw) = lookup(ENV_BACKEND_URL) {
            let trimmed = raw.trim();
            if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                config.engine.backend = BackendSettings {
                    base_url: trimmed.to_string(),
                    ..config.engine.backend
                };
            } else {
                warnings.push(format!("{ENV_BACKEND_URL}={raw:?} is not an http(s) url; using default"));
            }
        }

        if let Some(raw) = lookup(ENV_LOG) {
            match LogDestination::parse(&raw) {
                Some(destination) => config.log_destination = destination,
                None => warnings.push(format!("{ENV_LOG}={raw:?} is not terminal|file|both; using file")),
            }
        }

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            match raw.trim().parse::<LevelFilter>() {
                Ok(level) => config.log_level = level,
                Err(_) => warnings.push(format!("{ENV_LOG_LEVEL}={raw:?} is not a log level; using info")),
            }
        }

        if let Some(raw) = lookup(ENV_SIM_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.engine.simulation.seed = Some(seed),
                Err(_) => warnings.push(format!("{ENV_SIM_SEED}={raw:?} is not a number; runs stay random")),
            }
        }

        (config, warnings)
    }
}
