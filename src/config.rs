use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MediLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Advisory text returned with every analysis.
pub const DEFAULT_DISCLAIMER: &str = "This analysis is for informational purposes only and is not \
     medical advice. Always consult your doctor or pharmacist before switching medicines, and \
     confirm allergy information with a healthcare professional.";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 5_000;

/// Request shape limits enforced at the HTTP boundary.
pub const MAX_PRESCRIPTIONS: usize = 50;
pub const MAX_ALLERGIES: usize = 50;
pub const MAX_TERM_LEN: usize = 200;

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medilens_lib=info,medilens=info,tower_http=info"
}

/// Get the application data directory
/// ~/MediLens/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the catalog database
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("catalog.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogBackend {
    Sqlite(PathBuf),
    Memory,
}

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub catalog: CatalogBackend,
    /// Upper bound for one analysis; exceeding it reports the catalog unavailable.
    pub catalog_timeout: Duration,
    pub disclaimer: String,
    /// Load the bundled demo catalog when the store is empty.
    pub seed_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            catalog: CatalogBackend::Sqlite(default_database_path()),
            catalog_timeout: Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            seed_catalog: true,
        }
    }
}

impl AppConfig {
    /// Read `MEDILENS_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys keep their defaults.
    ///
    /// - `MEDILENS_BIND_ADDR`: socket address, e.g. `0.0.0.0:8080`
    /// - `MEDILENS_DB_PATH`: SQLite file, or `:memory:` for an in-memory catalog
    /// - `MEDILENS_CATALOG_TIMEOUT_MS`: positive integer
    /// - `MEDILENS_DISCLAIMER`: replacement disclaimer text
    /// - `MEDILENS_SEED`: `true`/`false`, `1`/`0`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get("MEDILENS_BIND_ADDR") {
            config.bind_addr = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "MEDILENS_BIND_ADDR",
                value,
            })?;
        }

        if let Some(value) = get("MEDILENS_DB_PATH") {
            config.catalog = if value == ":memory:" {
                CatalogBackend::Memory
            } else {
                CatalogBackend::Sqlite(PathBuf::from(value))
            };
        }

        if let Some(value) = get("MEDILENS_CATALOG_TIMEOUT_MS") {
            let millis = value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "MEDILENS_CATALOG_TIMEOUT_MS",
                    value,
                })?;
            config.catalog_timeout = Duration::from_millis(millis);
        }

        if let Some(value) = get("MEDILENS_DISCLAIMER") {
            config.disclaimer = value;
        }

        if let Some(value) = get("MEDILENS_SEED") {
            config.seed_catalog = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "MEDILENS_SEED",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MediLens"));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_name_is_medilens() {
        assert_eq!(APP_NAME, "MediLens");
    }

    #[test]
    fn default_bind_addr_constant_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr, AppConfig::default().bind_addr);
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.catalog_timeout, Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS));
        assert_eq!(config.disclaimer, DEFAULT_DISCLAIMER);
        assert!(config.seed_catalog);
        assert!(!config.disclaimer.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDILENS_BIND_ADDR", "0.0.0.0:8080"),
            ("MEDILENS_DB_PATH", "/tmp/medilens.db"),
            ("MEDILENS_CATALOG_TIMEOUT_MS", "250"),
            ("MEDILENS_DISCLAIMER", "Ask your pharmacist."),
            ("MEDILENS_SEED", "false"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.catalog, CatalogBackend::Sqlite(PathBuf::from("/tmp/medilens.db")));
        assert_eq!(config.catalog_timeout, Duration::from_millis(250));
        assert_eq!(config.disclaimer, "Ask your pharmacist.");
        assert!(!config.seed_catalog);
    }

    #[test]
    fn memory_backend_selected_by_marker() {
        let config = AppConfig::from_lookup(lookup_from(&[("MEDILENS_DB_PATH", ":memory:")])).unwrap();
        assert_eq!(config.catalog, CatalogBackend::Memory);
    }

    #[test]
    fn blank_disclaimer_keeps_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("MEDILENS_DISCLAIMER", "   ")])).unwrap();
        assert_eq!(config.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("MEDILENS_BIND_ADDR", "not-an-addr"),
            ("MEDILENS_CATALOG_TIMEOUT_MS", "0"),
            ("MEDILENS_CATALOG_TIMEOUT_MS", "soon"),
            ("MEDILENS_SEED", "maybe"),
        ] {
            let err = AppConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == key));
        }
    }
}
