use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub planner: PlannerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// SQLite metadata store holding the connection catalog
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Reference cache capacity; 0 disables the cache
    pub cache_max_entries: usize,
    pub cache_ttl_secs: u64,
    /// Longest SQL text the API accepts, in bytes
    pub max_sql_length: usize,
    /// Prefixes naming schemas of the primary engine rather than connections
    pub local_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

const DEFAULT_LOCAL_PREFIXES: &[&str] = &[
    "main",
    "memory",
    "temp",
    "system",
    "information_schema",
    "pg_catalog",
];

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: 500,
            cache_ttl_secs: 300,
            max_sql_length: 1_000_000,
            local_prefixes: DEFAULT_LOCAL_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file first so its values act as env overrides
        let _ = dotenv::dotenv();

        let planner_defaults = PlannerConfig::default();

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("catalog.url", "./metadata.db")?
            .set_default("planner.cache_max_entries", planner_defaults.cache_max_entries as u64)?
            .set_default("planner.cache_ttl_secs", planner_defaults.cache_ttl_secs)?
            .set_default("planner.max_sql_length", planner_defaults.max_sql_length as u64)?
            .set_default("planner.local_prefixes", planner_defaults.local_prefixes)?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")?;

        if let Ok(host) = env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>().unwrap_or(3000))?;
        }

        // CATALOG_URL wins over the connection service's DATABASE_URL
        if let Ok(catalog_url) = env::var("CATALOG_URL").or_else(|_| env::var("DATABASE_URL")) {
            builder = builder.set_override("catalog.url", catalog_url)?;
        }

        if let Ok(size) = env::var("REFERENCE_CACHE_SIZE") {
            if let Ok(size) = size.parse::<u64>() {
                builder = builder.set_override("planner.cache_max_entries", size)?;
            }
        }

        if let Ok(ttl) = env::var("REFERENCE_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                builder = builder.set_override("planner.cache_ttl_secs", ttl)?;
            }
        }

        if let Ok(max_len) = env::var("MAX_SQL_LENGTH") {
            if let Ok(max_len) = max_len.parse::<u64>() {
                builder = builder.set_override("planner.max_sql_length", max_len)?;
            }
        }

        if let Ok(prefixes) = env::var("LOCAL_PREFIXES") {
            builder = builder.set_override("planner.local_prefixes", parse_list(&prefixes))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Comma-separated list, blanks dropped
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env();
        assert!(config.is_ok());

        let config = config.unwrap();
        assert!(!config.catalog.url.is_empty());
        assert!(config.planner.max_sql_length > 0);
        assert!(!config.server.host.is_empty());
    }

    #[test]
    fn test_planner_defaults() {
        let planner = PlannerConfig::default();
        assert_eq!(planner.cache_max_entries, 500);
        assert_eq!(planner.cache_ttl_secs, 300);
        assert!(planner.local_prefixes.contains(&"main".to_string()));
        assert!(planner.local_prefixes.contains(&"information_schema".to_string()));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("main, temp,,  pg_catalog "), vec!["main", "temp", "pg_catalog"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_server_address() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            catalog: CatalogConfig {
                url: "./metadata.db".to_string(),
            },
            planner: PlannerConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                style: "auto".to_string(),
            },
        };
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }
}
