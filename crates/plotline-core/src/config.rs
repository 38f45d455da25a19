/// Server configuration, loaded once at startup from environment variables.
///
/// Lives in `plotline-core` so integration tests and future crates can build
/// one without depending on the full server.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    pub cors_origins: Vec<String>,
    /// IANA timezone used when neither the request nor the website sets one.
    pub default_timezone: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("PLOTLINE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("PLOTLINE_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("PLOTLINE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            cors_origins: std::env::var("PLOTLINE_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            default_timezone: std::env::var("PLOTLINE_DEFAULT_TIMEZONE")
                .unwrap_or_else(|_| "UTC".to_string()),
        })
    }
}
