use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Bind address used when neither the CLI nor the environment names one.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:5000";
/// Upper bound on a catalog fetch before recommendations give up.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Returns `~/.dipia`.
pub fn dipia_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".dipia"))
}

/// Returns the config file path, honoring `DIPIA_CONFIG`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("DIPIA_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    dipia_dir().ok().map(|d| d.join("config.toml"))
}

/// Returns the catalog file path, honoring `DIPIA_STORE`.
pub fn store_path() -> Result<PathBuf> {
    if let Ok(custom) = std::env::var("DIPIA_STORE") {
        return Ok(PathBuf::from(custom));
    }
    Ok(dipia_dir()?.join("catalog.json"))
}

/// Returns the bind address from `DIPIA_HTTP`.
pub fn env_http() -> String {
    std::env::var("DIPIA_HTTP")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
}

/// Returns the bearer token from `DIPIA_AUTH_TOKEN`, if any.
pub fn env_auth_token() -> Option<String> {
    std::env::var("DIPIA_AUTH_TOKEN")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Returns CORS origins from the comma-separated `DIPIA_CORS_ORIGINS`.
pub fn env_cors_origins() -> Vec<String> {
    std::env::var("DIPIA_CORS_ORIGINS")
        .map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Catalog fetch timeout from `DIPIA_FETCH_TIMEOUT_MS`.
pub fn fetch_timeout() -> Duration {
    let ms = std::env::var("DIPIA_FETCH_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
    Duration::from_millis(ms)
}
