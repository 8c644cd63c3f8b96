//! Handler for the `serve` command.

use anyhow::Result;
use dipia_state::Config;
use std::path::PathBuf;

/// Handle the `serve` command.
///
/// Flags win over `DIPIA_*` variables, which already include any values
/// carried over from the config file.
#[cfg(feature = "http-transport")]
pub(crate) fn handle_serve_command(
    config: &Config,
    http: Option<String>,
    store: Option<PathBuf>,
    auth_token: Option<String>,
    cors_origins: Vec<String>,
) -> Result<()> {
    use super::open_store;
    use crate::app::{class_map_from_config, engine_from_config};
    use crate::http_transport::{serve_http, AppState, HttpSecurityConfig};
    use std::sync::Arc;
    use tokio::runtime::Runtime;

    let bind_addr = http.unwrap_or_else(dipia_state::env_http);
    let security = HttpSecurityConfig {
        auth_token: auth_token
            .filter(|t| !t.is_empty())
            .or_else(dipia_state::env_auth_token),
        cors_origins: if cors_origins.is_empty() {
            dipia_state::env_cors_origins()
        } else {
            cors_origins
        },
    };

    let store = open_store(store)?;
    tracing::info!(
        target: "dipia::catalog",
        path = %store.path().display(),
        "Catalog ready"
    );

    let state = AppState::new(Arc::new(store), engine_from_config(config)?)
        .with_class_map(class_map_from_config(config)?)
        .with_fetch_timeout(dipia_state::fetch_timeout());

    let rt = Runtime::new()?;
    rt.block_on(serve_http(state, &bind_addr, security))
}

#[cfg(not(feature = "http-transport"))]
pub(crate) fn handle_serve_command(
    _config: &Config,
    _http: Option<String>,
    _store: Option<PathBuf>,
    _auth_token: Option<String>,
    _cors_origins: Vec<String>,
) -> Result<()> {
    anyhow::bail!("dipia was built without the `http-transport` feature; `serve` is unavailable")
}
