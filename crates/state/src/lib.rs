//! Runtime settings for dipia.
//!
//! This crate provides utilities for:
//! - Reading `DIPIA_*` environment variables with their defaults.
//! - Loading `~/.dipia/config.toml` and applying it beneath the environment.

pub mod config;
pub mod env;

pub use config::{
    apply_config_to_env, load_config, load_config_from, Config, DetectorConfig, EngineConfig,
    ServeConfig,
};
pub use env::{
    config_path, dipia_dir, env_auth_token, env_cors_origins, env_http, fetch_timeout, home_dir,
    store_path, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_HTTP_ADDR,
};
