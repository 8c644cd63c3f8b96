//! This crate provides the core functionality for the `dipia` application: the
//! command-line interface, the HTTP surface the detector pushes to, and the
//! wiring between the detection inbox, the materials catalog, and the
//! recommendation engine.
//!
//! The main entry point is the `run` function. The `http-transport` feature
//! (on by default) enables the `serve` command; without it only the offline
//! catalog and recommendation commands are available.

mod app;
pub mod cli;
mod commands;
#[cfg(feature = "http-transport")]
pub mod http_transport;

pub use app::{class_map_from_config, engine_from_config, run};
