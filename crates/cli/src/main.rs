//! Command-line interface for the `dipia` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `dipia-server` crate.

fn main() -> anyhow::Result<()> {
    dipia_server::run()
}
