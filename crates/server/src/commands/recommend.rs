//! CLI handler for the `recommend` command.

use super::open_store;
use crate::app::engine_from_config;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use dipia_catalog::OwnerId;
use dipia_intelligence::{summarize, Recommendation};
use dipia_state::Config;
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// JSON shape of the `recommend` output.
#[derive(Debug, Serialize)]
struct RecommendReport<'a> {
    owner: OwnerId,
    labels: &'a [String],
    total_found: usize,
    recommendations: &'a [Recommendation],
}

/// Handle the `recommend` command.
pub(crate) fn handle_recommend_command(
    config: &Config,
    owner: OwnerId,
    labels: Vec<String>,
    store: Option<PathBuf>,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let engine = engine_from_config(config)?;
    let store = open_store(store)?;
    let timeout = dipia_state::fetch_timeout();

    let rt = Runtime::new()?;
    let mut recommendations = rt
        .block_on(engine.recommend_from_store(&store, &labels, owner, timeout))
        .context("failed to compute recommendations")?;

    let total_found = recommendations.len();
    if let Some(limit) = limit {
        recommendations.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            let report = RecommendReport {
                owner,
                labels: &labels,
                total_found,
                recommendations: &recommendations,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Material Recommendations");
            println!("========================\n");
            println!("Owner: {owner}");
            println!("Pathologies: {}", labels.join(", "));
            println!(
                "Found: {} materials (showing {})\n",
                total_found,
                recommendations.len()
            );
            println!("{}", summarize(&recommendations));
        }
    }

    Ok(())
}
