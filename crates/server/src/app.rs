//! Process bootstrap and config-derived components.

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_knowledge_command, handle_material_command, handle_recommend_command,
    handle_serve_command,
};
use anyhow::{Context, Result};
use clap::Parser;
use dipia_detection::ClassMap;
use dipia_intelligence::{RecommendationEngine, SynonymTable};
use dipia_state::{apply_config_to_env, load_config, Config};

/// Parse the command line and run the selected command.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config()?.unwrap_or_default();
    apply_config_to_env(&config);

    let cli = Cli::parse();
    match cli.command.unwrap_or_else(Commands::default_serve) {
        Commands::Serve {
            http,
            store,
            auth_token,
            cors_origins,
        } => handle_serve_command(&config, http, store, auth_token, cors_origins),
        Commands::Recommend {
            owner,
            labels,
            store,
            format,
            limit,
        } => handle_recommend_command(&config, owner, labels, store, format, limit),
        Commands::Material { store, action } => handle_material_command(store, action),
        Commands::Knowledge { damage_type, format } => {
            handle_knowledge_command(&damage_type, format)
        }
    }
}

/// Engine using `[engine.synonyms]`, or the built-in table when none are set.
pub fn engine_from_config(config: &Config) -> Result<RecommendationEngine> {
    let synonyms = if config.engine.synonyms.is_empty() {
        SynonymTable::default()
    } else {
        SynonymTable::from_pairs(&config.engine.synonyms)
            .context("invalid [engine.synonyms] in config")?
    };
    for (from, to) in synonyms.iter() {
        tracing::trace!(target: "dipia::config", from, to, "Pathology synonym");
    }
    tracing::debug!(
        target: "dipia::config",
        synonyms = synonyms.len(),
        "Configured recommendation engine"
    );
    Ok(RecommendationEngine::new(synonyms))
}

/// Class map using `[detector.classes]`, or the built-in layout when none are set.
pub fn class_map_from_config(config: &Config) -> Result<ClassMap> {
    if config.detector.classes.is_empty() {
        return Ok(ClassMap::default());
    }
    Ok(ClassMap::from_pairs(config.detector.class_pairs()?))
}
