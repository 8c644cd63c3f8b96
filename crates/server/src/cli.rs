use clap::{Args, Parser, Subcommand, ValueEnum};
use dipia_catalog::{MaterialId, NewMaterial, OwnerId};
use std::path::PathBuf;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Command-line interface for the `dipia` application.
#[derive(Debug, Parser)]
#[command(
    name = "dipia",
    about = "Structural damage detection inbox and materials recommendation engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available `dipia` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Runs the HTTP API: detection push, catalog, and recommendations.
    Serve {
        /// Bind address (overrides `DIPIA_HTTP`).
        #[arg(long, value_name = "ADDR")]
        http: Option<String>,
        /// Catalog file (overrides `DIPIA_STORE`).
        #[arg(long, value_name = "PATH")]
        store: Option<PathBuf>,
        /// Bearer token required on every request (overrides `DIPIA_AUTH_TOKEN`).
        #[arg(long, value_name = "TOKEN")]
        auth_token: Option<String>,
        /// Allowed CORS origin (repeatable, overrides `DIPIA_CORS_ORIGINS`).
        #[arg(long = "cors-origin", value_name = "ORIGIN")]
        cors_origins: Vec<String>,
    },
    /// Ranks an owner's materials for the given pathology labels.
    Recommend {
        /// Owner whose catalog is searched.
        #[arg(long)]
        owner: OwnerId,
        /// Pathology label as reported by the detector (repeatable or comma-separated).
        #[arg(long = "label", required = true, value_delimiter = ',')]
        labels: Vec<String>,
        /// Catalog file (overrides `DIPIA_STORE`).
        #[arg(long, value_name = "PATH")]
        store: Option<PathBuf>,
        /// Output format: text or json.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Maximum number of recommendations to show.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Manages catalog materials.
    Material {
        /// Catalog file (overrides `DIPIA_STORE`).
        #[arg(long, value_name = "PATH", global = true)]
        store: Option<PathBuf>,
        #[command(subcommand)]
        action: MaterialAction,
    },
    /// Shows reference information for a damage type (e.g. `grieta_escalonada`).
    Knowledge {
        damage_type: String,
        /// Output format: text or json.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Commands {
    /// What a bare `dipia` invocation runs.
    pub fn default_serve() -> Self {
        Self::Serve {
            http: None,
            store: None,
            auth_token: None,
            cors_origins: Vec::new(),
        }
    }
}

/// Catalog operations, all scoped to `--owner`.
#[derive(Debug, Subcommand)]
pub enum MaterialAction {
    /// Lists materials, newest first.
    List {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Adds a material.
    Add {
        #[arg(long)]
        owner: OwnerId,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Replaces a material's editable fields.
    Update {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long)]
        id: MaterialId,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Deletes a material.
    Delete {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long)]
        id: MaterialId,
    },
    /// Records one use of a material.
    Use {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long)]
        id: MaterialId,
    },
    /// Marks a material as favorite (or clears it with `--unset`).
    Favorite {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long)]
        id: MaterialId,
        #[arg(long, default_value_t = false)]
        unset: bool,
    },
    /// Lists the most used materials.
    MostUsed {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Lists the most recently added materials.
    Recent {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Editable material fields shared by `add` and `update`.
#[derive(Debug, Clone, Args)]
pub struct MaterialFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub supplier: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub unit: String,
    /// Defaults to "General".
    #[arg(long)]
    pub category: Option<String>,
    /// Pathology tag (repeatable or comma-separated).
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub image: Option<String>,
}

impl From<MaterialFields> for NewMaterial {
    fn from(f: MaterialFields) -> Self {
        NewMaterial {
            name: f.name,
            supplier: f.supplier,
            price: f.price,
            unit: f.unit,
            category: f.category,
            pathology_tags: f.tags,
            image: f.image,
        }
    }
}
