//! Handler for the `material` command family.

use super::open_store;
use crate::cli::{MaterialAction, OutputFormat};
use anyhow::Result;
use dipia_catalog::{CatalogStore, Material};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Handle the `material` command.
pub(crate) fn handle_material_command(store: Option<PathBuf>, action: MaterialAction) -> Result<()> {
    let store = open_store(store)?;
    let rt = Runtime::new()?;
    let output = rt.block_on(run_action(&store, action))?;
    print!("{output}");
    Ok(())
}

/// Run one catalog action and render its result.
async fn run_action(store: &dyn CatalogStore, action: MaterialAction) -> Result<String> {
    let rendered = match action {
        MaterialAction::List { owner, format } => {
            render_list(&store.list_materials_by_owner(owner).await?, format)?
        }
        MaterialAction::Add { owner, fields } => {
            let created = store.create_material(owner, fields.into()).await?;
            tracing::info!(target: "dipia::catalog", id = %created.id, owner = %owner, "Material created");
            format!("Created material {} ({})\n", created.id, created.name)
        }
        MaterialAction::Update { owner, id, fields } => {
            let updated = store.update_material(id, owner, fields.into()).await?;
            format!("Updated material {} ({})\n", updated.id, updated.name)
        }
        MaterialAction::Delete { owner, id } => {
            store.delete_material(id, owner).await?;
            format!("Deleted material {id}\n")
        }
        MaterialAction::Use { owner, id } => {
            let count = store.update_usage_count(id, owner).await?;
            format!("Material {id} used {count} times\n")
        }
        MaterialAction::Favorite { owner, id, unset } => {
            store.update_favorite(id, owner, !unset).await?;
            if unset {
                format!("Material {id} removed from favorites\n")
            } else {
                format!("Material {id} marked as favorite\n")
            }
        }
        MaterialAction::MostUsed {
            owner,
            limit,
            format,
        } => render_list(&store.most_used(owner, limit).await?, format)?,
        MaterialAction::Recent {
            owner,
            limit,
            format,
        } => render_list(&store.recent(owner, limit).await?, format)?,
    };
    Ok(rendered)
}

fn render_list(materials: &[Material], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(materials)?));
    }
    if materials.is_empty() {
        return Ok("No materials found.\n".to_string());
    }

    let mut out = String::new();
    for m in materials {
        let star = if m.is_favorite { "*" } else { " " };
        out.push_str(&format!(
            "{star} {:>4}  {:<24} {:>10.2}/{:<6} {:<12} used {:>3}  [{}]\n",
            m.id.0,
            m.name,
            m.price,
            m.unit,
            m.category,
            m.usage_count,
            m.pathology_tags.join(", ")
        ));
    }
    Ok(out)
}
