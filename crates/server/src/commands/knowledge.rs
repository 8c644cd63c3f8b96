//! Handler for the `knowledge` command.

use crate::cli::OutputFormat;
use anyhow::{bail, Result};
use dipia_intelligence::{knowledge_keys, lookup, KnowledgeEntry};

/// Handle the `knowledge` command.
pub(crate) fn handle_knowledge_command(damage_type: &str, format: OutputFormat) -> Result<()> {
    let Some(entry) = lookup(damage_type) else {
        let known: Vec<_> = knowledge_keys().collect();
        bail!(
            "unknown damage type: {damage_type} (known: {})",
            known.join(", ")
        );
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entry)?),
        OutputFormat::Text => print!("{}", render_entry(entry)),
    }
    Ok(())
}

fn render_entry(entry: &KnowledgeEntry) -> String {
    let mut out = format!("{}\n", entry.title);
    out.push_str(&format!("{}\n\n", "=".repeat(entry.title.chars().count())));
    out.push_str(&format!("{}\n\n", entry.definition));
    out.push_str("Causes:\n");
    for cause in entry.causes {
        out.push_str(&format!("  - {cause}\n"));
    }
    out.push_str(&format!("\nSeverity: {}\n", entry.severity));
    out.push_str(&format!("Action required: {}\n", entry.action_required));
    out
}
