//! `dazzlenodes load` and `dazzlenodes exports`.

use std::{fmt::Write, path::PathBuf};

use {
    clap::Subcommand,
    dazzle_plugins::{LoadPass, init_aggregate},
};

use crate::load_project;

#[derive(Subcommand)]
pub enum LoadAction {
    /// Run one load pass and report what registered.
    Load {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the host contract as JSON.
    Exports,
}

pub fn handle_load(action: LoadAction, root: Option<PathBuf>) -> anyhow::Result<()> {
    let (root, config) = load_project(root)?;
    let pass = init_aggregate(&root, &config);

    match action {
        LoadAction::Load { json } => {
            pass.log_summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary_json(&pass))?);
            } else {
                print!("{}", render_summary(&pass));
            }
        },
        LoadAction::Exports => {
            let exports = pass.host_exports(&config.sync.output_dir);
            println!("{}", exports.to_json_pretty()?);
        },
    }

    Ok(())
}

fn summary_json(pass: &LoadPass) -> serde_json::Value {
    let loaded: Vec<_> = pass
        .loaded
        .iter()
        .map(|n| {
            serde_json::json!({
                "name": n.name,
                "label": n.label,
                "classes": n.class_count,
            })
        })
        .collect();
    let failed: Vec<_> = pass
        .failed
        .iter()
        .map(|(name, e)| serde_json::json!({ "name": name, "error": e.to_string() }))
        .collect();

    serde_json::json!({
        "loaded": loaded,
        "failed": failed,
        "collisions": pass.collisions,
        "classes": pass.registry.len(),
    })
}

fn render_summary(pass: &LoadPass) -> String {
    let mut out = String::new();
    if pass.is_empty() {
        let _ = writeln!(out, "No nodes loaded.");
    }
    for node in &pass.loaded {
        let label = node.label.as_deref().unwrap_or(&node.name);
        let _ = writeln!(
            out,
            "  ✓ {label} [{}] ({} classes)",
            node.name, node.class_count
        );
    }
    for (name, e) in &pass.failed {
        let _ = writeln!(out, "  ✗ {name}: {e}");
    }
    for c in &pass.collisions {
        let _ = writeln!(
            out,
            "  ! {} registered by {} and {}",
            c.class_id, c.previous, c.incoming
        );
    }
    let _ = writeln!(
        out,
        "{} node(s) loaded, {} failed, {} classes available",
        pass.loaded.len(),
        pass.failed.len(),
        pass.registry.len()
    );
    out
}
