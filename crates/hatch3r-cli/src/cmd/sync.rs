use super::{load_manifest_or_exit, write_plain};
use crate::output;
use anyhow::Context;
use hatch3r_core::adapters::{adapter_for, agents_md_full, AGENTS_MD_INNER, CANONICAL_AGENTS_MD};
use hatch3r_core::io;
use hatch3r_core::mcp_env::{ensure_env_mcp, source_env_mcp_command};
use hatch3r_core::paths;
use hatch3r_core::writer::{safe_write_file, WriteAction, WriteOptions};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    output::banner();

    let manifest = load_manifest_or_exit(root)?;
    let agents_dir = paths::agents_dir(root);
    let mut results: Vec<(String, WriteAction)> = Vec::new();
    let total = manifest.tools.len() + 1;

    println!("  {}", output::step(1, total, "Syncing AGENTS.md..."));
    let agents_md = safe_write_file(
        &root.join("AGENTS.md"),
        &agents_md_full(),
        &WriteOptions {
            managed_content: Some(AGENTS_MD_INNER.to_string()),
            ..Default::default()
        },
    )?;
    results.push(("AGENTS.md".to_string(), agents_md.action));
    io::atomic_write(&agents_dir.join("AGENTS.md"), CANONICAL_AGENTS_MD.as_bytes())?;
    results.push((
        format!("{}/AGENTS.md", paths::AGENTS_DIR),
        WriteAction::Updated,
    ));

    for (i, tool) in manifest.tools.iter().enumerate() {
        println!(
            "  {}",
            output::step(i + 2, total, &format!("Generating {tool} output..."))
        );
        let adapter = adapter_for(*tool);
        let outputs = adapter
            .generate(&agents_dir, &manifest)
            .with_context(|| format!("failed to generate {tool} output"))?;
        for out in outputs {
            let action = if out.managed_content.is_some() {
                safe_write_file(
                    &root.join(&out.path),
                    &out.content,
                    &WriteOptions {
                        managed_content: out.managed_content.clone(),
                        ..Default::default()
                    },
                )
                .with_context(|| format!("failed to write {}", out.path))?
                .action
            } else {
                write_plain(root, &out)?
            };
            results.push((out.path, action));
        }
    }

    if manifest.features.mcp && !manifest.mcp.servers.is_empty() {
        let env = ensure_env_mcp(root, &manifest.mcp.servers)?;
        if env.action != WriteAction::Skipped {
            results.push((env.path.clone(), env.action));
        }
        if !env.new_vars.is_empty() {
            output::warn(&format!(
                "New secrets needed in .env.mcp: {}",
                env.new_vars.join(", ")
            ));
            output::info(&format!(
                "Run this, then start or restart your editor: {}",
                source_env_mcp_command()
            ));
        }
    }

    println!();
    output::print_results(&results);
    println!();

    let synced = results
        .iter()
        .filter(|(_, a)| *a == WriteAction::Skipped)
        .count();
    let written = results.len() - synced;
    output::print_box(
        "Sync complete",
        &[
            format!("{written} file(s) written"),
            format!("{synced} file(s) already in sync"),
        ],
    );

    Ok(())
}
