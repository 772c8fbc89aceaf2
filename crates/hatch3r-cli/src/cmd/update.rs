use super::{init, load_manifest_or_exit, write_plain};
use crate::output;
use anyhow::Context;
use hatch3r_core::adapters::{adapter_for, CANONICAL_AGENTS_MD};
use hatch3r_core::io;
use hatch3r_core::manifest::HATCH3R_VERSION;
use hatch3r_core::paths;
use hatch3r_core::writer::{safe_write_file, WriteOptions};
use std::path::Path;

pub fn run(root: &Path, backup: bool) -> anyhow::Result<()> {
    output::banner();

    let mut manifest = load_manifest_or_exit(root)?;
    let agents_dir = paths::agents_dir(root);

    if manifest.hatch3r_version == HATCH3R_VERSION {
        output::info(&format!("Already at hatch3r v{HATCH3R_VERSION}"));
    } else {
        output::info(&format!(
            "Updating from v{} to v{HATCH3R_VERSION}",
            manifest.hatch3r_version
        ));
    }
    println!();

    let total = 3;

    println!("  {}", output::step(1, total, "Updating canonical files..."));
    let refreshed = init::write_seed_files(&agents_dir)?;
    io::atomic_write(&agents_dir.join("AGENTS.md"), CANONICAL_AGENTS_MD.as_bytes())?;
    println!(
        "  {}",
        output::step(1, total, &format!("Updated {} canonical files", refreshed.len()))
    );

    println!("  {}", output::step(2, total, "Re-syncing adapter output..."));
    for tool in manifest.tools.clone() {
        let adapter = adapter_for(tool);
        let outputs = adapter
            .generate(&agents_dir, &manifest)
            .with_context(|| format!("failed to generate {tool} output"))?;
        for out in outputs {
            if out.managed_content.is_some() {
                safe_write_file(
                    &root.join(&out.path),
                    &out.content,
                    &WriteOptions {
                        managed_content: out.managed_content.clone(),
                        backup,
                        append_if_no_block: false,
                    },
                )
                .with_context(|| format!("failed to write {}", out.path))?;
            } else {
                write_plain(root, &out)?;
            }
        }
    }
    println!(
        "  {}",
        output::step(2, total, &format!("Re-synced {} tool(s)", manifest.tools.len()))
    );

    println!("  {}", output::step(3, total, "Writing manifest..."));
    manifest.hatch3r_version = HATCH3R_VERSION.to_string();
    manifest.save(root)?;

    println!();
    output::print_box(
        "Update complete",
        &[
            output::label("Files", &format!("{} canonical files updated", refreshed.len())),
            output::label("Tools", &format!("{} tool(s) re-synced", manifest.tools.len())),
            output::label("Version", &format!("v{HATCH3R_VERSION}")),
        ],
    );

    Ok(())
}
