use super::load_manifest_or_exit;
use crate::output;
use anyhow::Context;
use hatch3r_core::adapters::adapter_for;
use hatch3r_core::managed::extract_managed_block;
use hatch3r_core::paths;
use std::path::Path;

#[derive(Default)]
struct Stats {
    synced: usize,
    drifted: usize,
    missing: usize,
}

/// Dry-run comparison of freshly generated output against what is on disk.
/// Managed outputs compare block inner content so user edits outside the
/// block never count as drift. Never writes.
pub fn run(root: &Path) -> anyhow::Result<()> {
    output::banner();

    let manifest = load_manifest_or_exit(root)?;
    let agents_dir = paths::agents_dir(root);
    let mut stats = Stats::default();
    let mut lines: Vec<String> = Vec::new();

    for tool in &manifest.tools {
        let adapter = adapter_for(*tool);
        let outputs = adapter
            .generate(&agents_dir, &manifest)
            .with_context(|| format!("failed to generate {tool} output"))?;

        lines.push(format!("{tool}:"));

        for out in outputs {
            let dest = root.join(&out.path);
            match std::fs::read_to_string(&dest) {
                Ok(existing) => {
                    let existing_block = extract_managed_block(&existing);
                    let expected_block = out
                        .managed_content
                        .as_ref()
                        .map(|s| s.trim().to_string())
                        .or_else(|| extract_managed_block(&out.content));
                    let in_sync = match (existing_block, expected_block) {
                        (Some(have), Some(want)) => have == want,
                        _ => existing == out.content,
                    };
                    if in_sync {
                        lines.push(format!("  = {}", out.path));
                        stats.synced += 1;
                    } else {
                        lines.push(format!("  ~ {} (drifted)", out.path));
                        stats.drifted += 1;
                    }
                }
                Err(_) => {
                    lines.push(format!("  + {} (missing)", out.path));
                    stats.missing += 1;
                }
            }
        }
    }

    println!();
    for line in &lines {
        println!("  {line}");
    }
    println!();

    let mut summary = vec![format!("= In sync: {}", stats.synced)];
    if stats.drifted > 0 {
        summary.push(format!("~ Drifted: {}", stats.drifted));
    }
    if stats.missing > 0 {
        summary.push(format!("+ Missing: {}", stats.missing));
    }
    output::print_box("Status", &summary);

    if stats.drifted > 0 || stats.missing > 0 {
        output::info("Run `hatch3r sync` to regenerate drifted/missing files.");
        println!();
    }

    Ok(())
}
