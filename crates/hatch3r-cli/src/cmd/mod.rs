pub mod init;
pub mod status;
pub mod sync;
pub mod update;
pub mod validate;

use crate::output;
use hatch3r_core::adapters::AdapterOutput;
use hatch3r_core::io;
use hatch3r_core::manifest::HatchManifest;
use hatch3r_core::writer::WriteAction;
use hatch3r_core::HatchError;
use std::path::Path;

/// Load the manifest, printing the init hint and exiting 1 when the project
/// has not been set up yet.
pub(crate) fn load_manifest_or_exit(root: &Path) -> anyhow::Result<HatchManifest> {
    match HatchManifest::load(root) {
        Ok(m) => Ok(m),
        Err(HatchError::NotInitialized) => {
            output::error("No .agents/hatch.json found.");
            output::info("Run `hatch3r init` to set up your project first.");
            println!();
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Compare-then-write for whole-file adapter outputs during sync/update.
/// Unchanged files report `skipped` so a second pass is a no-op.
pub(crate) fn write_plain(root: &Path, out: &AdapterOutput) -> anyhow::Result<WriteAction> {
    let full = root.join(&out.path);
    match std::fs::read_to_string(&full) {
        Ok(existing) if existing == out.content => Ok(WriteAction::Skipped),
        Ok(_) => {
            io::atomic_write(&full, out.content.as_bytes())?;
            Ok(WriteAction::Updated)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            io::atomic_write(&full, out.content.as_bytes())?;
            Ok(WriteAction::Created)
        }
        Err(e) => Err(e.into()),
    }
}
