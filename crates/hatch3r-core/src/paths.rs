use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory and file constants
// ---------------------------------------------------------------------------

/// Canonical source-of-truth directory at the project root.
pub const AGENTS_DIR: &str = ".agents";
/// Project manifest inside the canonical directory.
pub const MANIFEST_FILE: &str = "hatch.json";
/// User-authored customization side directory.
pub const CUSTOMIZE_DIR: &str = ".hatch3r";
/// Basename prefix marking a generated file as fully regenerable.
pub const HATCH3R_PREFIX: &str = "hatch3r-";
/// Gitignored secrets file for MCP servers.
pub const ENV_MCP_FILE: &str = ".env.mcp";
/// Sibling directory that receives pre-write backup copies.
pub const BACKUPS_DIR: &str = ".backups";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn agents_dir(root: &Path) -> PathBuf {
    root.join(AGENTS_DIR)
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(AGENTS_DIR).join(MANIFEST_FILE)
}

pub fn mcp_config_path(agents_dir: &Path) -> PathBuf {
    agents_dir.join("mcp").join("mcp.json")
}

pub fn customize_yaml_path(project_root: &Path, dir: &str, id: &str) -> PathBuf {
    project_root
        .join(CUSTOMIZE_DIR)
        .join(dir)
        .join(format!("{id}.customize.yaml"))
}

pub fn customize_md_path(project_root: &Path, dir: &str, id: &str) -> PathBuf {
    project_root
        .join(CUSTOMIZE_DIR)
        .join(dir)
        .join(format!("{id}.customize.md"))
}

/// Returns `id` with exactly one `hatch3r-` prefix (strips any existing
/// prefix before adding).
pub fn to_prefixed_id(id: &str) -> String {
    let base = id.strip_prefix(HATCH3R_PREFIX).unwrap_or(id);
    format!("{HATCH3R_PREFIX}{base}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
