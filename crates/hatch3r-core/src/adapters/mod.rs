use crate::error::Result;
use crate::manifest::{HatchManifest, Tool};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

mod aider;
mod amp;
mod claude;
mod cline;
mod codex;
mod content;
mod copilot;
mod cursor;
mod gemini;
mod goose;
mod kiro;
mod opencode;
mod windsurf;
mod zed;

pub use aider::AiderAdapter;
pub use amp::AmpAdapter;
pub use claude::ClaudeAdapter;
pub use cline::ClineAdapter;
pub use codex::CodexAdapter;
pub use content::{agents_md_full, AGENTS_MD_INNER, BRIDGE_ORCHESTRATION, CANONICAL_AGENTS_MD};
pub use copilot::CopilotAdapter;
pub use cursor::CursorAdapter;
pub use gemini::GeminiAdapter;
pub use goose::GooseAdapter;
pub use kiro::KiroAdapter;
pub use opencode::OpenCodeAdapter;
pub use windsurf::WindsurfAdapter;
pub use zed::ZedAdapter;

// ---------------------------------------------------------------------------
// Adapter interface
// ---------------------------------------------------------------------------

/// Requested disposition from the adapter. Advisory only: the safe writer
/// decides the real action from on-disk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    Create,
    Update,
    Skip,
}

/// One generated file. `managed_content` present means managed-block
/// (partial-file) ownership; absent means whole-file ownership.
#[derive(Debug, Clone)]
pub struct AdapterOutput {
    /// Path relative to the project root.
    pub path: String,
    pub content: String,
    pub managed_content: Option<String>,
    pub action: OutputAction,
}

/// A tool-specific formatter: pure function from the canonical directory and
/// manifest to output paths/content. All shared business rules (scope
/// resolution, model aliasing, customization, wrapping) live in the leaf
/// components — adapter bodies are formatting only.
pub trait Adapter {
    fn name(&self) -> &'static str;
    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>>;
}

pub fn adapter_for(tool: Tool) -> Box<dyn Adapter> {
    match tool {
        Tool::Cursor => Box::new(CursorAdapter),
        Tool::Copilot => Box::new(CopilotAdapter),
        Tool::Claude => Box::new(ClaudeAdapter),
        Tool::Opencode => Box::new(OpenCodeAdapter),
        Tool::Windsurf => Box::new(WindsurfAdapter),
        Tool::Amp => Box::new(AmpAdapter),
        Tool::Codex => Box::new(CodexAdapter),
        Tool::Gemini => Box::new(GeminiAdapter),
        Tool::Cline => Box::new(ClineAdapter),
        Tool::Aider => Box::new(AiderAdapter),
        Tool::Kiro => Box::new(KiroAdapter),
        Tool::Goose => Box::new(GooseAdapter),
        Tool::Zed => Box::new(ZedAdapter),
    }
}

pub(crate) fn output(path: impl Into<String>, content: impl Into<String>) -> AdapterOutput {
    AdapterOutput {
        path: path.into(),
        content: content.into(),
        managed_content: None,
        action: OutputAction::Create,
    }
}

pub(crate) fn managed(
    path: impl Into<String>,
    content: impl Into<String>,
    inner: impl Into<String>,
) -> AdapterOutput {
    AdapterOutput {
        path: path.into(),
        content: content.into(),
        managed_content: Some(inner.into()),
        action: OutputAction::Create,
    }
}

pub(crate) fn project_root(agents_dir: &Path) -> &Path {
    agents_dir.parent().unwrap_or(Path::new("."))
}

// ---------------------------------------------------------------------------
// Shared MCP config reading
// ---------------------------------------------------------------------------

/// One server entry from the canonical `.agents/mcp/mcp.json`. Keys starting
/// with `_` are hatch3r-internal annotations stripped before emitting native
/// configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct McpServerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(
        default,
        rename = "_disabled",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
struct McpFile {
    #[serde(default, rename = "mcpServers")]
    mcp_servers: BTreeMap<String, McpServerEntry>,
}

/// Typed view of the canonical MCP config, with disabled servers removed.
/// Any read or parse failure logs a warning and yields `None` — a broken
/// MCP file must not abort generation of everything else.
pub(crate) fn read_mcp_servers(agents_dir: &Path) -> Option<BTreeMap<String, McpServerEntry>> {
    let path = paths::mcp_config_path(agents_dir);
    let raw = match std::fs::read_to_string(&path) {
        Ok(r) => r,
        Err(e) => {
            warn!("could not read MCP config: {e}");
            return None;
        }
    };
    match serde_json::from_str::<McpFile>(&raw) {
        Ok(file) => Some(
            file.mcp_servers
                .into_iter()
                .filter(|(_, s)| !s.disabled)
                .collect(),
        ),
        Err(e) => {
            warn!("could not parse MCP config: {e}");
            None
        }
    }
}

/// Raw text of the canonical MCP config, for adapters that forward the file
/// verbatim.
pub(crate) fn read_mcp_raw(agents_dir: &Path) -> Option<String> {
    let path = paths::mcp_config_path(agents_dir);
    match std::fs::read_to_string(&path) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("could not read MCP config: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
