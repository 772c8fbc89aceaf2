use crate::error::{HatchError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Version of the hatch3r binary embedded at compile time.
pub const HATCH3R_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Tool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Cursor,
    Copilot,
    Claude,
    Opencode,
    Windsurf,
    Amp,
    Codex,
    Gemini,
    Cline,
    Aider,
    Kiro,
    Goose,
    Zed,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Cursor,
            Tool::Copilot,
            Tool::Claude,
            Tool::Opencode,
            Tool::Windsurf,
            Tool::Amp,
            Tool::Codex,
            Tool::Gemini,
            Tool::Cline,
            Tool::Aider,
            Tool::Kiro,
            Tool::Goose,
            Tool::Zed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Cursor => "cursor",
            Tool::Copilot => "copilot",
            Tool::Claude => "claude",
            Tool::Opencode => "opencode",
            Tool::Windsurf => "windsurf",
            Tool::Amp => "amp",
            Tool::Codex => "codex",
            Tool::Gemini => "gemini",
            Tool::Cline => "cline",
            Tool::Aider => "aider",
            Tool::Kiro => "kiro",
            Tool::Goose => "goose",
            Tool::Zed => "zed",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Cursor => "Cursor",
            Tool::Copilot => "GitHub Copilot",
            Tool::Claude => "Claude Code",
            Tool::Opencode => "OpenCode",
            Tool::Windsurf => "Windsurf",
            Tool::Amp => "Amp",
            Tool::Codex => "Codex CLI",
            Tool::Gemini => "Gemini CLI",
            Tool::Cline => "Cline / Roo Code",
            Tool::Aider => "Aider",
            Tool::Kiro => "Kiro",
            Tool::Goose => "Goose",
            Tool::Zed => "Zed",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tool {
    type Err = HatchError;

    fn from_str(s: &str) -> Result<Self> {
        Tool::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| HatchError::UnknownTool(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Boolean flags gating each content category per adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default = "default_true")]
    pub agents: bool,
    #[serde(default = "default_true")]
    pub skills: bool,
    #[serde(default = "default_true")]
    pub rules: bool,
    #[serde(default = "default_true")]
    pub prompts: bool,
    #[serde(default = "default_true")]
    pub commands: bool,
    #[serde(default = "default_true")]
    pub mcp: bool,
    #[serde(default)]
    pub guardrails: bool,
    #[serde(default = "default_true")]
    pub github_agents: bool,
    #[serde(default = "default_true")]
    pub hooks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Features {
    fn default() -> Self {
        Self {
            agents: true,
            skills: true,
            rules: true,
            prompts: true,
            commands: true,
            mcp: true,
            guardrails: false,
            github_agents: true,
            hooks: true,
        }
    }
}

// ---------------------------------------------------------------------------
// McpConfig / ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Global and per-agent model preference. Sits below Customization in the
/// override precedence chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agents: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// HatchManifest
// ---------------------------------------------------------------------------

/// Process-wide configuration, not global state: constructed once per
/// command invocation from `.agents/hatch.json` and passed explicitly
/// through every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchManifest {
    pub version: String,
    pub hatch3r_version: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelConfig>,
    #[serde(default)]
    pub managed_files: Vec<String>,
}

impl HatchManifest {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        tools: Vec<Tool>,
        features: Features,
        mcp_servers: Vec<String>,
    ) -> Self {
        Self {
            version: "1.0.0".to_string(),
            hatch3r_version: HATCH3R_VERSION.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            tools,
            features,
            mcp: McpConfig {
                servers: mcp_servers,
            },
            models: None,
            managed_files: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::manifest_path(root);
        if !path.exists() {
            return Err(HatchError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let manifest: HatchManifest = serde_json::from_str(&data)?;
        Ok(manifest)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::manifest_path(root);
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Record a generated path in the managed-file ledger. Set semantics
    /// over a list: duplicates are never inserted.
    pub fn add_managed_file(&mut self, path: &str) {
        if !self.managed_files.iter().any(|p| p == path) {
            self.managed_files.push(path.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest() -> HatchManifest {
        HatchManifest::new(
            "acme",
            "widgets",
            vec![Tool::Cursor, Tool::Claude],
            Features::default(),
            vec!["github".to_string()],
        )
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".agents")).unwrap();
        let m = manifest();
        m.save(dir.path()).unwrap();
        let loaded = HatchManifest::load(dir.path()).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = serde_json::to_string(&manifest()).unwrap();
        assert!(json.contains("\"hatch3rVersion\""));
        assert!(json.contains("\"managedFiles\""));
        assert!(json.contains("\"githubAgents\""));
        assert!(json.contains("\"tools\":[\"cursor\",\"claude\"]"));
    }

    #[test]
    fn load_missing_manifest_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = HatchManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, HatchError::NotInitialized));
    }

    #[test]
    fn load_malformed_manifest_is_json_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".agents")).unwrap();
        std::fs::write(dir.path().join(".agents/hatch.json"), "{ not json").unwrap();
        let err = HatchManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, HatchError::Json(_)));
    }

    #[test]
    fn managed_files_deduplicate_on_insert() {
        let mut m = manifest();
        m.add_managed_file("CLAUDE.md");
        m.add_managed_file(".cursor/rules/hatch3r-x.mdc");
        m.add_managed_file("CLAUDE.md");
        assert_eq!(
            m.managed_files,
            vec!["CLAUDE.md", ".cursor/rules/hatch3r-x.mdc"]
        );
    }

    #[test]
    fn default_features_enable_all_but_guardrails() {
        let f = Features::default();
        assert!(f.agents && f.skills && f.rules && f.prompts && f.commands);
        assert!(f.mcp && f.github_agents && f.hooks);
        assert!(!f.guardrails);
    }

    #[test]
    fn manifest_without_optional_fields_deserializes() {
        let json = r#"{
            "version": "1.0.0",
            "hatch3rVersion": "0.1.0",
            "tools": ["zed"],
            "features": {},
            "mcp": {},
            "managedFiles": []
        }"#;
        let m: HatchManifest = serde_json::from_str(json).unwrap();
        assert_eq!(m.tools, vec![Tool::Zed]);
        assert!(m.features.agents);
        assert!(m.models.is_none());
        assert!(m.mcp.servers.is_empty());
    }

    #[test]
    fn models_config_round_trip() {
        let json = r#"{
            "version": "1.0.0",
            "hatch3rVersion": "0.1.0",
            "tools": [],
            "managedFiles": [],
            "models": { "default": "opus", "agents": { "implementer": "codex" } }
        }"#;
        let m: HatchManifest = serde_json::from_str(json).unwrap();
        let models = m.models.unwrap();
        assert_eq!(models.default.as_deref(), Some("opus"));
        assert_eq!(models.agents.get("implementer").map(String::as_str), Some("codex"));
    }

    #[test]
    fn tool_from_str() {
        assert_eq!("cursor".parse::<Tool>().unwrap(), Tool::Cursor);
        assert_eq!("zed".parse::<Tool>().unwrap(), Tool::Zed);
        assert!("emacs".parse::<Tool>().is_err());
    }
}
