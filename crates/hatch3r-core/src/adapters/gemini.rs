use super::{
    managed, output, project_root, read_mcp_servers, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::hooks::{read_hook_definitions, HookEvent};
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::collections::BTreeMap;
use std::path::Path;

fn escape_toml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn gemini_event(event: HookEvent) -> &'static str {
    match event {
        HookEvent::PreCommit => "BeforeTool",
        HookEvent::PostMerge => "AfterTool",
        HookEvent::CiFailure => "AfterAgent",
        HookEvent::FileSave => "AfterTool",
        HookEvent::SessionStart => "SessionStart",
        HookEvent::PrePush => "BeforeTool",
    }
}

pub struct GeminiAdapter;

impl Adapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let mut lines = vec![
            String::new(),
            "# Hatch3r Agent Instructions".to_string(),
            String::new(),
            "Full canonical agent instructions are at `.agents/AGENTS.md`.".to_string(),
            String::new(),
            BRIDGE_ORCHESTRATION.to_string(),
            String::new(),
        ];

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                lines.push(format!("## {}", rule.id));
                lines.push(String::new());
                lines.push(desc.to_string());
                lines.push(String::new());
                lines.push(c.content);
                lines.push(String::new());
            }
        }

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                lines.push(format!("## Agent: {}", agent.id));
                lines.push(String::new());
                lines.push(
                    c.overrides
                        .description
                        .clone()
                        .unwrap_or_else(|| agent.description.clone()),
                );
                lines.push(String::new());
                lines.push(c.content);
                if let Some(m) = model {
                    lines.push(String::new());
                    lines.push(format!(
                        "**Recommended model:** `{m}`. Set via `gemini --model {m}` or select in Google AI Studio."
                    ));
                }
                lines.push(String::new());
            }
        }

        let inner = lines.join("\n");
        results.push(managed("GEMINI.md", wrap_in_managed_block(&inner), &inner));

        let mut settings = serde_json::json!({
            "context": { "fileName": ["GEMINI.md", "AGENTS.md"] }
        });

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let mut gemini_mcp = serde_json::Map::new();
                for (name, server) in servers {
                    if let Some(command) = &server.command {
                        let mut entry = serde_json::json!({
                            "command": command,
                            "args": server.args,
                        });
                        if !server.env.is_empty() {
                            entry["env"] = serde_json::to_value(&server.env)?;
                        }
                        gemini_mcp.insert(name, entry);
                    } else if let Some(url) = &server.url {
                        gemini_mcp.insert(name, serde_json::json!({ "url": url }));
                    }
                }
                if !gemini_mcp.is_empty() {
                    settings["mcpServers"] = serde_json::Value::Object(gemini_mcp);
                }
            }
        }

        if features.hooks {
            let hooks = read_hook_definitions(agents_dir)?;
            if !hooks.is_empty() {
                let mut hooks_obj: BTreeMap<String, Vec<serde_json::Value>> = BTreeMap::new();
                for hook in &hooks {
                    let matcher = hook
                        .condition
                        .as_ref()
                        .filter(|c| !c.globs.is_empty())
                        .map(|c| c.globs.join("|"))
                        .unwrap_or_else(|| ".*".to_string());
                    hooks_obj
                        .entry(gemini_event(hook.event).to_string())
                        .or_default()
                        .push(serde_json::json!({
                            "matcher": matcher,
                            "hooks": [{
                                "type": "command",
                                "command": format!(
                                    "echo \"hatch3r hook: {} — activate {} agent\"",
                                    hook.id, hook.agent
                                )
                            }]
                        }));
                }
                settings["hooks"] = serde_json::to_value(&hooks_obj)?;
            }
        }

        results.push(output(
            ".gemini/settings.json",
            serde_json::to_string_pretty(&settings)?,
        ));

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".gemini/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.commands {
            for cmd in read_canonical_files(agents_dir, Category::Commands)? {
                let c = apply_customization(root, &cmd);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&cmd.description);
                let toml = format!(
                    "description = \"{}\"\nprompt = \"{}\"",
                    escape_toml_string(desc),
                    escape_toml_string(&c.content)
                );
                results.push(output(
                    format!(".gemini/commands/{}.toml", to_prefixed_id(&cmd.id)),
                    toml,
                ));
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::tests::{setup_agents_dir, test_manifest};
    use crate::manifest::Tool;
    use tempfile::TempDir;

    #[test]
    fn command_toml_escapes_newlines_and_quotes() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("commands/ship.md"),
            "---\nid: ship\ndescription: Ship \"it\"\n---\nline one\nline two",
        )
        .unwrap();

        let outputs = GeminiAdapter
            .generate(&agents, &test_manifest(vec![Tool::Gemini]))
            .unwrap();
        let toml = outputs
            .iter()
            .find(|o| o.path == ".gemini/commands/hatch3r-ship.toml")
            .unwrap();
        assert!(toml.content.contains(r#"description = "Ship \"it\"""#));
        assert!(toml.content.contains(r"line one\nline two"));
        assert!(!toml.content.contains("line one\nline two"));
    }

    #[test]
    fn hook_matcher_joins_globs() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("hooks/on-save.md"),
            "---\nid: on-save\nevent: file-save\nagent: fmt\nglobs: \"a/**, b/**\"\n---\n",
        )
        .unwrap();

        let outputs = GeminiAdapter
            .generate(&agents, &test_manifest(vec![Tool::Gemini]))
            .unwrap();
        let settings = outputs
            .iter()
            .find(|o| o.path == ".gemini/settings.json")
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&settings.content).unwrap();
        assert_eq!(parsed["hooks"]["AfterTool"][0]["matcher"], "a/**|b/**");
    }

    #[test]
    fn settings_reference_context_files() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        let outputs = GeminiAdapter
            .generate(&agents, &test_manifest(vec![Tool::Gemini]))
            .unwrap();
        let settings = outputs
            .iter()
            .find(|o| o.path == ".gemini/settings.json")
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&settings.content).unwrap();
        assert_eq!(parsed["context"]["fileName"][0], "GEMINI.md");
    }
}
