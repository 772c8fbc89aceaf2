use super::{
    managed, output, project_root, read_mcp_servers, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct AmpAdapter;

impl Adapter for AmpAdapter {
    fn name(&self) -> &'static str {
        "amp"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let mut bridge_lines: Vec<String> = Vec::new();

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                bridge_lines.push(format!("## {}", rule.id));
                bridge_lines.push(String::new());
                bridge_lines.push(desc.to_string());
                bridge_lines.push(String::new());
                bridge_lines.push(c.content);
                bridge_lines.push(String::new());
            }
        }

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                bridge_lines.push(format!("## Agent: {}", agent.id));
                if let Some(m) = model {
                    bridge_lines.push(format!(
                        "**Recommended model:** `{m}`. Use Smart mode for Opus, Rush for Haiku, Deep for Codex."
                    ));
                }
                bridge_lines.push(String::new());
                bridge_lines.push(
                    c.overrides
                        .description
                        .clone()
                        .unwrap_or_else(|| agent.description.clone()),
                );
                bridge_lines.push(String::new());
                bridge_lines.push(c.content);
                bridge_lines.push(String::new());
            }
        }

        let inner = format!(
            "\n# Hatch3r Agent Instructions\n\n\
             Full canonical agent instructions are at `/.agents/AGENTS.md`.\n\n\
             {BRIDGE_ORCHESTRATION}\n\n{}",
            bridge_lines.join("\n")
        );
        results.push(managed(".amp/AGENTS.md", wrap_in_managed_block(&inner), &inner));

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".amp/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let mut amp_mcp = serde_json::Map::new();
                for (name, server) in servers {
                    if let Some(command) = &server.command {
                        let mut entry = serde_json::json!({
                            "command": command,
                            "args": server.args,
                        });
                        if !server.env.is_empty() {
                            entry["env"] = serde_json::to_value(&server.env)?;
                        }
                        amp_mcp.insert(name, entry);
                    } else if let Some(url) = &server.url {
                        amp_mcp.insert(name, serde_json::json!({ "url": url }));
                    }
                }
                if !amp_mcp.is_empty() {
                    let settings = serde_json::json!({ "amp.mcpServers": amp_mcp });
                    results.push(output(
                        ".amp/settings.json",
                        serde_json::to_string_pretty(&settings)?,
                    ));
                }
            }
        }

        Ok(results)
    }
}
