use super::{
    managed, output, project_root, read_mcp_servers, Adapter, AdapterOutput,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::{resolve_agent_model, with_provider_prefix};
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct OpenCodeAdapter;

impl Adapter for OpenCodeAdapter {
    fn name(&self) -> &'static str {
        "opencode"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let mut instructions = vec![".agents/AGENTS.md".to_string()];
        if features.rules {
            instructions.push(".agents/rules/*.md".to_string());
        }
        if features.agents {
            instructions.push(".agents/agents/*.md".to_string());
        }
        if features.skills {
            instructions.push(".agents/skills/*/SKILL.md".to_string());
        }
        if features.commands {
            instructions.push(".agents/commands/*.md".to_string());
        }

        let mut config = serde_json::json!({
            "$schema": "https://opencode.ai/config-schema.json",
            "instructions": instructions,
        });

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let mut mcp = serde_json::Map::new();
                for (name, server) in servers {
                    if let Some(command) = &server.command {
                        let mut cmd = vec![command.clone()];
                        cmd.extend(server.args.iter().cloned());
                        let mut entry = serde_json::json!({
                            "type": "local",
                            "command": cmd,
                            "enabled": true,
                        });
                        if !server.env.is_empty() {
                            entry["environment"] = serde_json::to_value(&server.env)?;
                        }
                        mcp.insert(name, entry);
                    } else if let Some(url) = &server.url {
                        mcp.insert(
                            name,
                            serde_json::json!({
                                "type": "remote",
                                "url": url,
                                "enabled": true,
                            }),
                        );
                    }
                }
                if !mcp.is_empty() {
                    config["mcp"] = serde_json::Value::Object(mcp);
                }
            }
        }

        results.push(output(
            "opencode.json",
            serde_json::to_string_pretty(&config)?,
        ));

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                let desc = c.overrides.description.as_deref().unwrap_or(&agent.description);
                let mut lines = vec![format!("description: {desc}")];
                if let Some(m) = model {
                    lines.push(format!("model: {}", with_provider_prefix(&m)));
                }
                let fm = format!("---\n{}\n---", lines.join("\n"));
                results.push(managed(
                    format!(".opencode/agents/{}.md", to_prefixed_id(&agent.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&c.content)),
                    &c.content,
                ));
            }
        }

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".opencode/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.commands {
            for cmd in read_canonical_files(agents_dir, Category::Commands)? {
                let c = apply_customization_raw(root, &cmd);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".opencode/commands/{}.md", to_prefixed_id(&cmd.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        Ok(results)
    }
}
