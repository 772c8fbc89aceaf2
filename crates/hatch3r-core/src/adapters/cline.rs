use super::{managed, output, project_root, read_mcp_servers, Adapter, AdapterOutput};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::hooks::read_hook_definitions;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct ClineAdapter;

impl Adapter for ClineAdapter {
    fn name(&self) -> &'static str {
        "cline"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        if features.agents {
            let mut custom_modes = Vec::new();
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                let model_guidance = match &model {
                    Some(m) => format!(
                        "\n\nRecommended model: {m}. Select this model in the Roo Code model dropdown when using this mode."
                    ),
                    None => String::new(),
                };
                custom_modes.push(serde_json::json!({
                    "slug": to_prefixed_id(&agent.id),
                    "name": agent.id,
                    "roleDefinition": format!("{}{model_guidance}", c.content),
                    "groups": ["read", "edit", "browser", "command", "mcp"],
                    "whenToUse": c.overrides.description.clone()
                        .unwrap_or_else(|| agent.description.clone()),
                }));
            }
            if !custom_modes.is_empty() {
                let modes = serde_json::json!({ "customModes": custom_modes });
                results.push(output(".roomodes", serde_json::to_string_pretty(&modes)?));
            }
        }

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".cline/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                let body = format!("# {}\n\n{desc}\n\n{}", rule.id, c.content);
                results.push(managed(
                    format!(".roo/rules/{}.md", to_prefixed_id(&rule.id)),
                    wrap_in_managed_block(&body),
                    &body,
                ));
            }
        }

        if features.hooks {
            for hook in read_hook_definitions(agents_dir)? {
                let globs = hook
                    .condition
                    .as_ref()
                    .map(|c| c.globs.clone())
                    .unwrap_or_default();
                let matching = if globs.is_empty() {
                    String::new()
                } else {
                    format!(" for files matching {}", globs.join(", "))
                };
                let body = format!(
                    "# Hook: {id}\n\n**Event:** {event}\n**Agent:** {agent}\n\n{desc}\n\nWhen this hook's event ({event}) is triggered{matching}, activate the {agent} agent.",
                    id = hook.id,
                    event = hook.event,
                    agent = hook.agent,
                    desc = hook.description,
                );
                results.push(managed(
                    format!(".roo/rules/{}.md", to_prefixed_id(&format!("hook-{}", hook.id))),
                    wrap_in_managed_block(&body),
                    &body,
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
                    format!(".clinerules/workflows/{}.md", to_prefixed_id(&cmd.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let mut roo_mcp = serde_json::Map::new();
                for (name, server) in servers {
                    if let Some(command) = &server.command {
                        let mut entry = serde_json::json!({
                            "command": command,
                            "args": server.args,
                        });
                        if !server.env.is_empty() {
                            entry["env"] = serde_json::to_value(&server.env)?;
                        }
                        roo_mcp.insert(name, entry);
                    } else if let Some(url) = &server.url {
                        roo_mcp.insert(
                            name,
                            serde_json::json!({
                                "url": url,
                                "transport": "streamable-http",
                            }),
                        );
                    }
                }
                if !roo_mcp.is_empty() {
                    let value = serde_json::json!({ "mcpServers": roo_mcp });
                    results.push(output(
                        ".roo/mcp.json",
                        serde_json::to_string_pretty(&value)?,
                    ));
                }
            }
        }

        Ok(results)
    }
}
