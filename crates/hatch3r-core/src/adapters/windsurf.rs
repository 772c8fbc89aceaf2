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

fn is_glob_pattern(scope: &str) -> bool {
    scope.contains('*') || scope.contains('?') || scope.contains('[')
}

fn rule_trigger(scope: Option<&str>) -> &'static str {
    match scope {
        None => "model_decision",
        Some("always") => "always_on",
        Some(_) => "glob_pattern",
    }
}

pub struct WindsurfAdapter;

impl Adapter for WindsurfAdapter {
    fn name(&self) -> &'static str {
        "windsurf"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let mut lines = vec![
            String::new(),
            "# Hatch3r Agent Instructions".to_string(),
            String::new(),
            "Full canonical agent instructions are at `/.agents/AGENTS.md`.".to_string(),
            "Rules and skills are managed in `.windsurf/rules/` and `.windsurf/skills/`.".to_string(),
            String::new(),
            BRIDGE_ORCHESTRATION.to_string(),
            String::new(),
        ];

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                lines.push(format!("## Agent: {}", agent.id));
                if let Some(m) = model {
                    lines.push(format!("**Recommended model:** `{m}`"));
                }
                lines.push(String::new());
                lines.push(
                    c.overrides
                        .description
                        .clone()
                        .unwrap_or_else(|| agent.description.clone()),
                );
                lines.push(String::new());
                lines.push(c.content);
                lines.push(String::new());
            }
        }

        let inner = lines.join("\n");
        results.push(managed(".windsurfrules", wrap_in_managed_block(&inner), &inner));

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let scope = c.overrides.scope.clone().or(rule.scope.clone());
                let trigger = rule_trigger(scope.as_deref());
                let glob_scope = match (trigger, scope.as_deref()) {
                    ("glob_pattern", Some(s)) => Some(if is_glob_pattern(s) {
                        s.to_string()
                    } else {
                        format!("{s}/**")
                    }),
                    _ => None,
                };
                let fm = match &glob_scope {
                    Some(globs) => format!("<!-- trigger: {trigger}, globs: {globs} -->"),
                    None => format!("<!-- trigger: {trigger} -->"),
                };
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                let body = format!("# {}\n\n{desc}\n\n{}", rule.id, c.content);
                results.push(managed(
                    format!(".windsurf/rules/{}.md", to_prefixed_id(&rule.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&body)),
                    &body,
                ));
            }
        }

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization(root, &skill);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&skill.description);
                let fm = format!("---\nname: {}\ndescription: {desc}\n---", skill.id);
                results.push(managed(
                    format!(".windsurf/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&c.content)),
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
                    format!(".windsurf/workflows/{}.md", to_prefixed_id(&cmd.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let value = serde_json::json!({ "mcpServers": servers });
                results.push(output(
                    ".windsurf/mcp.json",
                    format!("{}\n", serde_json::to_string_pretty(&value)?),
                ));
            }
        }

        Ok(results)
    }
}
