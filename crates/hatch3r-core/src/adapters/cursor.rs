use super::{
    managed, output, project_root, read_mcp_raw, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::hooks::read_hook_definitions;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

/// Cursor `.mdc` rule frontmatter: `always` maps to `alwaysApply`, a glob
/// (or comma list of globs) maps to `globs`, absence means model decides.
fn rule_frontmatter(description: &str, scope: Option<&str>) -> String {
    let mut lines = vec![format!("description: {description}")];
    match scope {
        Some("always") => lines.push("alwaysApply: true".to_string()),
        Some(scope) => {
            let globs: Vec<String> = scope
                .split(',')
                .map(|g| format!("\"{}\"", g.trim()))
                .collect();
            lines.push(format!("globs: [{}]", globs.join(", ")));
        }
        None => lines.push("alwaysApply: false".to_string()),
    }
    format!("---\n{}\n---", lines.join("\n"))
}

fn mdc(path: String, frontmatter: &str, body: &str) -> AdapterOutput {
    managed(
        path,
        format!("{frontmatter}\n\n{}", wrap_in_managed_block(body)),
        body,
    )
}

pub struct CursorAdapter;

impl Adapter for CursorAdapter {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                let scope = c.overrides.scope.as_deref().or(rule.scope.as_deref());
                results.push(mdc(
                    format!(".cursor/rules/{}.mdc", to_prefixed_id(&rule.id)),
                    &rule_frontmatter(desc, scope),
                    &c.content,
                ));
            }
        }

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                let desc = c.overrides.description.as_deref().unwrap_or(&agent.description);
                let mut lines = vec![
                    format!("name: {}", agent.id),
                    format!("description: {desc}"),
                ];
                if let Some(m) = model {
                    lines.push(format!("model: {m}"));
                }
                let fm = format!("---\n{}\n---", lines.join("\n"));
                results.push(mdc(
                    format!(".cursor/agents/{}.md", to_prefixed_id(&agent.id)),
                    &fm,
                    &c.content,
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
                results.push(mdc(
                    format!(".cursor/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    &fm,
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
                    format!(".cursor/commands/{}.md", to_prefixed_id(&cmd.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(raw) = read_mcp_raw(agents_dir) {
                results.push(output(".cursor/mcp.json", raw));
            }
        }

        if features.hooks {
            for hook in read_hook_definitions(agents_dir)? {
                let globs = hook
                    .condition
                    .as_ref()
                    .map(|c| c.globs.clone())
                    .unwrap_or_default();
                let glob_line = if globs.is_empty() {
                    "alwaysApply: false".to_string()
                } else {
                    let quoted: Vec<String> = globs.iter().map(|g| format!("\"{g}\"")).collect();
                    format!("globs: [{}]", quoted.join(", "))
                };
                let fm = format!("---\ndescription: \"Hook: {}\"\n{glob_line}\n---", hook.description);
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
                results.push(mdc(
                    format!(".cursor/rules/{}.mdc", to_prefixed_id(&format!("hook-{}", hook.id))),
                    &fm,
                    &body,
                ));
            }
        }

        let bridge_fm = "---\ndescription: Bridge to canonical agent instructions and mandatory orchestration directives\nalwaysApply: true\n---";
        let bridge_body = format!(
            "# Hatch3r Bridge\n\nThis project uses hatch3r for agentic coding setup.\nCanonical agent instructions live at `/.agents/AGENTS.md`.\n\n{BRIDGE_ORCHESTRATION}"
        );
        results.push(mdc(
            ".cursor/rules/hatch3r-bridge.mdc".to_string(),
            bridge_fm,
            &bridge_body,
        ));

        let env_config = serde_json::json!({
            "instructions": ["Read /.agents/AGENTS.md for project instructions"],
            "mcpServers": {}
        });
        results.push(output(
            ".cursor/environment.json",
            format!("{}\n", serde_json::to_string_pretty(&env_config)?),
        ));

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
    fn always_rule_gets_always_apply() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("rules/test-rule.md"),
            "---\nid: test-rule\nscope: always\ndescription: A test rule\n---\nThis is a test rule.",
        )
        .unwrap();

        let outputs = CursorAdapter
            .generate(&agents, &test_manifest(vec![Tool::Cursor]))
            .unwrap();
        let rule = outputs
            .iter()
            .find(|o| o.path == ".cursor/rules/hatch3r-test-rule.mdc")
            .unwrap();
        assert!(rule.content.contains("alwaysApply: true"));
        assert!(rule.content.contains("description: A test rule"));
        assert!(!rule.content.contains("globs:"));
    }

    #[test]
    fn comma_scope_becomes_glob_list() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("rules/scoped.md"),
            "---\nid: scoped\nscope: \"src/**,tests/**\"\ndescription: Scoped\n---\nbody",
        )
        .unwrap();

        let outputs = CursorAdapter
            .generate(&agents, &test_manifest(vec![Tool::Cursor]))
            .unwrap();
        let rule = outputs
            .iter()
            .find(|o| o.path == ".cursor/rules/hatch3r-scoped.mdc")
            .unwrap();
        assert!(rule.content.contains("globs: [\"src/**\", \"tests/**\"]"));
    }

    #[test]
    fn customize_scope_overrides_frontmatter() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("rules/r.md"),
            "---\nid: r\nscope: always\ndescription: D\n---\nbody",
        )
        .unwrap();
        let custom = dir.path().join(".hatch3r/rules");
        std::fs::create_dir_all(&custom).unwrap();
        std::fs::write(custom.join("r.customize.yaml"), "scope: \"docs/**\"\n").unwrap();

        let outputs = CursorAdapter
            .generate(&agents, &test_manifest(vec![Tool::Cursor]))
            .unwrap();
        let rule = outputs
            .iter()
            .find(|o| o.path == ".cursor/rules/hatch3r-r.mdc")
            .unwrap();
        assert!(rule.content.contains("globs: [\"docs/**\"]"));
        assert!(!rule.content.contains("alwaysApply: true"));
    }

    #[test]
    fn bridge_rule_always_present() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        let outputs = CursorAdapter
            .generate(&agents, &test_manifest(vec![Tool::Cursor]))
            .unwrap();
        assert!(outputs
            .iter()
            .any(|o| o.path == ".cursor/rules/hatch3r-bridge.mdc"));
    }
}
