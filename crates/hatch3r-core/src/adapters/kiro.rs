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

fn steering_frontmatter(globs: &str) -> String {
    format!("---\ninclusion: conditional\nglobs: \"{globs}\"\n---\n\n")
}

pub struct KiroAdapter;

impl Adapter for KiroAdapter {
    fn name(&self) -> &'static str {
        "kiro"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let mut steering = vec![
            String::new(),
            "# Hatch3r Agent Instructions".to_string(),
            String::new(),
            "Full canonical agent instructions are at `/.agents/AGENTS.md`.".to_string(),
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
                let scope = c.overrides.scope.clone().or(rule.scope.clone());
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);

                match scope.as_deref() {
                    Some(s) if s != "always" => {
                        // Scoped rules get their own conditional steering file.
                        let globs = if s.contains('*') {
                            s.to_string()
                        } else {
                            format!("{s}/**")
                        };
                        let body = format!("# {}\n\n{desc}\n\n{}", rule.id, c.content);
                        results.push(managed(
                            format!(".kiro/steering/{}.md", to_prefixed_id(&rule.id)),
                            format!("{}{}", steering_frontmatter(&globs), wrap_in_managed_block(&body)),
                            &body,
                        ));
                    }
                    _ => {
                        steering.push(format!("## {}", rule.id));
                        steering.push(String::new());
                        steering.push(desc.to_string());
                        steering.push(String::new());
                        steering.push(c.content);
                        steering.push(String::new());
                    }
                }
            }
        }

        if features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                steering.push(format!("## Agent: {}", agent.id));
                if let Some(m) = model {
                    steering.push(format!("**Recommended model:** `{m}`"));
                }
                steering.push(String::new());
                steering.push(
                    c.overrides
                        .description
                        .clone()
                        .unwrap_or_else(|| agent.description.clone()),
                );
                steering.push(String::new());
                steering.push(c.content);
                steering.push(String::new());
            }
        }

        let inner = steering.join("\n");
        results.push(managed(
            ".kiro/steering/hatch3r-agents.md",
            wrap_in_managed_block(&inner),
            &inner,
        ));

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".kiro/steering/{}.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                let mut kiro_mcp = serde_json::Map::new();
                for (name, server) in servers {
                    if let Some(command) = &server.command {
                        let mut entry = serde_json::json!({
                            "command": command,
                            "args": server.args,
                        });
                        if !server.env.is_empty() {
                            entry["env"] = serde_json::to_value(&server.env)?;
                        }
                        kiro_mcp.insert(name, entry);
                    } else if let Some(url) = &server.url {
                        kiro_mcp.insert(name, serde_json::json!({ "url": url }));
                    }
                }
                if !kiro_mcp.is_empty() {
                    let value = serde_json::json!({ "mcpServers": kiro_mcp });
                    results.push(output(
                        ".kiro/settings/mcp.json",
                        serde_json::to_string_pretty(&value)?,
                    ));
                }
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
    fn scoped_rules_get_conditional_steering_files() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("rules/api.md"),
            "---\nid: api\nscope: \"server\"\ndescription: API rule\n---\nbody",
        )
        .unwrap();
        std::fs::write(
            agents.join("rules/global.md"),
            "---\nid: global\nscope: always\ndescription: Global rule\n---\nglobal body",
        )
        .unwrap();

        let outputs = KiroAdapter
            .generate(&agents, &test_manifest(vec![Tool::Kiro]))
            .unwrap();

        let scoped = outputs
            .iter()
            .find(|o| o.path == ".kiro/steering/hatch3r-api.md")
            .unwrap();
        assert!(scoped.content.contains("inclusion: conditional"));
        assert!(scoped.content.contains("globs: \"server/**\""));

        let digest = outputs
            .iter()
            .find(|o| o.path == ".kiro/steering/hatch3r-agents.md")
            .unwrap();
        assert!(digest.content.contains("global body"));
        assert!(!digest.content.contains("API rule"));
    }
}
