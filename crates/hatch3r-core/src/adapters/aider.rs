use super::{managed, output, project_root, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct AiderAdapter;

impl Adapter for AiderAdapter {
    fn name(&self) -> &'static str {
        "aider"
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
        results.push(managed(
            "CONVENTIONS.md",
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
                    format!(".aider/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        let config_yaml = "# Managed by hatch3r — do not edit manually\n\
                           read:\n\
                           \x20 - CONVENTIONS.md\n\
                           \x20 - .agents/AGENTS.md\n\
                           auto-lint: true\n";
        results.push(output(".aider.conf.yml", config_yaml));

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
    fn conventions_digest_and_config() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("rules/r.md"),
            "---\nid: r\nscope: always\ndescription: Rule desc\n---\nRule body",
        )
        .unwrap();

        let outputs = AiderAdapter
            .generate(&agents, &test_manifest(vec![Tool::Aider]))
            .unwrap();

        let conventions = outputs.iter().find(|o| o.path == "CONVENTIONS.md").unwrap();
        assert!(conventions.content.contains("Rule body"));
        assert!(conventions.managed_content.is_some());

        let config = outputs.iter().find(|o| o.path == ".aider.conf.yml").unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&config.content).unwrap();
        assert_eq!(parsed["read"][0], "CONVENTIONS.md");
        assert_eq!(parsed["auto-lint"], true);
    }
}
