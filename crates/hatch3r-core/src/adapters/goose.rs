use super::{managed, project_root, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct GooseAdapter;

impl Adapter for GooseAdapter {
    fn name(&self) -> &'static str {
        "goose"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
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

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                lines.push(format!("## Skill: {}", to_prefixed_id(&skill.id)));
                lines.push(String::new());
                lines.push(c.content);
                lines.push(String::new());
            }
        }

        let inner = lines.join("\n");
        Ok(vec![managed(
            ".goosehints",
            wrap_in_managed_block(&inner),
            &inner,
        )])
    }
}
