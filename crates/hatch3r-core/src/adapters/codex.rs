use super::{managed, output, project_root, read_mcp_servers, Adapter, AdapterOutput};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::path::Path;

pub struct CodexAdapter;

impl Adapter for CodexAdapter {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let root = project_root(agents_dir);

        let mut config: Vec<String> = vec![
            "# Codex project configuration (managed by hatch3r)".to_string(),
            "#".to_string(),
            "# Do not manually edit — run `hatch3r sync` to regenerate.".to_string(),
            String::new(),
            "model_instructions_file = \".agents/AGENTS.md\"".to_string(),
            String::new(),
        ];

        if manifest.features.rules {
            let mut enabled = Vec::new();
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c
                    .overrides
                    .description
                    .clone()
                    .unwrap_or_else(|| rule.description.clone());
                enabled.push((rule.id.clone(), desc));
            }
            if !enabled.is_empty() {
                config.push("# Additional instruction files (rules)".to_string());
                for (id, desc) in enabled {
                    config.push(format!("# rule: {id} — {desc}"));
                }
                config.push(String::new());
            }
        }

        if manifest.features.agents {
            for agent in read_canonical_files(agents_dir, Category::Agents)? {
                let c = apply_customization(root, &agent);
                if c.skip {
                    continue;
                }
                let model = resolve_agent_model(&agent.id, &agent, manifest, Some(&c.overrides));
                config.push(format!("[agents.{}]", to_prefixed_id(&agent.id)));
                config.push(format!(
                    "model_instructions_file = \".agents/agents/{}.md\"",
                    agent.id
                ));
                if let Some(m) = model {
                    config.push(format!("model = \"{m}\""));
                }
                config.push(String::new());
            }
        }

        if manifest.features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(servers) = read_mcp_servers(agents_dir) {
                for (name, server) in servers {
                    config.push(format!("[mcp_servers.{name}]"));
                    if let Some(command) = &server.command {
                        config.push(format!("command = \"{command}\""));
                        if !server.args.is_empty() {
                            let args: Vec<String> =
                                server.args.iter().map(|a| format!("\"{a}\"")).collect();
                            config.push(format!("args = [{}]", args.join(", ")));
                        }
                    } else if let Some(url) = &server.url {
                        config.push(format!("url = \"{url}\""));
                    }
                    for (k, v) in &server.env {
                        config.push(format!("env.{k} = \"{v}\""));
                    }
                    config.push(String::new());
                }
            }
        }

        results.push(output(".codex/config.toml", config.join("\n")));

        if manifest.features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".codex/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
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
    fn config_toml_carries_agent_tables() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("agents/implementer.md"),
            "---\nid: implementer\ndescription: Implements\nmodel: codex\n---\nbody",
        )
        .unwrap();

        let outputs = CodexAdapter
            .generate(&agents, &test_manifest(vec![Tool::Codex]))
            .unwrap();
        let config = outputs
            .iter()
            .find(|o| o.path == ".codex/config.toml")
            .unwrap();
        assert!(config.content.contains("[agents.hatch3r-implementer]"));
        assert!(config
            .content
            .contains("model_instructions_file = \".agents/agents/implementer.md\""));
        assert!(config.content.contains("model = \"gpt-5.3-codex\""));
    }

    #[test]
    fn mcp_servers_become_toml_tables() {
        let dir = TempDir::new().unwrap();
        let agents = setup_agents_dir(&dir);
        std::fs::write(
            agents.join("mcp/mcp.json"),
            r#"{"mcpServers":{"github":{"command":"npx","args":["-y","srv"],"env":{"TOKEN":"${T}"}}}}"#,
        )
        .unwrap();
        let mut manifest = test_manifest(vec![Tool::Codex]);
        manifest.mcp.servers = vec!["github".to_string()];

        let outputs = CodexAdapter.generate(&agents, &manifest).unwrap();
        let config = outputs
            .iter()
            .find(|o| o.path == ".codex/config.toml")
            .unwrap();
        assert!(config.content.contains("[mcp_servers.github]"));
        assert!(config.content.contains("command = \"npx\""));
        assert!(config.content.contains("args = [\"-y\", \"srv\"]"));
        assert!(config.content.contains("env.TOKEN = \"${T}\""));
    }
}
