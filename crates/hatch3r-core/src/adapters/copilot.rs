use super::{
    managed, output, project_root, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::{self, to_prefixed_id};
use std::path::Path;
use tracing::warn;

fn detect_install_command(project_root: &Path) -> (&'static str, &'static str) {
    if project_root.join("bun.lockb").exists() {
        ("bun install", "bun run build")
    } else if project_root.join("pnpm-lock.yaml").exists() {
        ("pnpm install --frozen-lockfile", "pnpm run build")
    } else if project_root.join("yarn.lock").exists() {
        ("yarn install --frozen-lockfile", "yarn build")
    } else {
        ("npm ci", "npm run build")
    }
}

pub struct CopilotAdapter;

impl Adapter for CopilotAdapter {
    fn name(&self) -> &'static str {
        "copilot"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        // Always-scope rules are inlined into the shared instructions file;
        // glob-scoped rules become per-path instruction files.
        let mut always_sections: Vec<String> = Vec::new();
        let mut scoped: Vec<(String, String, String, String)> = Vec::new();

        if features.rules {
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
                let scope = c.overrides.scope.clone().or(rule.scope.clone());
                match scope.as_deref() {
                    Some(s) if s != "always" => {
                        scoped.push((rule.id.clone(), desc, c.content, s.to_string()))
                    }
                    _ => always_sections.push(format!(
                        "### {}\n\n{desc}\n\n{}",
                        rule.id, c.content
                    )),
                }
            }
        }

        let inner = format!(
            "\n# Hatch3r Project Instructions\n\n\
             Full canonical agent instructions are at `/.agents/AGENTS.md`.\n\n\
             {BRIDGE_ORCHESTRATION}\n\n\
             ## Hatch3r Rules\n\n{}\n",
            always_sections.join("\n")
        );
        results.push(managed(
            ".github/copilot-instructions.md",
            wrap_in_managed_block(&inner),
            &inner,
        ));

        let (install, build) = detect_install_command(root);
        let setup_steps = format!(
            "name: \"Copilot Setup Steps\"\n\
             on: [push]\n\
             jobs:\n\
             \x20 setup:\n\
             \x20   runs-on: ubuntu-latest\n\
             \x20   steps:\n\
             \x20     - uses: actions/checkout@v4\n\
             \x20     - name: Install dependencies\n\
             \x20       run: {install}\n\
             \x20     - name: Build\n\
             \x20       run: {build}\n"
        );
        results.push(output(".github/workflows/copilot-setup-steps.yml", setup_steps));

        for (id, desc, content, scope) in scoped {
            let globs: Vec<&str> = scope.split(',').map(|g| g.trim()).collect();
            let fm = format!("---\napplyTo: \"{}\"\n---", globs.join(", "));
            let body = format!("# {id}\n\n{desc}\n\n{content}");
            results.push(managed(
                format!(
                    ".github/instructions/{}.instructions.md",
                    to_prefixed_id(&id)
                ),
                format!("{fm}\n\n{}", wrap_in_managed_block(&body)),
                &body,
            ));
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
                results.push(managed(
                    format!(".github/agents/{}.md", to_prefixed_id(&agent.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&c.content)),
                    &c.content,
                ));
            }
        }

        if features.prompts {
            for prompt in read_canonical_files(agents_dir, Category::Prompts)? {
                let body = &prompt.raw_content;
                results.push(managed(
                    format!(".github/prompts/{}.prompt.md", to_prefixed_id(&prompt.id)),
                    wrap_in_managed_block(body),
                    body,
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
                    format!(
                        ".github/copilot/commands/{}.prompt.md",
                        to_prefixed_id(&cmd.id)
                    ),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.github_agents {
            for agent in read_canonical_files(agents_dir, Category::GithubAgents)? {
                let body = &agent.raw_content;
                results.push(managed(
                    format!(".github/copilot/agents/{}.md", to_prefixed_id(&agent.id)),
                    wrap_in_managed_block(body),
                    body,
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
                    format!(".github/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&c.content)),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            // VS Code loads secrets from an env file; point every local
            // server at the gitignored .env.mcp.
            let path = paths::mcp_config_path(agents_dir);
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| e.to_string())
                }) {
                Ok(mut parsed) => {
                    if let Some(servers) =
                        parsed.get_mut("mcpServers").and_then(|v| v.as_object_mut())
                    {
                        for server in servers.values_mut() {
                            if server.get("command").is_some() {
                                server["envFile"] =
                                    serde_json::json!("${workspaceFolder}/.env.mcp");
                            }
                        }
                    }
                    results.push(output(
                        ".vscode/mcp.json",
                        format!("{}\n", serde_json::to_string_pretty(&parsed)?),
                    ));
                }
                Err(e) => warn!("could not read MCP config: {e}"),
            }
        }

        Ok(results)
    }
}
