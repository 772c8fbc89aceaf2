use super::{
    managed, output, project_root, read_mcp_raw, Adapter, AdapterOutput, BRIDGE_ORCHESTRATION,
};
use crate::canonical::{read_canonical_files, Category};
use crate::customize::{apply_customization, apply_customization_raw};
use crate::error::Result;
use crate::hooks::{read_hook_definitions, HookEvent};
use crate::managed::wrap_in_managed_block;
use crate::manifest::HatchManifest;
use crate::models::resolve_agent_model;
use crate::paths::to_prefixed_id;
use std::collections::BTreeMap;
use std::path::Path;

fn claude_event(event: HookEvent) -> &'static str {
    match event {
        HookEvent::PreCommit => "PreToolUse",
        HookEvent::PostMerge => "PostToolUse",
        HookEvent::CiFailure => "SubagentStart",
        HookEvent::FileSave => "PostToolUse",
        HookEvent::SessionStart => "SessionStart",
        HookEvent::PrePush => "PreToolUse",
    }
}

fn claude_tool_matcher(event: HookEvent) -> &'static str {
    match event {
        HookEvent::PreCommit => "Bash",
        HookEvent::PostMerge => "Bash",
        HookEvent::FileSave => "Write",
        HookEvent::SessionStart => ".*",
        HookEvent::PrePush => "Bash",
        HookEvent::CiFailure => "Bash",
    }
}

pub struct ClaudeAdapter;

impl Adapter for ClaudeAdapter {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn generate(&self, agents_dir: &Path, manifest: &HatchManifest) -> Result<Vec<AdapterOutput>> {
        let mut results = Vec::new();
        let features = &manifest.features;
        let root = project_root(agents_dir);

        let inner = format!(
            "\n# Hatch3r Project Instructions\n\n\
             Full canonical agent instructions are at `.agents/AGENTS.md`.\n\
             Rules are managed in `.claude/rules/` and agents in `.claude/agents/`.\n\n\
             {BRIDGE_ORCHESTRATION}\n\n\
             ## Personal Settings\n\n\
             Create `CLAUDE.local.md` for personal settings (not committed to git).\n\
             Claude Code reads this file for user-specific preferences.\n"
        );
        results.push(managed("CLAUDE.md", wrap_in_managed_block(&inner), &inner));

        if features.rules {
            for rule in read_canonical_files(agents_dir, Category::Rules)? {
                let c = apply_customization(root, &rule);
                if c.skip {
                    continue;
                }
                let desc = c.overrides.description.as_deref().unwrap_or(&rule.description);
                let body = format!("# {}\n\n{desc}\n\n{}", rule.id, c.content);
                results.push(managed(
                    format!(".claude/rules/{}.md", to_prefixed_id(&rule.id)),
                    wrap_in_managed_block(&body),
                    &body,
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
                let model_guidance = match &model {
                    Some(m) => format!(
                        "\n\n## Recommended Model\n\nPreferred: `{m}`. Set via `/model {m}` or env `CLAUDE_CODE_SUBAGENT_MODEL={m}`."
                    ),
                    None => String::new(),
                };
                let desc = c.overrides.description.as_deref().unwrap_or(&agent.description);
                let fm = format!("---\ndescription: {desc}\n---");
                let body = format!("{}{model_guidance}", c.content);
                results.push(managed(
                    format!(".claude/agents/{}.md", to_prefixed_id(&agent.id)),
                    format!("{fm}\n\n{}", wrap_in_managed_block(&body)),
                    &body,
                ));
            }
        }

        let mut settings = serde_json::json!({
            "permissions": {
                "allow": [
                    "Read", "Edit", "MultiEdit", "Write",
                    "Grep", "Glob", "LS", "TodoRead", "TodoWrite"
                ],
                "deny": []
            },
            "teammateMode": "tool-using"
        });

        if features.hooks {
            let hooks = read_hook_definitions(agents_dir)?;
            if !hooks.is_empty() {
                let mut hooks_config: BTreeMap<String, Vec<serde_json::Value>> = BTreeMap::new();
                for hook in &hooks {
                    hooks_config
                        .entry(claude_event(hook.event).to_string())
                        .or_default()
                        .push(serde_json::json!({
                            "matcher": claude_tool_matcher(hook.event),
                            "hooks": [{
                                "type": "command",
                                "command": format!(
                                    "echo \"hatch3r hook: {} — activate {} agent\"",
                                    hook.id, hook.agent
                                )
                            }]
                        }));
                }
                settings["hooks"] = serde_json::to_value(&hooks_config)?;
            }
        }

        results.push(output(
            ".claude/settings.json",
            serde_json::to_string_pretty(&settings)?,
        ));

        if features.skills {
            for skill in read_canonical_files(agents_dir, Category::Skills)? {
                let c = apply_customization_raw(root, &skill);
                if c.skip {
                    continue;
                }
                results.push(managed(
                    format!(".claude/skills/{}/SKILL.md", to_prefixed_id(&skill.id)),
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
                    format!(".claude/commands/{}.md", to_prefixed_id(&cmd.id)),
                    wrap_in_managed_block(&c.content),
                    &c.content,
                ));
            }
        }

        if features.mcp && !manifest.mcp.servers.is_empty() {
            if let Some(raw) = read_mcp_raw(agents_dir) {
                results.push(output(".mcp.json", raw));
            }
        }

        Ok(results)
    }
}
