use crate::detect::detect_existing_tools;
use crate::output;
use anyhow::Context;
use hatch3r_core::adapters::{adapter_for, agents_md_full, AGENTS_MD_INNER, CANONICAL_AGENTS_MD};
use hatch3r_core::io;
use hatch3r_core::manifest::{Features, HatchManifest, Tool};
use hatch3r_core::mcp_env::{default_server_config, ensure_env_mcp, source_env_mcp_command};
use hatch3r_core::paths;
use hatch3r_core::writer::{safe_write_file, WriteAction, WriteOptions};
use std::path::Path;

pub const CONTENT_DIRS: &[&str] = &[
    "rules",
    "agents",
    "skills",
    "commands",
    "prompts",
    "github-agents",
    "hooks",
    "mcp",
];

pub const DEFAULT_MCP_SERVERS: &[&str] =
    &["github", "context7", "filesystem", "playwright", "brave-search"];

pub fn run(root: &Path, tools_csv: Option<&str>, yes: bool) -> anyhow::Result<()> {
    output::banner();

    let tools = resolve_tools(root, tools_csv)?;

    if paths::manifest_path(root).exists() && !yes {
        output::warn("Existing .agents/ found. Re-run with --yes to overwrite managed files.");
        println!();
        std::process::exit(1);
    }

    let (owner, repo) = parse_git_remote(root);
    let features = Features::default();
    let mcp_servers: Vec<String> = if features.mcp {
        DEFAULT_MCP_SERVERS.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    let agents_dir = paths::agents_dir(root);
    let total = 4;

    println!("  {}", output::step(1, total, "Creating canonical files..."));
    for dir in CONTENT_DIRS {
        let p = agents_dir.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }
    write_seed_files(&agents_dir)?;
    write_mcp_config(&agents_dir, &mcp_servers)?;
    io::atomic_write(&agents_dir.join("AGENTS.md"), CANONICAL_AGENTS_MD.as_bytes())?;

    println!("  {}", output::step(2, total, "Writing manifest..."));
    let mut manifest = HatchManifest::new(owner.clone(), repo.clone(), tools, features, mcp_servers);
    manifest.save(root)?;

    println!("  {}", output::step(3, total, "Generating adapter output..."));
    let mut results: Vec<(String, WriteAction)> = Vec::new();

    // On init, preserve existing user content: prepend the managed block
    // when a file has no markers.
    let init_opts = |managed: Option<String>| WriteOptions {
        managed_content: managed,
        backup: false,
        append_if_no_block: true,
    };

    let agents_md = safe_write_file(
        &root.join("AGENTS.md"),
        &agents_md_full(),
        &init_opts(Some(AGENTS_MD_INNER.to_string())),
    )?;
    manifest.add_managed_file("AGENTS.md");
    results.push(("AGENTS.md".to_string(), agents_md.action));

    let selected = manifest.tools.clone();
    for tool in selected {
        let adapter = adapter_for(tool);
        let outputs = adapter
            .generate(&agents_dir, &manifest)
            .with_context(|| format!("failed to generate {} output", tool.display_name()))?;
        for out in outputs {
            let outcome = safe_write_file(
                &root.join(&out.path),
                &out.content,
                &init_opts(out.managed_content.clone()),
            )
            .with_context(|| format!("failed to write {}", out.path))?;
            manifest.add_managed_file(&out.path);
            results.push((out.path, outcome.action));
        }
    }

    println!("  {}", output::step(4, total, "Finalizing..."));
    manifest.save(root)?;

    let mut env_result = None;
    if manifest.features.mcp && !manifest.mcp.servers.is_empty() {
        let env = ensure_env_mcp(root, &manifest.mcp.servers)?;
        io::ensure_gitignore_entry(root, paths::ENV_MCP_FILE)?;
        if env.action != WriteAction::Skipped {
            results.push((env.path.clone(), env.action));
        }
        env_result = Some(env);
    }

    println!();
    output::print_results(&results);
    println!();

    let tool_names: Vec<&str> = manifest.tools.iter().map(|t| t.display_name()).collect();
    let mut summary = vec![
        output::label("Tools", &tool_names.join(", ")),
        output::label("Features", &enabled_features(&manifest.features).join(", ")),
    ];
    if !owner.is_empty() || !repo.is_empty() {
        summary.push(output::label("GitHub", &format!("{owner}/{repo}")));
    }
    if !manifest.mcp.servers.is_empty() {
        summary.push(output::label("MCP", &manifest.mcp.servers.join(", ")));
    }
    summary.push(String::new());
    summary.push(output::label("Canonical", &format!("{}/", paths::AGENTS_DIR)));
    summary.push(output::label(
        "Manifest",
        &format!("{}/{}", paths::AGENTS_DIR, paths::MANIFEST_FILE),
    ));
    output::print_box("Hatch complete", &summary);

    if let Some(env) = env_result {
        if !env.new_vars.is_empty() {
            output::warn(&format!(
                "Add your secrets to .env.mcp: {}",
                env.new_vars.join(", ")
            ));
            output::info(&format!(
                "Run this, then start or restart your editor: {}",
                source_env_mcp_command()
            ));
        }
    }

    Ok(())
}

fn resolve_tools(root: &Path, tools_csv: Option<&str>) -> anyhow::Result<Vec<Tool>> {
    match tools_csv {
        Some(csv) => {
            let mut tools = Vec::new();
            for raw in csv.split(',') {
                let name = raw.trim();
                if name.is_empty() {
                    continue;
                }
                let tool: Tool = name.parse().with_context(|| {
                    format!(
                        "valid tools are: {}",
                        Tool::all()
                            .iter()
                            .map(|t| t.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })?;
                if !tools.contains(&tool) {
                    tools.push(tool);
                }
            }
            if tools.is_empty() {
                anyhow::bail!("--tools was given but no valid tool names were parsed");
            }
            Ok(tools)
        }
        None => {
            let detected = detect_existing_tools(root);
            if detected.is_empty() {
                Ok(vec![Tool::Cursor])
            } else {
                output::info(&format!(
                    "Detected existing tool configs: {}",
                    detected
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                Ok(detected)
            }
        }
    }
}

fn enabled_features(features: &Features) -> Vec<&'static str> {
    let mut enabled = Vec::new();
    if features.agents {
        enabled.push("agents");
    }
    if features.skills {
        enabled.push("skills");
    }
    if features.rules {
        enabled.push("rules");
    }
    if features.prompts {
        enabled.push("prompts");
    }
    if features.commands {
        enabled.push("commands");
    }
    if features.mcp {
        enabled.push("mcp");
    }
    if features.guardrails {
        enabled.push("guardrails");
    }
    if features.github_agents {
        enabled.push("githubAgents");
    }
    if features.hooks {
        enabled.push("hooks");
    }
    enabled
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Best-effort owner/repo from `git remote get-url origin`. Any failure
/// yields empty strings — a repo without a remote is still initializable.
fn parse_git_remote(root: &Path) -> (String, String) {
    let out = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(root)
        .output();
    let Ok(out) = out else {
        return (String::new(), String::new());
    };
    if !out.status.success() {
        return (String::new(), String::new());
    }
    let url = String::from_utf8_lossy(&out.stdout).trim().to_string();
    let trimmed = url.strip_suffix(".git").unwrap_or(&url);
    let mut parts: Vec<&str> = trimmed.rsplit(|c| c == '/' || c == ':').collect();
    if parts.len() < 2 {
        return (String::new(), String::new());
    }
    let repo = sanitize(parts.remove(0));
    let owner = sanitize(parts.remove(0));
    (owner, repo)
}

// ---------------------------------------------------------------------------
// Canonical seed content
// ---------------------------------------------------------------------------

/// Write (or refresh) the hatch3r-managed canonical starter files. All seeds
/// carry the `hatch3r-` prefix, so overwriting is always safe. Called by
/// both `init` and `update`.
pub fn write_seed_files(agents_dir: &Path) -> anyhow::Result<Vec<String>> {
    let seeds: &[(&str, &str)] = &[
        ("rules/hatch3r-code-standards.md", SEED_RULE_CODE_STANDARDS),
        ("rules/hatch3r-testing.md", SEED_RULE_TESTING),
        ("agents/hatch3r-implementer.md", SEED_AGENT_IMPLEMENTER),
        ("agents/hatch3r-reviewer.md", SEED_AGENT_REVIEWER),
        (
            "skills/hatch3r-issue-workflow/SKILL.md",
            SEED_SKILL_ISSUE_WORKFLOW,
        ),
        ("commands/hatch3r-ship.md", SEED_COMMAND_SHIP),
        ("prompts/hatch3r-fix-bug.md", SEED_PROMPT_FIX_BUG),
        ("github-agents/hatch3r-triage.md", SEED_GITHUB_AGENT_TRIAGE),
        (
            "hooks/hatch3r-pre-commit-review.md",
            SEED_HOOK_PRE_COMMIT_REVIEW,
        ),
    ];

    let mut written = Vec::new();
    for (rel, content) in seeds {
        let path = agents_dir.join(rel);
        io::atomic_write(&path, content.as_bytes())
            .with_context(|| format!("failed to write {rel}"))?;
        written.push(rel.to_string());
    }
    Ok(written)
}

/// Write `.agents/mcp/mcp.json` containing the selected servers from the
/// static catalog.
pub fn write_mcp_config(agents_dir: &Path, servers: &[String]) -> anyhow::Result<()> {
    let mut entries = serde_json::Map::new();
    for id in servers {
        if let Some(config) = default_server_config(id) {
            entries.insert(id.clone(), config);
        }
    }
    let value = serde_json::json!({ "mcpServers": entries });
    let content = format!("{}\n", serde_json::to_string_pretty(&value)?);
    io::atomic_write(&paths::mcp_config_path(agents_dir), content.as_bytes())?;
    Ok(())
}

const SEED_RULE_CODE_STANDARDS: &str = r#"---
id: hatch3r-code-standards
type: rule
scope: always
description: Baseline engineering standards applied to every change
---
- Prefer small, reviewable changes over sweeping rewrites.
- Fix the root cause, not the symptom; read the surrounding code first.
- Match the existing style of the file you are editing.
- Never commit secrets, tokens, or credentials.
- Leave the build green: run the project's lint and test commands before
  declaring work done.
"#;

const SEED_RULE_TESTING: &str = r#"---
id: hatch3r-testing
type: rule
scope: "tests/**"
description: Conventions for writing and changing tests
---
- Tests describe behavior, not implementation detail.
- A failing test gets a deliberate decision: fix, rewrite, or remove — never
  a blind retry.
- New behavior ships with a test that fails without the change.
"#;

const SEED_AGENT_IMPLEMENTER: &str = r#"---
id: hatch3r-implementer
type: agent
description: Implements a scoped task end to end, from reading context to passing tests
model: sonnet
---
You are the implementer. Take one issue or task, read the relevant code and
rules, implement the change, and verify it with the project's test suite.
Stay inside the task's file boundaries. Report what changed and why.
"#;

const SEED_AGENT_REVIEWER: &str = r#"---
id: hatch3r-reviewer
type: agent
description: Reviews diffs for correctness, regressions, and rule violations
model: opus
---
You are the reviewer. Read the diff against the project rules and the
surrounding code. Flag correctness issues, missing tests, and style
violations with file and line references. Approve only when you would merge
it yourself.
"#;

const SEED_SKILL_ISSUE_WORKFLOW: &str = r#"---
name: hatch3r-issue-workflow
description: Take a GitHub issue from triage to merged PR
---
# Issue Workflow

1. Read the issue and its linked context; restate the acceptance criteria.
2. Create a branch named after the issue.
3. Implement with the smallest change that satisfies the criteria.
4. Run the full test suite and lint.
5. Open a PR that links the issue and summarizes the approach.
"#;

const SEED_COMMAND_SHIP: &str = r#"---
id: hatch3r-ship
type: command
description: Run checks, commit, and open a pull request for the current change
---
# ship

1. Run the project's lint and test commands; stop on failure.
2. Stage and commit the work with a message describing what changed.
3. Push the branch and open a pull request.
"#;

const SEED_PROMPT_FIX_BUG: &str = r#"---
id: hatch3r-fix-bug
type: prompt
description: Structured prompt for diagnosing and fixing a reported bug
---
Reproduce the bug first. Trace the failure to its root cause and describe it
in one sentence before changing any code. Fix the cause, add a regression
test, and verify the original report no longer reproduces.
"#;

const SEED_GITHUB_AGENT_TRIAGE: &str = r#"---
id: hatch3r-triage
type: github-agent
description: Labels and prioritizes incoming issues
---
Read each new issue, apply the matching `type:` label, and flag anything
missing reproduction steps with a comment requesting them.
"#;

const SEED_HOOK_PRE_COMMIT_REVIEW: &str = r#"---
id: pre-commit-review
event: pre-commit
agent: reviewer
description: Review the staged diff before every commit
globs: "src/**"
---
Activate the reviewer agent on the staged diff before the commit is created.
"#;
