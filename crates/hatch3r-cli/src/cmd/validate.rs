use crate::output;
use hatch3r_core::manifest::HatchManifest;
use hatch3r_core::paths::{self, to_prefixed_id, HATCH3R_PREFIX};
use hatch3r_core::HatchError;
use std::collections::HashSet;
use std::path::Path;

#[derive(Default)]
struct Validation {
    errors: Vec<String>,
    warnings: Vec<String>,
}

const REQUIRED_DIRS: &[&str] = &["agents", "skills", "rules"];
const OPTIONAL_DIRS: &[&str] = &["commands", "prompts", "mcp", "github-agents", "hooks"];

/// Generated files that legitimately live outside the `hatch3r-` prefix
/// convention because the host tool dictates their name.
const SHARED_FILES: &[&str] = &[
    "AGENTS.md",
    "CLAUDE.md",
    "GEMINI.md",
    "CONVENTIONS.md",
    "SKILL.md",
    "copilot-instructions.md",
    "copilot-setup-steps.yml",
    "opencode.json",
    "settings.json",
    "environment.json",
    "mcp.json",
    "config.toml",
];

pub fn run(root: &Path) -> anyhow::Result<()> {
    output::banner();

    let agents_dir = paths::agents_dir(root);
    let mut v = Validation::default();

    if !agents_dir.exists() {
        output::error(".agents/ directory not found. Run `hatch3r init` first.");
        println!();
        std::process::exit(1);
    }

    let manifest = match HatchManifest::load(root) {
        Ok(m) => Some(m),
        Err(HatchError::NotInitialized) => {
            v.errors.push("Missing .agents/hatch.json manifest".to_string());
            None
        }
        Err(e) => {
            v.errors.push(format!("Malformed .agents/hatch.json: {e}"));
            None
        }
    };

    if let Some(m) = &manifest {
        if m.version.is_empty() {
            v.errors.push("hatch.json: missing 'version' field".to_string());
        }
        if m.tools.is_empty() {
            v.warnings.push("hatch.json: no tools configured".to_string());
        }
        for managed in &m.managed_files {
            if !root.join(managed).exists() {
                v.warnings
                    .push(format!("Managed file missing from disk: {managed}"));
            }
        }
    }

    for dir in REQUIRED_DIRS {
        if !agents_dir.join(dir).exists() {
            v.errors.push(format!("Required directory missing: .agents/{dir}/"));
        }
    }
    for dir in OPTIONAL_DIRS {
        if !agents_dir.join(dir).exists() {
            v.warnings.push(format!("Optional directory missing: .agents/{dir}/"));
        }
    }

    for dir in REQUIRED_DIRS.iter().chain(OPTIONAL_DIRS) {
        check_frontmatter_dir(&agents_dir, dir, &mut v);
    }

    if !agents_dir.join("AGENTS.md").exists() {
        v.warnings.push("Missing .agents/AGENTS.md".to_string());
    }

    if let Some(m) = &manifest {
        check_prefix_convention(m, &mut v);
        if m.features.hooks {
            check_hooks(&agents_dir, &mut v);
        }
        if m.features.mcp && !m.mcp.servers.is_empty() {
            check_mcp_config(&agents_dir, &mut v);
        }
        check_orphaned_customizations(root, &agents_dir, &mut v);
    }

    println!();

    if v.errors.is_empty() && v.warnings.is_empty() {
        output::print_box("Validation", &["All checks passed".to_string()]);
        return Ok(());
    }

    for err in &v.errors {
        output::error(err);
    }
    for warning in &v.warnings {
        output::warn(warning);
    }
    println!();

    let summary = vec![
        format!("{} error(s)", v.errors.len()),
        format!("{} warning(s)", v.warnings.len()),
    ];
    if v.errors.is_empty() {
        output::print_box("Validation passed", &summary);
        Ok(())
    } else {
        output::print_box("Validation failed", &summary);
        std::process::exit(1);
    }
}

/// Frontmatter and skill-layout checks for one canonical directory.
/// Warnings only for user-fixable nits; a half-open frontmatter block is an
/// error because downstream parsing silently treats the file as all-body.
fn check_frontmatter_dir(agents_dir: &Path, dir: &str, v: &mut Validation) {
    let dir_path = agents_dir.join(dir);
    let Ok(entries) = std::fs::read_dir(&dir_path) else {
        return; // already reported as missing
    };

    let mut names: Vec<(String, bool)> = entries
        .flatten()
        .map(|e| {
            let is_dir = e.path().is_dir();
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
        .collect();
    names.sort();

    for (name, is_dir) in names {
        if is_dir {
            if !dir_path.join(&name).join("SKILL.md").exists() {
                v.warnings
                    .push(format!("Skill directory missing SKILL.md: .agents/{dir}/{name}/"));
            }
            continue;
        }
        if !name.ends_with(".md") {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(dir_path.join(&name)) else {
            continue;
        };
        if !content.starts_with("---") {
            v.warnings
                .push(format!("Missing frontmatter: .agents/{dir}/{name}"));
            continue;
        }
        let Some(end) = content[3..].find("---").map(|i| i + 3) else {
            v.errors.push(format!(
                "Invalid frontmatter (no closing ---): .agents/{dir}/{name}"
            ));
            continue;
        };
        let block = content[3..end].trim();
        let parsed: Option<serde_yaml::Mapping> = serde_yaml::from_str(block).ok();
        let has_key = |key: &str| {
            parsed
                .as_ref()
                .map(|m| m.contains_key(key))
                .unwrap_or(false)
        };
        if !has_key("id") && !has_key("name") {
            v.warnings
                .push(format!("Missing 'id' in frontmatter: .agents/{dir}/{name}"));
        }
        if !has_key("type") && dir != "hooks" {
            v.warnings
                .push(format!("Missing 'type' in frontmatter: .agents/{dir}/{name}"));
        }
    }
}

fn check_prefix_convention(manifest: &HatchManifest, v: &mut Validation) {
    for managed in &manifest.managed_files {
        let file_name = managed.rsplit('/').next().unwrap_or("");
        let is_shared = SHARED_FILES
            .iter()
            .any(|sf| file_name == *sf || managed.ends_with(sf));
        if !is_shared && !file_name.starts_with(HATCH3R_PREFIX) && !file_name.starts_with('.') {
            v.warnings
                .push(format!("Managed file without hatch3r- prefix: {managed}"));
        }
    }
}

fn check_hooks(agents_dir: &Path, v: &mut Validation) {
    let hooks_dir = agents_dir.join("hooks");
    let Ok(entries) = std::fs::read_dir(&hooks_dir) else {
        v.warnings
            .push("Hooks feature enabled but .agents/hooks/ directory not found".to_string());
        return;
    };

    let mut hook_files: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".md"))
        .collect();
    hook_files.sort();

    if hook_files.is_empty() {
        v.warnings.push(
            "Hooks feature enabled but no hook definitions found in .agents/hooks/".to_string(),
        );
        return;
    }

    let agent_files: Option<HashSet<String>> = std::fs::read_dir(agents_dir.join("agents"))
        .ok()
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".md"))
                .collect()
        });

    for hook_file in hook_files {
        let Ok(content) = std::fs::read_to_string(hooks_dir.join(&hook_file)) else {
            continue;
        };
        if !content.starts_with("---") {
            v.warnings
                .push(format!("Hook missing frontmatter: .agents/hooks/{hook_file}"));
            continue;
        }
        let Some(end) = content[3..].find("---").map(|i| i + 3) else {
            continue;
        };
        let Ok(serde_yaml::Value::Mapping(fm)) =
            serde_yaml::from_str::<serde_yaml::Value>(content[3..end].trim())
        else {
            continue;
        };
        let agent = fm.get("agent").and_then(|val| val.as_str());
        if let (Some(agent), Some(files)) = (agent, &agent_files) {
            let expected = format!("{}.md", to_prefixed_id(agent));
            if !files.contains(&expected) {
                v.errors.push(format!(
                    "Hook \"{hook_file}\" references agent \"{agent}\" but .agents/agents/{expected} does not exist"
                ));
            }
        }
    }
}

fn check_mcp_config(agents_dir: &Path, v: &mut Validation) {
    let path = paths::mcp_config_path(agents_dir);
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(parsed) => {
                if !parsed.get("mcpServers").map(|s| s.is_object()).unwrap_or(false) {
                    v.errors.push("MCP config missing 'mcpServers' key".to_string());
                }
            }
            Err(_) => v.errors.push("Invalid JSON in .agents/mcp/mcp.json".to_string()),
        },
        Err(_) => v.warnings.push(
            "MCP servers configured but .agents/mcp/mcp.json not found".to_string(),
        ),
    }
}

fn check_orphaned_customizations(root: &Path, agents_dir: &Path, v: &mut Validation) {
    let customize_dir = root.join(paths::CUSTOMIZE_DIR).join("agents");
    let Ok(entries) = std::fs::read_dir(&customize_dir) else {
        return; // no customization directory is normal
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(agent_id) = name.strip_suffix(".customize.yaml") else {
            continue;
        };
        if !agents_dir.join("agents").join(format!("{agent_id}.md")).exists() {
            v.warnings.push(format!(
                "Customization file for non-existent agent: .hatch3r/agents/{name}"
            ));
        }
    }
}
