use crate::canonical::frontmatter_str;
use crate::error::Result;
use std::fmt;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// HookEvent / HookCondition / HookDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    PreCommit,
    PostMerge,
    CiFailure,
    FileSave,
    SessionStart,
    PrePush,
}

impl HookEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::PreCommit => "pre-commit",
            HookEvent::PostMerge => "post-merge",
            HookEvent::CiFailure => "ci-failure",
            HookEvent::FileSave => "file-save",
            HookEvent::SessionStart => "session-start",
            HookEvent::PrePush => "pre-push",
        }
    }

    pub fn parse(s: &str) -> Option<HookEvent> {
        match s {
            "pre-commit" => Some(HookEvent::PreCommit),
            "post-merge" => Some(HookEvent::PostMerge),
            "ci-failure" => Some(HookEvent::CiFailure),
            "file-save" => Some(HookEvent::FileSave),
            "session-start" => Some(HookEvent::SessionStart),
            "pre-push" => Some(HookEvent::PrePush),
            _ => None,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookCondition {
    pub globs: Vec<String>,
    pub labels: Vec<String>,
    pub branches: Vec<String>,
}

impl HookCondition {
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty() && self.labels.is_empty() && self.branches.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HookDefinition {
    pub id: String,
    pub event: HookEvent,
    pub agent: String,
    pub description: String,
    pub condition: Option<HookCondition>,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn string_field(mapping: &serde_yaml::Mapping, key: &str) -> Option<String> {
    match mapping.get(key) {
        Some(serde_yaml::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn parse_hook_frontmatter(content: &str) -> Option<HookDefinition> {
    let yaml = frontmatter_str(content)?;
    let serde_yaml::Value::Mapping(mapping) = serde_yaml::from_str(yaml).ok()? else {
        return None;
    };

    let id = string_field(&mapping, "id")?;
    let event_str = string_field(&mapping, "event")?;
    let agent = string_field(&mapping, "agent")?;

    let Some(event) = HookEvent::parse(&event_str) else {
        warn!("hook '{id}' has unknown event '{event_str}', skipping");
        return None;
    };

    let condition = HookCondition {
        globs: string_field(&mapping, "globs")
            .map(|v| split_csv(&v))
            .unwrap_or_default(),
        labels: string_field(&mapping, "labels")
            .map(|v| split_csv(&v))
            .unwrap_or_default(),
        branches: string_field(&mapping, "branches")
            .map(|v| split_csv(&v))
            .unwrap_or_default(),
    };

    Some(HookDefinition {
        id,
        event,
        agent,
        description: string_field(&mapping, "description").unwrap_or_default(),
        condition: if condition.is_empty() {
            None
        } else {
            Some(condition)
        },
    })
}

/// Read every hook definition under `.agents/hooks/*.md`. Files missing the
/// required `id`/`event`/`agent` frontmatter are skipped; a missing
/// directory yields an empty list.
pub fn read_hook_definitions(agents_dir: &Path) -> Result<Vec<HookDefinition>> {
    let hooks_dir = agents_dir.join("hooks");
    let entries = match std::fs::read_dir(&hooks_dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();

    let mut hooks = Vec::new();
    for name in names {
        let content = std::fs::read_to_string(hooks_dir.join(&name))?;
        if let Some(hook) = parse_hook_frontmatter(&content) {
            hooks.push(hook);
        }
    }

    Ok(hooks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
