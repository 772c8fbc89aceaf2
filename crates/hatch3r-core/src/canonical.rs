use crate::error::Result;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

// ---------------------------------------------------------------------------
// CanonicalKind / Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalKind {
    Rule,
    Agent,
    Skill,
    Command,
    Prompt,
    GithubAgent,
    Hook,
}

impl CanonicalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalKind::Rule => "rule",
            CanonicalKind::Agent => "agent",
            CanonicalKind::Skill => "skill",
            CanonicalKind::Command => "command",
            CanonicalKind::Prompt => "prompt",
            CanonicalKind::GithubAgent => "github-agent",
            CanonicalKind::Hook => "hook",
        }
    }

    /// Customization side-directory for this kind, or `None` for kinds that
    /// do not support customization (prompts, hooks, github-agents).
    pub fn customize_dir(self) -> Option<&'static str> {
        match self {
            CanonicalKind::Agent => Some("agents"),
            CanonicalKind::Skill => Some("skills"),
            CanonicalKind::Command => Some("commands"),
            CanonicalKind::Rule => Some("rules"),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A readable category under `.agents/`. Each maps to one directory layout
/// and one `CanonicalKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Rules,
    Agents,
    Skills,
    Commands,
    Prompts,
    GithubAgents,
}

impl Category {
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Rules => "rules",
            Category::Agents => "agents",
            Category::Skills => "skills",
            Category::Commands => "commands",
            Category::Prompts => "prompts",
            Category::GithubAgents => "github-agents",
        }
    }

    pub fn kind(self) -> CanonicalKind {
        match self {
            Category::Rules => CanonicalKind::Rule,
            Category::Agents => CanonicalKind::Agent,
            Category::Skills => CanonicalKind::Skill,
            Category::Commands => CanonicalKind::Command,
            Category::Prompts => CanonicalKind::Prompt,
            Category::GithubAgents => CanonicalKind::GithubAgent,
        }
    }
}

// ---------------------------------------------------------------------------
// CanonicalFile
// ---------------------------------------------------------------------------

/// One parsed source entity. Created fresh on every read, read-only after
/// construction; `source_path` is provenance only and never parsed again.
#[derive(Debug, Clone)]
pub struct CanonicalFile {
    pub id: String,
    pub kind: CanonicalKind,
    pub description: String,
    pub scope: Option<String>,
    pub model: Option<String>,
    /// Body text with frontmatter stripped.
    pub content: String,
    /// Original full file text including frontmatter.
    pub raw_content: String,
    pub source_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct Frontmatter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub model: Option<String>,
}

static FRONTMATTER_RE: OnceLock<Regex> = OnceLock::new();

fn frontmatter_re() -> &'static Regex {
    FRONTMATTER_RE.get_or_init(|| {
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---(?:\r?\n(.*))?\z").unwrap()
    })
}

/// The YAML text between the frontmatter delimiters, if the file has any.
pub(crate) fn frontmatter_str(raw: &str) -> Option<&str> {
    frontmatter_re()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn string_value(mapping: &serde_yaml::Mapping, key: &str) -> Option<String> {
    match mapping.get(key) {
        Some(serde_yaml::Value::String(s)) => Some(s.clone()),
        // Non-string values are ignored, not errors.
        _ => None,
    }
}

/// Split `raw` into recognized frontmatter fields and the body. Files
/// without frontmatter delimiters become all-body with default metadata, so
/// raw drop-in files work without authoring frontmatter. Invalid YAML also
/// degrades to defaults — user-authored content never hard-fails a read.
pub(crate) fn parse_frontmatter(raw: &str) -> (Frontmatter, String) {
    let Some(caps) = frontmatter_re().captures(raw) else {
        return (Frontmatter::default(), raw.to_string());
    };

    let body = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
    let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or("");

    let mut fm = Frontmatter::default();
    if let Ok(serde_yaml::Value::Mapping(mapping)) = serde_yaml::from_str(yaml) {
        fm.id = string_value(&mapping, "id").filter(|s| !s.is_empty());
        fm.name = string_value(&mapping, "name").filter(|s| !s.is_empty());
        fm.description = string_value(&mapping, "description");
        fm.scope = string_value(&mapping, "scope");
        fm.model = string_value(&mapping, "model");
    }

    (fm, body)
}

// ---------------------------------------------------------------------------
// Directory reading
// ---------------------------------------------------------------------------

/// Relative paths of every `.md` file under `dir`, recursively, with `/`
/// separators, sorted for deterministic output. Missing dir yields empty.
fn collect_md_files(dir: &Path) -> Result<Vec<String>> {
    fn walk(base: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        let entries = match std::fs::read_dir(base) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            let path = entry.path();
            if path.is_dir() {
                walk(&path, &rel, out)?;
            } else if name.ends_with(".md") {
                out.push(rel);
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    walk(dir, "", &mut files)?;
    files.sort();
    Ok(files)
}

fn fallback_id(rel_path: &str) -> String {
    rel_path
        .strip_suffix(".md")
        .unwrap_or(rel_path)
        .replace('/', "-")
}

fn read_flat_category(agents_dir: &Path, category: Category) -> Result<Vec<CanonicalFile>> {
    let dir = agents_dir.join(category.dir_name());
    let mut results = Vec::new();

    for rel in collect_md_files(&dir)? {
        let full_path = dir.join(&rel);
        let raw_content = std::fs::read_to_string(&full_path)?;
        let (fm, content) = parse_frontmatter(&raw_content);
        let id = fm
            .id
            .or(fm.name)
            .unwrap_or_else(|| fallback_id(&rel));
        // Scope is meaningful only for rules, model only for agents.
        let scope = match category {
            Category::Rules => fm.scope,
            _ => None,
        };
        let model = match category {
            Category::Agents => fm.model,
            _ => None,
        };
        results.push(CanonicalFile {
            id,
            kind: category.kind(),
            description: fm.description.unwrap_or_default(),
            scope,
            model,
            content,
            raw_content,
            source_path: full_path,
        });
    }

    Ok(results)
}

fn read_skills(agents_dir: &Path) -> Result<Vec<CanonicalFile>> {
    let skills_dir = agents_dir.join("skills");
    let entries = match std::fs::read_dir(&skills_dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut dirs: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        // Plain files inside skills/ are not skills.
        if entry.path().is_dir() {
            let name = entry.file_name().to_string_lossy().into_owned();
            dirs.push((name, entry.path()));
        }
    }
    dirs.sort();

    let mut results = Vec::new();
    for (dir_name, dir_path) in dirs {
        let skill_path = dir_path.join("SKILL.md");
        let raw_content = match std::fs::read_to_string(&skill_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                warn!("could not read SKILL.md in {dir_name}: {e}");
                continue;
            }
        };
        let (fm, content) = parse_frontmatter(&raw_content);
        // Skills prefer `name` over `id` — the skill name is the identity
        // tools surface to users.
        let id = fm.name.or(fm.id).unwrap_or(dir_name);
        results.push(CanonicalFile {
            id,
            kind: CanonicalKind::Skill,
            description: fm.description.unwrap_or_default(),
            scope: None,
            model: None,
            content,
            raw_content,
            source_path: skill_path,
        });
    }

    Ok(results)
}

/// Read every canonical file in one category. A missing category directory
/// is a normal empty result, never an error.
pub fn read_canonical_files(agents_dir: &Path, category: Category) -> Result<Vec<CanonicalFile>> {
    match category {
        Category::Skills => read_skills(agents_dir),
        _ => read_flat_category(agents_dir, category),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
