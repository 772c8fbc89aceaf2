use crate::canonical::CanonicalFile;
use crate::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// Customization
// ---------------------------------------------------------------------------

/// User-authored overrides for one canonical entity, read from
/// `.hatch3r/{dir}/{id}.customize.yaml`. All fields optional; empty strings
/// are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customization {
    pub model: Option<String>,
    pub scope: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

impl Customization {
    fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.scope.is_none()
            && self.description.is_none()
            && self.enabled.is_none()
    }
}

fn non_empty_string(mapping: &serde_yaml::Mapping, key: &str) -> Option<String> {
    match mapping.get(key) {
        Some(serde_yaml::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Read the YAML override file for `(dir, id)`. Any failure — missing file,
/// unreadable file, invalid YAML — degrades to `None`: user-authored
/// customizations must never hard-fail generation.
pub fn read_customization(project_root: &Path, dir: &str, id: &str) -> Option<Customization> {
    let path = paths::customize_yaml_path(project_root, dir, id);
    let raw = std::fs::read_to_string(path).ok()?;
    let serde_yaml::Value::Mapping(mapping) = serde_yaml::from_str(&raw).ok()? else {
        return None;
    };

    let result = Customization {
        model: non_empty_string(&mapping, "model"),
        scope: non_empty_string(&mapping, "scope"),
        description: non_empty_string(&mapping, "description"),
        enabled: match mapping.get("enabled") {
            Some(serde_yaml::Value::Bool(b)) => Some(*b),
            _ => None,
        },
    };

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

/// Read the Markdown append-file for `(dir, id)`. Whitespace-only content is
/// treated as absent.
pub fn read_customization_markdown(project_root: &Path, dir: &str, id: &str) -> Option<String> {
    let path = paths::customize_md_path(project_root, dir, id);
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// applyCustomization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CustomizationResult {
    pub content: String,
    /// `true` means the entity is disabled and must be omitted from every
    /// adapter's output. `content` is still populated for type-compatibility
    /// but must not be written.
    pub skip: bool,
    pub overrides: Customization,
}

fn resolve(project_root: &Path, file: &CanonicalFile, base: &str) -> CustomizationResult {
    let Some(dir) = file.kind.customize_dir() else {
        // Customization covers the four user-facing entity kinds only.
        return CustomizationResult {
            content: base.to_string(),
            skip: false,
            overrides: Customization::default(),
        };
    };

    let overrides = read_customization(project_root, dir, &file.id).unwrap_or_default();
    let appended = read_customization_markdown(project_root, dir, &file.id);

    if overrides.enabled == Some(false) {
        return CustomizationResult {
            content: base.to_string(),
            skip: true,
            overrides,
        };
    }

    let content = match appended {
        Some(md) => format!("{base}\n\n---\n\n## Project Customizations\n\n{md}"),
        None => base.to_string(),
    };

    CustomizationResult {
        content,
        skip: false,
        overrides,
    }
}

/// Combine a canonical file's body with its customization overrides and
/// appended Markdown. Adapters call this once per canonical file, use
/// `content` inside the managed block and `overrides` to adjust
/// frontmatter/metadata.
pub fn apply_customization(project_root: &Path, file: &CanonicalFile) -> CustomizationResult {
    resolve(project_root, file, &file.content)
}

/// Same as `apply_customization` but operates on `raw_content` (frontmatter
/// + body). Used by adapters that pass the file through verbatim, e.g.
/// command and skill passthrough files.
pub fn apply_customization_raw(project_root: &Path, file: &CanonicalFile) -> CustomizationResult {
    resolve(project_root, file, &file.raw_content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn make_rule(id: &str) -> CanonicalFile {
        CanonicalFile {
            id: id.to_string(),
            kind: CanonicalKind::Rule,
            description: "A rule".to_string(),
            scope: None,
            model: None,
            content: "rule body".to_string(),
            raw_content: "---\nid: x\n---\nrule body".to_string(),
            source_path: PathBuf::new(),
        }
    }

    fn write_customize(root: &Path, dir: &str, id: &str, yaml: &str) {
        let d = root.join(".hatch3r").join(dir);
        std::fs::create_dir_all(&d).unwrap();
        std::fs::write(d.join(format!("{id}.customize.yaml")), yaml).unwrap();
    }

    #[test]
    fn no_customization_passes_through() {
        let dir = TempDir::new().unwrap();
        let result = apply_customization(dir.path(), &make_rule("plain"));
        assert_eq!(result.content, "rule body");
        assert!(!result.skip);
        assert_eq!(result.overrides, Customization::default());
    }

    #[test]
    fn unsupported_kind_short_circuits() {
        let dir = TempDir::new().unwrap();
        let mut prompt = make_rule("p");
        prompt.kind = CanonicalKind::Prompt;
        // Even with an override file on disk, prompts are never customized.
        write_customize(dir.path(), "prompts", "p", "enabled: false\n");
        let result = apply_customization(dir.path(), &prompt);
        assert!(!result.skip);
        assert_eq!(result.content, "rule body");
    }

    #[test]
    fn yaml_overrides_are_extracted() {
        let dir = TempDir::new().unwrap();
        write_customize(
            dir.path(),
            "rules",
            "r1",
            "model: haiku\nscope: \"src/**\"\ndescription: Custom desc\n",
        );
        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert_eq!(result.overrides.model.as_deref(), Some("haiku"));
        assert_eq!(result.overrides.scope.as_deref(), Some("src/**"));
        assert_eq!(result.overrides.description.as_deref(), Some("Custom desc"));
        assert_eq!(result.overrides.enabled, None);
    }

    #[test]
    fn empty_strings_are_absent() {
        let dir = TempDir::new().unwrap();
        write_customize(dir.path(), "rules", "r1", "model: \"\"\nscope: \"\"\n");
        assert_eq!(read_customization(dir.path(), "rules", "r1"), None);
    }

    #[test]
    fn invalid_yaml_means_no_overrides() {
        let dir = TempDir::new().unwrap();
        write_customize(dir.path(), "rules", "r1", ": bad : yaml [[[");
        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert_eq!(result.overrides, Customization::default());
        assert!(!result.skip);
    }

    #[test]
    fn enabled_false_sets_skip() {
        let dir = TempDir::new().unwrap();
        write_customize(dir.path(), "rules", "r1", "enabled: false\n");
        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert!(result.skip);
        assert_eq!(result.overrides.enabled, Some(false));
    }

    #[test]
    fn enabled_true_does_not_skip() {
        let dir = TempDir::new().unwrap();
        write_customize(dir.path(), "rules", "r1", "enabled: true\n");
        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert!(!result.skip);
    }

    #[test]
    fn markdown_is_appended_with_separator() {
        let dir = TempDir::new().unwrap();
        let d = dir.path().join(".hatch3r/rules");
        std::fs::create_dir_all(&d).unwrap();
        std::fs::write(d.join("r1.customize.md"), "\nExtra guidance.\n").unwrap();

        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert_eq!(
            result.content,
            "rule body\n\n---\n\n## Project Customizations\n\nExtra guidance."
        );
    }

    #[test]
    fn whitespace_only_markdown_is_ignored() {
        let dir = TempDir::new().unwrap();
        let d = dir.path().join(".hatch3r/rules");
        std::fs::create_dir_all(&d).unwrap();
        std::fs::write(d.join("r1.customize.md"), "   \n\n  ").unwrap();

        let result = apply_customization(dir.path(), &make_rule("r1"));
        assert_eq!(result.content, "rule body");
    }

    #[test]
    fn raw_variant_appends_to_raw_content() {
        let dir = TempDir::new().unwrap();
        let d = dir.path().join(".hatch3r/rules");
        std::fs::create_dir_all(&d).unwrap();
        std::fs::write(d.join("r1.customize.md"), "Extra.").unwrap();

        let result = apply_customization_raw(dir.path(), &make_rule("r1"));
        assert!(result.content.starts_with("---\nid: x\n---\nrule body"));
        assert!(result.content.ends_with("## Project Customizations\n\nExtra."));
    }
}
