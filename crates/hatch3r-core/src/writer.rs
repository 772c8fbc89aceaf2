use crate::error::Result;
use crate::io;
use crate::managed::{has_managed_block, insert_managed_block};
use crate::paths::{BACKUPS_DIR, HATCH3R_PREFIX};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// WriteAction / WriteOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteAction {
    Created,
    Updated,
    Skipped,
    BackedUp,
}

impl WriteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteAction::Created => "created",
            WriteAction::Updated => "updated",
            WriteAction::Skipped => "skipped",
            WriteAction::BackedUp => "backed-up",
        }
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub action: WriteAction,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Inner content for the managed block. Present means partial-file
    /// ownership: only the delimited region may be replaced.
    pub managed_content: Option<String>,
    /// Save a timestamped copy of the pre-write content before overwriting.
    pub backup: bool,
    /// When the target exists without markers, prepend the managed block
    /// above the untouched body instead of skipping. Used only by `init`.
    pub append_if_no_block: bool,
}

// ---------------------------------------------------------------------------
// Safe writer
// ---------------------------------------------------------------------------

/// True iff the basename starts with the `hatch3r-` prefix, independent of
/// directory. The prefix is the sole signal that a file is fully
/// regenerable outside managed blocks.
pub fn is_managed_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(HATCH3R_PREFIX))
        .unwrap_or(false)
}

/// Copy the current content of `path` into a sibling `.backups/` directory
/// with a timestamped name, returning the backup path.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now()
        .format("%Y-%m-%dT%H-%M-%S-%3fZ")
        .to_string();
    let backup_dir = path
        .parent()
        .unwrap_or(Path::new("."))
        .join(BACKUPS_DIR);
    std::fs::create_dir_all(&backup_dir)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let backup_path = backup_dir.join(format!("{timestamp}_{name}"));
    std::fs::copy(path, &backup_path)?;
    Ok(backup_path)
}

fn write_with_backup(path: &Path, content: &str, should_backup: bool) -> Result<WriteOutcome> {
    if should_backup {
        let backup = create_backup(path)?;
        io::atomic_write(path, content.as_bytes())?;
        return Ok(WriteOutcome {
            path: path.to_path_buf(),
            action: WriteAction::BackedUp,
            backup: Some(backup),
        });
    }
    io::atomic_write(path, content.as_bytes())?;
    Ok(WriteOutcome {
        path: path.to_path_buf(),
        action: WriteAction::Updated,
        backup: None,
    })
}

/// Write `content` to `path` without clobbering user-owned content.
///
/// - Missing file: written in full, `created`. For managed writes the
///   caller's `content` must already be the delimited full-file form.
/// - Existing file, managed mode: the delimited region is spliced in place;
///   an existing file without markers is skipped unless `append_if_no_block`
///   opts in to prepending the block above the untouched body.
/// - Existing file, whole-file mode: overwritten only when the basename
///   carries the `hatch3r-` prefix, otherwise skipped.
///
/// A backup is taken only when a write actually occurs.
pub fn safe_write_file(path: &Path, content: &str, opts: &WriteOptions) -> Result<WriteOutcome> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        io::atomic_write(path, content.as_bytes())?;
        return Ok(WriteOutcome {
            path: path.to_path_buf(),
            action: WriteAction::Created,
            backup: None,
        });
    }

    let existing = std::fs::read_to_string(path)?;

    if let Some(managed) = &opts.managed_content {
        if !has_managed_block(&existing) {
            if opts.append_if_no_block {
                let prepended =
                    format!("{}\n\n{}", content.trim(), existing.trim_start());
                return write_with_backup(path, &prepended, opts.backup);
            }
            return Ok(WriteOutcome {
                path: path.to_path_buf(),
                action: WriteAction::Skipped,
                backup: None,
            });
        }
        let merged = insert_managed_block(&existing, managed)?;
        return write_with_backup(path, &merged, opts.backup);
    }

    if is_managed_path(path) {
        return write_with_backup(path, content, opts.backup);
    }

    Ok(WriteOutcome {
        path: path.to_path_buf(),
        action: WriteAction::Skipped,
        backup: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managed::wrap_in_managed_block;
    use tempfile::TempDir;

    fn managed_opts(inner: &str) -> WriteOptions {
        WriteOptions {
            managed_content: Some(inner.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn managed_path_checks_basename_only() {
        assert!(is_managed_path(Path::new(
            ".cursor/rules/hatch3r-code-standards.mdc"
        )));
        assert!(is_managed_path(Path::new("hatch3r-bridge.mdc")));
        assert!(is_managed_path(Path::new("/absolute/path/hatch3r-rule.md")));
        assert!(!is_managed_path(Path::new(".cursor/rules/my-custom-rule.mdc")));
        assert!(!is_managed_path(Path::new("AGENTS.md")));
        assert!(!is_managed_path(Path::new("CLAUDE.md")));
        // prefix in a directory name does not count
        assert!(!is_managed_path(Path::new("hatch3r/rules/some-rule.md")));
        assert!(!is_managed_path(Path::new(".cursor/skills/hatch3r-test/SKILL.md")));
    }

    #[test]
    fn creates_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new-file.md");
        let outcome = safe_write_file(&path, "hello world", &WriteOptions::default()).unwrap();
        assert_eq!(outcome.action, WriteAction::Created);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/dir/file.md");
        let outcome = safe_write_file(&path, "deep content", &WriteOptions::default()).unwrap();
        assert_eq!(outcome.action, WriteAction::Created);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "deep content");
    }

    #[test]
    fn overwrites_prefixed_file_in_whole_file_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hatch3r-rule.md");
        std::fs::write(&path, "old content").unwrap();
        let outcome = safe_write_file(&path, "new content", &WriteOptions::default()).unwrap();
        assert_eq!(outcome.action, WriteAction::Updated);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn skips_unprefixed_file_in_whole_file_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom-file.md");
        std::fs::write(&path, "user content").unwrap();
        let outcome = safe_write_file(&path, "new content", &WriteOptions::default()).unwrap();
        assert_eq!(outcome.action, WriteAction::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "user content");
    }

    #[test]
    fn skips_unmanaged_file_when_managed_content_supplied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        let original = "# My Custom Section\n\nCustom content here.";
        std::fs::write(&path, original).unwrap();

        let outcome = safe_write_file(&path, "", &managed_opts("managed stuff")).unwrap();
        assert_eq!(outcome.action, WriteAction::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn skip_wins_over_backup_for_unmanaged_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        std::fs::write(&path, "original content").unwrap();

        let opts = WriteOptions {
            managed_content: Some("managed stuff".to_string()),
            backup: true,
            append_if_no_block: false,
        };
        let outcome = safe_write_file(&path, "", &opts).unwrap();
        assert_eq!(outcome.action, WriteAction::Skipped);
        assert!(outcome.backup.is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original content");
    }

    #[test]
    fn replaces_managed_block_preserving_custom_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        let existing = format!(
            "{}\n\n# Custom Section",
            wrap_in_managed_block("old managed content")
        );
        std::fs::write(&path, existing).unwrap();

        let outcome = safe_write_file(&path, "", &managed_opts("new managed content")).unwrap();
        assert_eq!(outcome.action, WriteAction::Updated);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("new managed content"));
        assert!(!content.contains("old managed content"));
        assert!(content.contains("# Custom Section"));
    }

    #[test]
    fn prepends_block_with_append_if_no_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        let user_content = "# My Custom Section\n\nCustom content here.";
        std::fs::write(&path, user_content).unwrap();

        let opts = WriteOptions {
            managed_content: Some("hatch3r content".to_string()),
            backup: false,
            append_if_no_block: true,
        };
        let full = wrap_in_managed_block("hatch3r content");
        let outcome = safe_write_file(&path, &full, &opts).unwrap();
        assert_eq!(outcome.action, WriteAction::Updated);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(user_content));
        assert!(content.contains("hatch3r content"));
        let block_pos = content.find("hatch3r content").unwrap();
        let user_pos = content.find(user_content).unwrap();
        assert!(block_pos < user_pos, "managed block must come first");
    }

    #[test]
    fn backs_up_before_overwriting_prefixed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hatch3r-code-standards.md");
        std::fs::write(&path, "old rule content").unwrap();

        let opts = WriteOptions {
            backup: true,
            ..Default::default()
        };
        let outcome = safe_write_file(&path, "new rule content", &opts).unwrap();
        assert_eq!(outcome.action, WriteAction::BackedUp);
        let backup = outcome.backup.expect("backup path");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "old rule content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new rule content");
    }

    #[test]
    fn managed_merge_applies_to_prefixed_file_too() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hatch3r-bridge.mdc");
        let existing = format!(
            "---\ndescription: user-customized description\n---\n\n{}\n\nUser custom additions",
            wrap_in_managed_block("old body")
        );
        std::fs::write(&path, existing).unwrap();

        let outcome =
            safe_write_file(&path, "ignored full content", &managed_opts("new body")).unwrap();
        assert_eq!(outcome.action, WriteAction::Updated);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("new body"));
        assert!(!content.contains("old body"));
        assert!(content.contains("user-customized description"));
        assert!(content.contains("User custom additions"));
    }

    #[test]
    fn second_identical_managed_write_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        let full = wrap_in_managed_block("same inner");

        safe_write_file(&path, &full, &managed_opts("same inner")).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        safe_write_file(&path, &full, &managed_opts("same inner")).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }
}
