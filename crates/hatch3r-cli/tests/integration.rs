use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hatch3r(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hatch3r").unwrap();
    cmd.current_dir(dir.path()).env("HATCH3R_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir, tools: &str) {
    hatch3r(dir)
        .args(["init", "--tools", tools, "--yes"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// hatch3r init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_canonical_tree() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    assert!(dir.path().join(".agents").is_dir());
    assert!(dir.path().join(".agents/hatch.json").exists());
    assert!(dir.path().join(".agents/AGENTS.md").exists());
    assert!(dir.path().join(".agents/rules/hatch3r-code-standards.md").exists());
    assert!(dir.path().join(".agents/agents/hatch3r-implementer.md").exists());
    assert!(dir
        .path()
        .join(".agents/skills/hatch3r-issue-workflow/SKILL.md")
        .exists());
    assert!(dir.path().join(".agents/mcp/mcp.json").exists());
    assert!(dir.path().join("AGENTS.md").exists());
    assert!(dir.path().join(".cursor/rules/hatch3r-bridge.mdc").exists());
    assert!(dir
        .path()
        .join(".cursor/rules/hatch3r-code-standards.mdc")
        .exists());
}

#[test]
fn init_writes_env_mcp_and_gitignore() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    let env = std::fs::read_to_string(dir.path().join(".env.mcp")).unwrap();
    assert!(env.contains("GITHUB_PAT="));
    assert!(env.contains("BRAVE_API_KEY="));

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.lines().any(|l| l == ".env.mcp"));
}

#[test]
fn init_selects_tools_from_csv() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "claude,zed");

    assert!(dir.path().join("CLAUDE.md").exists());
    assert!(dir.path().join(".claude/settings.json").exists());
    assert!(dir.path().join(".rules").exists());
    assert!(!dir.path().join(".cursor").exists());
}

#[test]
fn init_rejects_unknown_tool() {
    let dir = TempDir::new().unwrap();
    hatch3r(&dir)
        .args(["init", "--tools", "emacs", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("emacs"));
}

#[test]
fn init_preserves_existing_agents_md() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("AGENTS.md"),
        "# My Custom Instructions\n\nHands off.\n",
    )
    .unwrap();
    init_project(&dir, "cursor");

    let content = std::fs::read_to_string(dir.path().join("AGENTS.md")).unwrap();
    assert!(content.contains("# My Custom Instructions"));
    assert!(content.contains("<!-- HATCH3R:BEGIN -->"));
    // Managed block is prepended above the user's content.
    let block = content.find("<!-- HATCH3R:BEGIN -->").unwrap();
    let user = content.find("# My Custom Instructions").unwrap();
    assert!(block < user);
}

#[test]
fn init_requires_yes_when_already_initialized() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    hatch3r(&dir).args(["init", "--tools", "cursor"]).assert().failure();
    hatch3r(&dir)
        .args(["init", "--tools", "cursor", "--yes"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// hatch3r sync
// ---------------------------------------------------------------------------

#[test]
fn sync_without_init_fails() {
    let dir = TempDir::new().unwrap();
    hatch3r(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stdout(predicate::str::contains("hatch3r init"));
}

#[test]
fn sync_is_idempotent_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "claude,cursor");

    hatch3r(&dir).arg("sync").assert().success();
    let claude_md = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    let bridge =
        std::fs::read_to_string(dir.path().join(".cursor/rules/hatch3r-bridge.mdc")).unwrap();
    let settings =
        std::fs::read_to_string(dir.path().join(".claude/settings.json")).unwrap();

    hatch3r(&dir).arg("sync").assert().success();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap(),
        claude_md
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".cursor/rules/hatch3r-bridge.mdc")).unwrap(),
        bridge
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".claude/settings.json")).unwrap(),
        settings
    );
}

#[test]
fn sync_preserves_user_content_outside_managed_block() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "claude");

    let path = dir.path().join("CLAUDE.md");
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("\n\n# My Team Notes\n\nDo not touch.\n");
    std::fs::write(&path, &content).unwrap();

    hatch3r(&dir).arg("sync").assert().success();

    let after = std::fs::read_to_string(&path).unwrap();
    assert!(after.contains("# My Team Notes"));
    assert!(after.contains("Do not touch."));
    assert!(after.contains("<!-- HATCH3R:BEGIN -->"));
}

#[test]
fn sync_skips_unmanaged_claude_md() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    // Hand-written CLAUDE.md without markers; switch the manifest to claude.
    std::fs::write(dir.path().join("CLAUDE.md"), "my own claude file\n").unwrap();
    let manifest_path = dir.path().join(".agents/hatch.json");
    let manifest = std::fs::read_to_string(&manifest_path)
        .unwrap()
        .replace("\"cursor\"", "\"claude\"");
    std::fs::write(&manifest_path, manifest).unwrap();

    hatch3r(&dir).arg("sync").assert().success();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap(),
        "my own claude file\n"
    );
}

#[test]
fn sync_picks_up_new_canonical_rule() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    std::fs::write(
        dir.path().join(".agents/rules/extra-rule.md"),
        "---\nid: extra-rule\ntype: rule\nscope: always\ndescription: Extra\n---\nExtra body.",
    )
    .unwrap();

    hatch3r(&dir).arg("sync").assert().success();
    let rule =
        std::fs::read_to_string(dir.path().join(".cursor/rules/hatch3r-extra-rule.mdc")).unwrap();
    assert!(rule.contains("Extra body."));
    assert!(rule.contains("alwaysApply: true"));
}

#[test]
fn disabled_customization_suppresses_output() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    std::fs::write(
        dir.path().join(".agents/rules/muted.md"),
        "---\nid: muted\ntype: rule\nscope: always\ndescription: Muted\n---\nbody",
    )
    .unwrap();
    let custom = dir.path().join(".hatch3r/rules");
    std::fs::create_dir_all(&custom).unwrap();
    std::fs::write(custom.join("muted.customize.yaml"), "enabled: false\n").unwrap();

    hatch3r(&dir).arg("sync").assert().success();
    assert!(!dir.path().join(".cursor/rules/hatch3r-muted.mdc").exists());
}

#[test]
fn customize_markdown_is_appended_to_generated_rule() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    let custom = dir.path().join(".hatch3r/rules");
    std::fs::create_dir_all(&custom).unwrap();
    std::fs::write(
        custom.join("hatch3r-code-standards.customize.md"),
        "Use four-space indentation.\n",
    )
    .unwrap();

    hatch3r(&dir).arg("sync").assert().success();
    let rule = std::fs::read_to_string(
        dir.path().join(".cursor/rules/hatch3r-code-standards.mdc"),
    )
    .unwrap();
    assert!(rule.contains("## Project Customizations"));
    assert!(rule.contains("Use four-space indentation."));
}

// ---------------------------------------------------------------------------
// hatch3r status
// ---------------------------------------------------------------------------

#[test]
fn status_reports_in_sync_after_init() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    hatch3r(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("In sync"));
}

#[test]
fn status_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");
    std::fs::remove_file(dir.path().join(".cursor/rules/hatch3r-bridge.mdc")).unwrap();

    hatch3r(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn status_reports_drift_after_canonical_edit() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    std::fs::write(
        dir.path().join(".agents/rules/hatch3r-code-standards.md"),
        "---\nid: hatch3r-code-standards\ntype: rule\nscope: always\ndescription: Changed\n---\nNew body.",
    )
    .unwrap();

    hatch3r(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("drifted"));
}

#[test]
fn status_does_not_write() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    std::fs::write(
        dir.path().join(".agents/rules/hatch3r-code-standards.md"),
        "---\nid: hatch3r-code-standards\ntype: rule\nscope: always\ndescription: Changed\n---\nNew body.",
    )
    .unwrap();
    let before = std::fs::read_to_string(
        dir.path().join(".cursor/rules/hatch3r-code-standards.mdc"),
    )
    .unwrap();

    hatch3r(&dir).arg("status").assert().success();
    let after = std::fs::read_to_string(
        dir.path().join(".cursor/rules/hatch3r-code-standards.mdc"),
    )
    .unwrap();
    assert_eq!(before, after);
}

// ---------------------------------------------------------------------------
// hatch3r update
// ---------------------------------------------------------------------------

#[test]
fn update_backs_up_managed_files() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "claude");

    hatch3r(&dir).arg("update").assert().success();
    // Managed-block files existed before the update, so a backup copy lands
    // in the sibling .backups directory.
    assert!(dir.path().join(".backups").is_dir());
}

#[test]
fn update_no_backup_skips_backups() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "zed");

    hatch3r(&dir).args(["update", "--no-backup"]).assert().success();
    assert!(!dir.path().join(".backups").exists());
}

#[test]
fn update_refreshes_seed_rules() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    let seed = dir.path().join(".agents/rules/hatch3r-code-standards.md");
    std::fs::write(&seed, "scribbled over").unwrap();

    hatch3r(&dir).arg("update").assert().success();
    let content = std::fs::read_to_string(&seed).unwrap();
    assert!(content.contains("id: hatch3r-code-standards"));
}

// ---------------------------------------------------------------------------
// hatch3r validate
// ---------------------------------------------------------------------------

#[test]
fn validate_without_agents_dir_fails() {
    let dir = TempDir::new().unwrap();
    hatch3r(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains(".agents/ directory not found"));
}

#[test]
fn validate_passes_after_init() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    hatch3r(&dir).arg("validate").assert().success();
}

#[test]
fn validate_flags_hook_with_unknown_agent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    std::fs::write(
        dir.path().join(".agents/hooks/bad-hook.md"),
        "---\nid: bad-hook\nevent: pre-commit\nagent: ghost\n---\n",
    )
    .unwrap();

    hatch3r(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("ghost"));
}

#[test]
fn validate_warns_on_orphaned_customization() {
    let dir = TempDir::new().unwrap();
    init_project(&dir, "cursor");

    let custom = dir.path().join(".hatch3r/agents");
    std::fs::create_dir_all(&custom).unwrap();
    std::fs::write(custom.join("ghost.customize.yaml"), "model: opus\n").unwrap();

    hatch3r(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("non-existent agent"));
}
