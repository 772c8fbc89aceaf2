use hatch3r_core::manifest::Tool;
use std::path::Path;

/// Tools that already have native config in the repo, detected by their
/// marker paths. Used to pick init defaults when `--tools` is not given.
pub fn detect_existing_tools(root: &Path) -> Vec<Tool> {
    let mut tools = Vec::new();
    let exists = |p: &str| root.join(p).exists();

    if exists(".cursor") {
        tools.push(Tool::Cursor);
    }
    if exists(".github/copilot-instructions.md") {
        tools.push(Tool::Copilot);
    }
    if exists("CLAUDE.md") || exists(".claude") {
        tools.push(Tool::Claude);
    }
    if exists("opencode.json") || exists("opencode.jsonc") {
        tools.push(Tool::Opencode);
    }
    if exists(".windsurfrules") {
        tools.push(Tool::Windsurf);
    }
    if exists(".amp") {
        tools.push(Tool::Amp);
    }
    if exists(".codex") {
        tools.push(Tool::Codex);
    }
    if exists(".gemini") || exists("GEMINI.md") {
        tools.push(Tool::Gemini);
    }
    if exists(".clinerules") || exists(".roo") || exists(".roomodes") {
        tools.push(Tool::Cline);
    }
    if exists(".aider.conf.yml") {
        tools.push(Tool::Aider);
    }
    if exists(".kiro") {
        tools.push(Tool::Kiro);
    }
    if exists(".goosehints") || exists(".goose") {
        tools.push(Tool::Goose);
    }
    if exists(".rules") {
        tools.push(Tool::Zed);
    }

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_repo_detects_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(detect_existing_tools(dir.path()).is_empty());
    }

    #[test]
    fn marker_paths_detect_tools() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        std::fs::write(dir.path().join("CLAUDE.md"), "x").unwrap();
        std::fs::write(dir.path().join(".goosehints"), "x").unwrap();

        let tools = detect_existing_tools(dir.path());
        assert_eq!(tools, vec![Tool::Cursor, Tool::Claude, Tool::Goose]);
    }
}
