use crate::managed::wrap_in_managed_block;

/// Orchestration directives shared by every tool bridge file. Keeps the
/// per-tool entry points pointing back at the canonical `.agents/` tree
/// instead of restating instructions thirteen times.
pub const BRIDGE_ORCHESTRATION: &str = "\
## Orchestration

- Canonical state lives in `.agents/` — rules, agents, skills, commands,
  prompts, and MCP config. Generated tool files are projections of it.
- To change an instruction, edit the canonical file and run `hatch3r sync`.
  Never hand-edit inside `<!-- HATCH3R:BEGIN -->` / `<!-- HATCH3R:END -->`
  markers; anything outside the markers is yours and is never touched.
- Per-project tweaks without editing canonical files: drop a
  `<id>.customize.yaml` (model, scope, description, enabled) or
  `<id>.customize.md` (appended guidance) under `.hatch3r/`.
- Secrets for MCP servers belong in `.env.mcp` (gitignored).";

/// Inner content of the managed block in the root `AGENTS.md`.
pub const AGENTS_MD_INNER: &str = "\
# Hatch3r Agent Setup

This repository's agent configuration is generated by hatch3r from the
canonical files in `.agents/`.

- `.agents/AGENTS.md` — full canonical instructions
- `.agents/rules/` — project rules (scoped or always-on)
- `.agents/agents/` — specialist agent definitions
- `.agents/skills/` — reusable skills
- `.agents/commands/` — slash commands / workflows
- `.agents/mcp/mcp.json` — MCP server configuration

Run `hatch3r sync` after editing canonical files, `hatch3r status` to check
for drift, and `hatch3r validate` to lint the canonical tree.";

/// Full root `AGENTS.md` as written when the file does not yet exist. For
/// managed writes the content parameter must already be the delimited
/// full-file form.
pub fn agents_md_full() -> String {
    wrap_in_managed_block(AGENTS_MD_INNER)
}

/// Canonical `.agents/AGENTS.md` — owned by hatch3r, refreshed on every
/// sync/update.
pub const CANONICAL_AGENTS_MD: &str = "\
# Canonical Agent Instructions

This directory is the single source of truth for every AI coding tool
configured in this repository. hatch3r reads these files and generates the
native configuration for each selected tool.

## Layout

| Path | Contents |
|---|---|
| `rules/*.md` | Rules with optional `scope` (`always` or globs) |
| `agents/*.md` | Agent definitions with optional `model` |
| `skills/<name>/SKILL.md` | Skills, one directory per skill |
| `commands/*.md` | Commands forwarded to tools verbatim |
| `prompts/*.md` | Prompt templates |
| `github-agents/*.md` | GitHub-surface agent definitions |
| `hooks/*.md` | Event hooks (`id`, `event`, `agent`, conditions) |
| `mcp/mcp.json` | MCP server definitions |
| `hatch.json` | The project manifest |

## Frontmatter

Files start with a YAML block delimited by `---` lines. Recognized keys:
`id`, `name`, `type`, `description`, `scope`, `model`. Files without
frontmatter are treated as raw drop-in content.

## Editing

Edit here, then run `hatch3r sync`. Generated files carry either a
`hatch3r-` filename prefix (fully regenerable) or a managed block
(regenerable region inside a shared file). User-owned text outside managed
blocks is never modified.
";
