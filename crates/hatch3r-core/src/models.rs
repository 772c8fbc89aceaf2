use crate::canonical::CanonicalFile;
use crate::customize::Customization;
use crate::manifest::HatchManifest;

/// Short aliases for the model ids users actually type. Unknown strings pass
/// through unchanged so raw model ids keep working as providers ship new
/// versions.
pub const MODEL_ALIASES: &[(&str, &str)] = &[
    ("opus", "claude-opus-4-6"),
    ("sonnet", "claude-sonnet-4-6"),
    ("haiku", "claude-haiku-4-5"),
    ("codex", "gpt-5.3-codex"),
    ("codex-prev", "gpt-5.2-codex"),
    ("codex-mini", "gpt-5.1-codex-mini"),
    ("codex-spark", "gpt-5.3-codex-spark"),
    ("gemini-pro", "gemini-3.1-pro"),
    ("gemini-flash", "gemini-3-flash"),
    ("gemini-stable", "gemini-2.5-pro"),
];

pub fn resolve_model_alias(input: &str) -> &str {
    MODEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == input)
        .map(|(_, id)| *id)
        .unwrap_or(input)
}

/// Resolve the effective model for an agent through the full precedence
/// chain, then expand aliases:
/// customize > manifest.models.agents[id] > frontmatter > manifest default.
pub fn resolve_agent_model(
    agent_id: &str,
    agent: &CanonicalFile,
    manifest: &HatchManifest,
    customize: Option<&Customization>,
) -> Option<String> {
    let models = manifest.models.as_ref();
    let raw = customize
        .and_then(|c| c.model.as_deref())
        .or_else(|| models.and_then(|m| m.agents.get(agent_id).map(String::as_str)))
        .or(agent.model.as_deref())
        .or_else(|| models.and_then(|m| m.default.as_deref()))?;
    Some(resolve_model_alias(raw).to_string())
}

/// Provider-qualified form of a resolved model id, for tools whose native
/// config expects `provider/model`.
pub fn with_provider_prefix(model_id: &str) -> String {
    let provider = if model_id.starts_with("claude-") {
        Some("anthropic")
    } else if model_id.starts_with("gpt-") || model_id.starts_with("codex-") {
        Some("openai")
    } else if model_id.starts_with("gemini-") {
        Some("google")
    } else {
        None
    };
    match provider {
        Some(p) => format!("{p}/{model_id}"),
        None => model_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
