use thiserror::Error;

#[derive(Debug, Error)]
pub enum HatchError {
    #[error("not initialized: no .agents/hatch.json found — run 'hatch3r init'")]
    NotInitialized,

    #[error("content must contain managed block markers")]
    MarkersMissing,

    #[error("corrupted managed block: start marker must appear before end marker")]
    MarkersReversed,

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HatchError>;
