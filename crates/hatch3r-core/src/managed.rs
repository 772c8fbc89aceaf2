use crate::error::{HatchError, Result};

/// Opening delimiter of the managed region in a generated file.
pub const MANAGED_BLOCK_START: &str = "<!-- HATCH3R:BEGIN -->";
/// Closing delimiter of the managed region in a generated file.
pub const MANAGED_BLOCK_END: &str = "<!-- HATCH3R:END -->";

/// True if both delimiters are present anywhere in `content`, in any order.
/// Existence only — well-formedness is checked by `insert_managed_block`.
pub fn has_managed_block(content: &str) -> bool {
    content.contains(MANAGED_BLOCK_START) && content.contains(MANAGED_BLOCK_END)
}

/// The trimmed text strictly between the delimiters, or `None` if either
/// delimiter is absent or the markers are reversed.
pub fn extract_managed_block(content: &str) -> Option<String> {
    let start = content.find(MANAGED_BLOCK_START)?;
    let end = content.find(MANAGED_BLOCK_END)?;
    let inner_start = start + MANAGED_BLOCK_START.len();
    if end < inner_start {
        return None;
    }
    Some(content[inner_start..end].trim().to_string())
}

/// The user-owned text surrounding the managed block: text before and after
/// the delimiters, each trimmed, joined with a blank line. A file with no
/// block is entirely custom content.
pub fn extract_custom_content(content: &str) -> String {
    let (Some(start), Some(end)) = (
        content.find(MANAGED_BLOCK_START),
        content.find(MANAGED_BLOCK_END),
    ) else {
        return content.to_string();
    };

    let before = content[..start].trim();
    let after = content[end + MANAGED_BLOCK_END.len()..].trim();
    [before, after]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn wrap_in_managed_block(content: &str) -> String {
    format!("{MANAGED_BLOCK_START}\n{content}\n{MANAGED_BLOCK_END}")
}

/// Replace the delimited region of `existing` with a freshly wrapped copy of
/// `managed`, preserving everything before the start delimiter and after the
/// end delimiter byte-for-byte.
///
/// Errors if either delimiter is absent, or if the start delimiter appears at
/// or after the end delimiter. Reversed markers indicate a previous bug or
/// manual corruption and are never silently repaired — doing so could
/// destroy user content.
pub fn insert_managed_block(existing: &str, managed: &str) -> Result<String> {
    let start = existing.find(MANAGED_BLOCK_START);
    let end = existing.find(MANAGED_BLOCK_END);

    let (Some(start), Some(end)) = (start, end) else {
        return Err(HatchError::MarkersMissing);
    };

    if start >= end {
        return Err(HatchError::MarkersReversed);
    }

    let block = wrap_in_managed_block(managed);
    let before = &existing[..start];
    let after = &existing[end + MANAGED_BLOCK_END.len()..];
    Ok(format!("{before}{block}{after}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
