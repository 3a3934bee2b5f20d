//! Deterministic `project_id` derivation from a root path.
//!
//! Canonicalize, lowercase, replace separators/non-alphanumerics with `_`,
//! collapse runs, trim leading/trailing `_`.

use std::path::{Path, PathBuf};

/// Canonicalize `path` (falling back to a best-effort absolute path if the
/// filesystem entry does not exist yet) and derive the stable project id.
pub fn derive_project_id(path: &Path) -> std::io::Result<String> {
    let canonical = canonicalize_best_effort(path)?;
    Ok(slugify(&canonical.to_string_lossy()))
}

fn canonicalize_best_effort(path: &Path) -> std::io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(e) => {
            if path.is_absolute() {
                Ok(path.to_path_buf())
            } else {
                std::env::current_dir().map(|cwd| cwd.join(path)).or(Err(e))
            }
        }
    }
}

fn slugify(normalized_path: &str) -> String {
    let lowered = normalized_path.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_sep = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(
            slugify("/www/MCP/Remembrances/remembrances-mcp"),
            "www_mcp_remembrances_remembrances_mcp"
        );
    }

    #[test]
    fn slugify_is_deterministic() {
        let a = slugify("/repo/A");
        let b = slugify("/repo/A");
        assert_eq!(a, b);
    }
}
</content>
