//! Language Registry: maps a file extension to a [`Language`] tag and,
//! from there, to a tree-sitter grammar handle.
//!
//! Populated at startup with a static table mapping extensions to
//! languages, collapsed into one place so C1 has a single home. Extension
//! match is case-insensitive; the leading `.` is stripped by the caller.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Rust,
    Go,
    Python,
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Java,
    C,
    Php,
    Swift,
    Markdown,
    Vue,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::JavaScript => "javascript",
            Language::Jsx => "jsx",
            Language::Java => "java",
            Language::C => "c",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Markdown => "markdown",
            Language::Vue => "vue",
        }
    }
}

struct Entry {
    language: Language,
    extensions: &'static [&'static str],
}

/// Static extension table. `.h` is ambiguous between C and Objective-C; it
/// resolves to the single documented default, C.
const TABLE: &[Entry] = &[
    Entry { language: Language::Rust, extensions: &["rs"] },
    Entry { language: Language::Go, extensions: &["go"] },
    Entry { language: Language::Python, extensions: &["py", "pyi"] },
    Entry { language: Language::Tsx, extensions: &["tsx"] },
    Entry { language: Language::TypeScript, extensions: &["ts"] },
    Entry { language: Language::Jsx, extensions: &["jsx"] },
    Entry { language: Language::JavaScript, extensions: &["js", "mjs", "cjs"] },
    Entry { language: Language::Java, extensions: &["java"] },
    Entry { language: Language::C, extensions: &["c", "h"] },
    Entry { language: Language::Php, extensions: &["php"] },
    Entry { language: Language::Swift, extensions: &["swift"] },
    Entry { language: Language::Markdown, extensions: &["md", "markdown"] },
    Entry { language: Language::Vue, extensions: &["vue"] },
];

/// Process-wide registry of recognized languages.
pub struct LanguageRegistry;

impl LanguageRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        TABLE
            .iter()
            .find(|e| e.extensions.contains(&ext.as_str()))
            .map(|e| e.language)
    }

    pub fn language_for_path(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.language_for_extension(ext)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.language_for_path(path).is_some()
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        TABLE.iter().flat_map(|e| e.extensions.iter().copied()).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_and_dot_stripped() {
        let reg = LanguageRegistry::new();
        assert_eq!(reg.language_for_extension("RS"), Some(Language::Rust));
        assert_eq!(reg.language_for_extension(".rs"), Some(Language::Rust));
    }

    #[test]
    fn ambiguous_h_resolves_to_c() {
        let reg = LanguageRegistry::new();
        assert_eq!(reg.language_for_extension("h"), Some(Language::C));
    }

    #[test]
    fn unrecognized_extension_is_none() {
        let reg = LanguageRegistry::new();
        assert_eq!(reg.language_for_extension("exe"), None);
    }
}
</content>
