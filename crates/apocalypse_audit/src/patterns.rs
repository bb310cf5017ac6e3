//! Legacy-multimedia file name patterns.

/// Extensions of Flash authoring, video and player files.
pub const FLASH_EXTENSIONS: &[&str] = &["fla", "flv", "swf"];

/// A context holding a file with exactly this name ships an HTML5 fallback.
pub const HTML5_FALLBACK_FILENAME: &str = "index_lms_html5.html";

/// File-store component of the course-level legacy file area.
pub const LEGACY_COMPONENT: &str = "course";

/// Case-insensitive file-name suffix patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatterns {
    extensions: Vec<String>,
}

impl FilePatterns {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// The `.fla`, `.flv` and `.swf` patterns.
    pub fn flash() -> Self {
        Self::new(FLASH_EXTENSIONS)
    }

    /// SQL `LIKE` patterns to compare against a lower-cased file name.
    pub fn like_patterns(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| format!("%.{}", escape_like(ext)))
            .collect()
    }

    /// In-memory equivalent of [`like_patterns`](Self::like_patterns).
    pub fn matches(&self, filename: &str) -> bool {
        let lower = filename.to_ascii_lowercase();
        self.extensions.iter().any(|ext| {
            lower
                .strip_suffix(ext.as_str())
                .map_or(false, |stem| stem.ends_with('.'))
        })
    }
}

impl Default for FilePatterns {
    fn default() -> Self {
        Self::flash()
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_like_patterns() {
        assert_eq!(
            FilePatterns::flash().like_patterns(),
            vec!["%.fla", "%.flv", "%.swf"]
        );
    }

    #[test]
    fn matching_ignores_case() {
        let patterns = FilePatterns::flash();
        assert!(patterns.matches("intro.swf"));
        assert!(patterns.matches("LECTURE.FLV"));
        assert!(patterns.matches("a.b.Fla"));
        assert!(!patterns.matches("swf"));
        assert!(!patterns.matches("notes.swf.txt"));
        assert!(!patterns.matches("index_lms_html5.html"));
    }

    #[test]
    fn extensions_are_normalized() {
        let patterns = FilePatterns::new([".SWF", "", "f_v"]);
        assert_eq!(
            patterns,
            FilePatterns {
                extensions: vec!["swf".to_string(), "f_v".to_string()],
            }
        );
        assert_eq!(patterns.like_patterns(), vec!["%.swf", "%.f\\_v"]);
    }
}
