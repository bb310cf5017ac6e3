//! Category path resolution.

use std::collections::HashMap;

const SEPARATOR: &str = " / ";

/// Resolve a `/`-delimited chain of category ids into `"Parent / Child"`.
///
/// Empty segments and ids with no known name are skipped, so `"5/99"` with
/// only 5 known resolves to the name of 5 alone.
pub fn resolve_category_path(path: &str, names: &HashMap<i64, String>) -> String {
    path.split('/')
        .filter_map(|segment| segment.trim().parse::<i64>().ok())
        .filter_map(|id| names.get(&id))
        .filter(|name| !name.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> HashMap<i64, String> {
        HashMap::from([(5, "Science".to_string()), (12, "Physics".to_string())])
    }

    #[test]
    fn resolves_nested_path() {
        assert_eq!(resolve_category_path("5/12", &names()), "Science / Physics");
        assert_eq!(resolve_category_path("/5/12", &names()), "Science / Physics");
    }

    #[test]
    fn skips_unknown_ids() {
        assert_eq!(resolve_category_path("5/99", &names()), "Science");
        assert_eq!(resolve_category_path("/99/", &names()), "");
    }

    #[test]
    fn empty_path_is_empty() {
        assert_eq!(resolve_category_path("", &names()), "");
        assert_eq!(resolve_category_path("//", &names()), "");
    }

    #[test]
    fn non_numeric_segments_are_ignored() {
        assert_eq!(resolve_category_path("x/12", &names()), "Physics");
    }
}
