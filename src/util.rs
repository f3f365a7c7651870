use std::io::Write;
use std::path::Path;

/// Case-insensitive substring match used by every list filter.
///
/// Example: contains_ci("Acme Holdings", "acme") → true
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Normalize a search term before matching: trim and lowercase.
pub fn normalize_search(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Write a string to `path` atomically: temp file in the same directory,
/// then rename over the target.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "orgdesk".to_string())
    ));

    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ci_mixed_case() {
        assert!(contains_ci("Acme Holdings", "aCmE"));
        assert!(contains_ci("acme", "ACME"));
    }

    #[test]
    fn test_contains_ci_empty_needle_matches_everything() {
        assert!(contains_ci("anything", ""));
        assert!(contains_ci("", ""));
    }

    #[test]
    fn test_contains_ci_miss() {
        assert!(!contains_ci("Acme", "globex"));
    }

    #[test]
    fn test_normalize_search_trims_and_lowercases() {
        assert_eq!(normalize_search("  Acme "), "acme");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        atomic_write_str(&path, "first").unwrap();
        atomic_write_str(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
