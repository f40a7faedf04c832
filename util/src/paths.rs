use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Turn a free-form label ("Excel Submission", "Criteria 1/2") into a safe file stem.
pub fn sanitize_file_stem(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_base() {
        let base = Path::new("/course/bmi");
        assert_eq!(
            resolve_against(base, Path::new("answer_key")),
            PathBuf::from("/course/bmi/answer_key")
        );
        assert_eq!(
            resolve_against(base, Path::new("/srv/key")),
            PathBuf::from("/srv/key")
        );
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_file_stem("Criteria 1/2"), "Criteria 1_2");
        assert_eq!(sanitize_file_stem("  "), "unnamed");
        assert_eq!(sanitize_file_stem("Python Submission"), "Python Submission");
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        let created = ensure_dir(&nested).unwrap();
        assert!(created.is_dir());

        let file = tmp.path().join("x/y/report.json");
        ensure_parent_dir(&file).unwrap();
        assert!(file.parent().unwrap().is_dir());
    }
}
