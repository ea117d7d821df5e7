use crate::utils::has_extension;
use ignore::WalkBuilder;
use log::warn;
use std::path::{Path, PathBuf};

/// Collects every file below `root` whose extension is in `extensions`.
///
/// Unlike the directory tree, this walk applies no ignore rules and includes
/// hidden entries. Files come back in the order the walker visits them.
pub fn collect_source_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false).follow_links(false);

    let mut files = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                if is_file && has_extension(entry.path(), extensions) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collects_nested_and_hidden_files() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Api/V1")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("UserTest.php"), "").unwrap();
        fs::write(root.join("Api/V1/TokenTest.php"), "").unwrap();
        fs::write(root.join(".hidden/SecretTest.php"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = collect_source_files(root, &["php".to_string()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(files.len(), 3);
        assert!(names.contains(&"UserTest.php".to_string()));
        assert!(names.contains(&"TokenTest.php".to_string()));
        assert!(names.contains(&"SecretTest.php".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_gitignore_is_not_applied() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "IgnoredTest.php\n").unwrap();
        fs::write(root.join("IgnoredTest.php"), "").unwrap();

        let files = collect_source_files(root, &["php".to_string()]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = tempdir().unwrap();
        let files = collect_source_files(&temp_dir.path().join("nope"), &["php".to_string()]);
        assert!(files.is_empty());
    }
}
