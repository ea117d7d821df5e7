//! ASCII directory tree for the overview document.

use crate::config::GeneratorConfig;
use crate::gitignore::IgnoreMatcher;
use log::{debug, warn};
use std::fs;
use std::path::Path;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// A visible directory entry, kept only for the duration of one listing.
struct TreeNode {
    name: String,
    is_dir: bool,
}

pub struct TreeRenderer {
    matcher: IgnoreMatcher,
    skip_at_root: Vec<String>,
}

impl TreeRenderer {
    pub fn new(matcher: IgnoreMatcher, skip_at_root: Vec<String>) -> Self {
        Self {
            matcher,
            skip_at_root,
        }
    }

    /// Builds a renderer using the repository's ignore file (or the default
    /// patterns) and the configured root skip list.
    pub fn for_repository(repo_root: &Path, config: &GeneratorConfig) -> Self {
        let matcher = IgnoreMatcher::load(
            repo_root,
            &config.ignore_file,
            &config.default_ignore_patterns,
        );
        Self::new(matcher, config.skip_at_root.clone())
    }

    /// Renders entries below `repo_root`, `max_depth` levels deep. Entries
    /// keep the order the filesystem lists them in.
    pub fn render(&self, repo_root: &Path, max_depth: usize) -> String {
        let mut output = String::new();
        self.render_dir(repo_root, "", "", 0, max_depth, &mut output);
        output
    }

    fn render_dir(
        &self,
        dir: &Path,
        relative_dir: &str,
        prefix: &str,
        depth: usize,
        max_depth: usize,
        output: &mut String,
    ) {
        if depth >= max_depth {
            return;
        }

        let nodes = self.visible_entries(dir, relative_dir);
        let count = nodes.len();

        for (index, node) in nodes.into_iter().enumerate() {
            let is_last = index + 1 == count;

            output.push_str(prefix);
            output.push_str(if is_last { CORNER } else { BRANCH });
            output.push_str(&node.name);
            output.push('\n');

            if node.is_dir {
                let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
                let child_relative = join_relative(relative_dir, &node.name);
                self.render_dir(
                    &dir.join(&node.name),
                    &child_relative,
                    &child_prefix,
                    depth + 1,
                    max_depth,
                    output,
                );
            }
        }
    }

    fn visible_entries(&self, dir: &Path, relative_dir: &str) -> Vec<TreeNode> {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                warn!("Skipping unreadable directory {}: {err}", dir.display());
                return Vec::new();
            }
        };

        let at_root = relative_dir.is_empty();
        let mut nodes = Vec::new();

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping entry in {}: {err}", dir.display());
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();

            if name.starts_with('.') {
                continue;
            }

            if at_root && self.skip_at_root.iter().any(|skip| *skip == name) {
                debug!("Skipping root directory {name}");
                continue;
            }

            let relative = join_relative(relative_dir, &name);
            if let Some(pattern) = self.matcher.matching_pattern(&relative) {
                debug!("Ignored {relative} by pattern {}", pattern.as_str());
                continue;
            }

            // Symlinks are listed but never followed.
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            nodes.push(TreeNode { name, is_dir });
        }

        nodes
    }
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn renderer(patterns: &str, skip_at_root: &[&str]) -> TreeRenderer {
        TreeRenderer::new(
            IgnoreMatcher::parse(patterns),
            skip_at_root.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_single_chain_uses_corners_and_padding() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("app/Models")).unwrap();
        fs::write(temp_dir.path().join("app/Models/User.php"), "<?php").unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 4);
        assert_eq!(
            tree,
            "└── app\n    └── Models\n        └── User.php\n"
        );
    }

    #[test]
    fn test_non_last_sibling_extends_with_pipe() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("app")).unwrap();
        fs::create_dir_all(temp_dir.path().join("routes")).unwrap();
        fs::write(temp_dir.path().join("app/Kernel.php"), "<?php").unwrap();
        fs::write(temp_dir.path().join("routes/web.php"), "<?php").unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 4);
        let lines: Vec<_> = tree.lines().collect();
        assert_eq!(lines.len(), 4);

        // Whichever directory is listed first continues with a pipe.
        assert!(lines[0].starts_with(BRANCH));
        assert!(lines[1].starts_with("│   └── "));
        assert!(lines[2].starts_with(CORNER));
        assert!(lines[3].starts_with("    └── "));
    }

    #[test]
    fn test_depth_limit() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("src/nested")).unwrap();
        fs::write(temp_dir.path().join("src/lib.rs"), "").unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 1);
        assert_eq!(tree, "└── src\n");

        assert_eq!(renderer("", &[]).render(temp_dir.path(), 0), "");
    }

    #[test]
    fn test_hidden_entries_never_shown() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(".env"), "SECRET=1").unwrap();
        fs::create_dir_all(temp_dir.path().join(".github/workflows")).unwrap();
        fs::create_dir_all(temp_dir.path().join("src/.cache")).unwrap();
        fs::write(temp_dir.path().join("src/main.rs"), "").unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 4);
        assert!(!tree.contains(".env"));
        assert!(!tree.contains(".github"));
        assert!(!tree.contains(".cache"));
        assert!(tree.contains("main.rs"));
    }

    #[test]
    fn test_skip_list_only_applies_at_root() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("storage/logs")).unwrap();
        fs::create_dir_all(temp_dir.path().join("app/config")).unwrap();

        let tree = renderer("", &["storage", "config"]).render(temp_dir.path(), 4);
        assert!(!tree.contains("storage"));
        assert!(tree.contains("app"));
        assert!(tree.contains("config"));
    }

    #[test]
    fn test_ignore_patterns_use_paths_relative_to_root() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("vendor/laravel")).unwrap();
        fs::create_dir_all(temp_dir.path().join("app/build")).unwrap();
        fs::create_dir_all(temp_dir.path().join("build")).unwrap();
        fs::write(temp_dir.path().join("app/Kernel.php"), "").unwrap();

        let tree = renderer("vendor\n/build", &[]).render(temp_dir.path(), 4);
        assert!(!tree.contains("vendor"));
        assert!(!tree.contains("laravel"));
        assert!(tree.contains("Kernel.php"));
        // `/build` is anchored, so only the nested one remains.
        assert_eq!(tree.matches("build").count(), 1);
        assert!(tree.contains("    ├── build") || tree.contains("    └── build"));
    }

    #[test]
    fn test_empty_directory_contributes_no_lines() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("empty")).unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 4);
        assert_eq!(tree, "└── empty\n");
    }

    #[test]
    fn test_missing_root_renders_nothing() {
        let temp_dir = tempdir().unwrap();
        let tree = renderer("", &[]).render(&temp_dir.path().join("missing"), 4);
        assert!(tree.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("real")).unwrap();
        fs::write(temp_dir.path().join("real/inner.txt"), "").unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("real"), temp_dir.path().join("link"))
            .unwrap();

        let tree = renderer("", &[]).render(temp_dir.path(), 4);
        assert_eq!(tree.matches("inner.txt").count(), 1);
        assert!(tree.contains("link"));
    }

    #[test]
    fn test_for_repository_uses_config() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(temp_dir.path().join("public")).unwrap();
        fs::create_dir_all(temp_dir.path().join("app")).unwrap();

        let config = GeneratorConfig::default();
        let tree = TreeRenderer::for_repository(temp_dir.path(), &config)
            .render(temp_dir.path(), config.max_depth);
        assert_eq!(tree, "└── app\n");
    }
}
