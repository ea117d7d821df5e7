use anyhow::{Context, Result};
use content_inspector::{ContentType, inspect};
use log::debug;
use memmap2::MmapOptions;
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

/// Case-insensitive extension check. `extensions` are given without dots.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Reads a text file through a memory map.
///
/// Returns `Ok(None)` when the content looks binary. Invalid UTF-8 is decoded
/// lossily rather than rejected.
pub fn read_text_file(path: &Path) -> Result<Option<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .len();
    if len == 0 {
        return Ok(Some(String::new()));
    }

    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .with_context(|| format!("Failed to mmap file: {}", path.display()))?
    };

    let sample_size = std::cmp::min(8192, mmap.len());
    if inspect(&mmap[..sample_size]) == ContentType::BINARY {
        debug!("Binary content in {}, skipping", path.display());
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&mmap).into_owned()))
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keeps at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_has_extension_ignores_case() {
        let exts = vec!["php".to_string()];
        assert!(has_extension(&PathBuf::from("tests/UserTest.php"), &exts));
        assert!(has_extension(&PathBuf::from("tests/UserTest.PHP"), &exts));
        assert!(!has_extension(&PathBuf::from("tests/user.test.js"), &exts));
        assert!(!has_extension(&PathBuf::from("tests/README"), &exts));
    }

    #[test]
    fn test_read_text_file() {
        let temp_dir = tempdir().unwrap();
        let text = temp_dir.path().join("a.php");
        let empty = temp_dir.path().join("b.php");
        let binary = temp_dir.path().join("c.php");
        std::fs::write(&text, "<?php echo 'hi';").unwrap();
        std::fs::write(&empty, "").unwrap();
        std::fs::write(&binary, [0x00, 0x01, 0xFF, 0xFE, 0x00]).unwrap();

        assert_eq!(
            read_text_file(&text).unwrap().as_deref(),
            Some("<?php echo 'hi';")
        );
        assert_eq!(read_text_file(&empty).unwrap().as_deref(), Some(""));
        assert_eq!(read_text_file(&binary).unwrap(), None);
        assert!(read_text_file(&temp_dir.path().join("missing.php")).is_err());
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("can create a user"), "Can create a user");
        assert_eq!(capitalize_first("Already"), "Already");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("äöü", 2), "äö");
    }
}
