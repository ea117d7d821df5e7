//! Manifest-derived project facts: tech stack and route entry points.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "composer.json";
pub const NO_MANIFEST: &str = "No composer.json found";

const KEY_DEPENDENCIES: &[&str] = &["livewire/livewire", "livewire/flux", "livewire/flux-pro"];
const ENTRY_POINTS: &[&str] = &["routes/web.php", "routes/api.php"];

static LANDO_PHP_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"php:\s*['"]?(\d+\.\d+)['"]?"#).expect("valid regex"));

/// Comma-separated stack summary, e.g. `Laravel 12, PHP 8.4, livewire`.
pub fn detect_tech_stack(repo_root: &Path) -> String {
    let manifest = match fs::read_to_string(repo_root.join(MANIFEST_FILE)) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            debug!("Unparsable {MANIFEST_FILE}: {err}");
            Value::Null
        }),
        Err(_) => return NO_MANIFEST.to_string(),
    };

    let require = |name: &str| manifest["require"][name].as_str();
    let mut stack = Vec::new();

    if let Some(version) = require("laravel/framework") {
        let version = version.replace('^', "");
        let major = version.split('.').next().unwrap_or_default();
        stack.push(format!("Laravel {major}"));
    }

    match fs::read_to_string(repo_root.join(".lando.yml")) {
        Ok(lando) => {
            if let Some(caps) = LANDO_PHP_VERSION.captures(&lando) {
                stack.push(format!("PHP {}", &caps[1]));
            }
        }
        Err(_) => {
            if let Some(php) = require("php") {
                stack.push(format!("PHP {}", php.replace('^', "")));
            }
        }
    }

    for dep in KEY_DEPENDENCIES.iter().copied() {
        if require(dep).is_some() {
            let basename = dep.rsplit('/').next().unwrap_or(dep);
            stack.push(basename.to_string());
        }
    }

    stack.join(", ")
}

/// Route files present in the repository, relative to its root.
pub fn detect_entry_points(repo_root: &Path) -> Vec<String> {
    ENTRY_POINTS
        .iter()
        .filter(|route| repo_root.join(route).is_file())
        .map(|route| route.to_string())
        .collect()
}
