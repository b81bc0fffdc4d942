//! `formkit.toml`, the server configuration file.
//!
//! # Example
//!
//! ```toml
//! [server]
//! port = 8080
//! body_limit = 1048576
//! api_key = "change-me"
//!
//! [forms]
//! paths = ["forms", "extra/travel_claim.json"]
//! ```
//!
//! `FORMKIT_API_KEY` in the environment overrides `server.api_key`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormkitConfig {
    pub server: ServerConfig,
    pub forms: FormsConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: Option<u16>,
    /// Maximum request body size in bytes.
    pub body_limit: Option<usize>,
    pub api_key: Option<String>,
}

/// `[forms]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsConfig {
    /// Definition files, or directories whose `*.json` files are all loaded.
    /// Relative paths resolve against the config file's directory.
    pub paths: Vec<PathBuf>,
}

/// Read and parse a config file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_formkit_config(path: &Path) -> Result<FormkitConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    let mut config: FormkitConfig = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;

    if let Some(base) = path.parent() {
        for p in &mut config.forms.paths {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
    Ok(config)
}

/// Expand files and directories into a sorted, de-duplicated list of
/// definition files.
pub fn collect_definition_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .map_err(|e| format!("could not read directory '{}': {}", path.display(), e))?;
            for entry in entries {
                let entry = entry.map_err(|e| e.to_string())?;
                let p = entry.path();
                if p.extension().map_or(false, |e| e == "json") {
                    files.push(p);
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
