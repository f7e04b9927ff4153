// Configuration loader
// Loads ~/.testgen/config.toml (or an explicit path), then applies
// environment overrides

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from file and environment.
///
/// An explicit `path` must exist. The default path is optional: without it
/// the built-in defaults plus environment variables are used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            load_from_file(path)?
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Parse one TOML config file
pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Overlay environment variables on `config`.
///
/// `lookup` abstracts `std::env::var` so tests do not touch process state.
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(kind) = get("TESTGEN_PROVIDER") {
        config.provider.kind = kind
            .parse()
            .context("Invalid TESTGEN_PROVIDER environment variable")?;
    }

    let key_vars: &[&str] = match config.provider.kind {
        super::settings::ProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        super::settings::ProviderKind::Openai => &["OPENAI_API_KEY"],
    };
    if let Some(key) = key_vars.iter().find_map(|name| get(*name)) {
        config.provider.api_key = Some(key);
    }

    if let Some(model) = get("MODEL_NAME") {
        config.provider.model = Some(model);
    }
    if let Some(bind) = get("TESTGEN_BIND") {
        config.server.bind_address = bind;
    }

    Ok(config)
}
