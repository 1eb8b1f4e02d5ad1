//! Configuration for reasonable: seed the process environment from XDG `config.toml` and a
//! project `.env` (priority **existing env > .env > XDG**), then read typed
//! [`ReasonerSettings`] from that environment.

mod dotenv;
mod settings;
mod xdg_toml;

use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

pub use settings::{
    ReasonerSettings, ENV_BRANCH_FACTOR, ENV_MAX_DEPTH, ENV_MAX_STEPS, ENV_NUM_RUNS,
    ENV_STEP_DELAY_MS,
};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Seeds the process environment for `app_name` and returns the keys that were applied.
///
/// A key is only written when it is absent from the process environment. When absent, the
/// project `.env` (in `override_dir`, else the current directory) wins over the `[env]` table of
/// `$XDG_CONFIG_HOME/<app_name>/config.toml`.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: BTreeSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    let mut applied = Vec::new();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, v);
            applied.push(key.clone());
        }
    }

    Ok(applied)
}

/// [`load_and_apply`] followed by [`ReasonerSettings::from_env`].
pub fn load_settings(app_name: &str, override_dir: Option<&Path>) -> Result<ReasonerSettings, LoadError> {
    load_and_apply(app_name, override_dir)?;
    ReasonerSettings::from_env()
}

/// Serializes tests that mutate process-wide env vars such as `XDG_CONFIG_HOME`.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
