use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env::VarError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

use crate::warn;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to read config \"{0}\": {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(
        #[from]
        #[source]
        toml::de::Error,
    ),
    #[error("the OpenAI API key is not defined, either add it to the config or define {0}")]
    MissingApiKey(&'static str),
    #[error("failed to parse {0}")]
    ApiKeyNotUnicode(&'static str),
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct OpenAI {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// A user-defined persona
#[derive(Deserialize, Serialize, Debug, Clone)]
pub(crate) struct Persona {
    pub name: Option<String>,
    pub instruction: String,
    pub greeting: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Keybindings {
    #[default]
    Emacs,
    Vi,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Config {
    /// The persona used when none is given on the command line
    pub persona: Option<String>,
    #[serde(default)]
    pub keybindings: Keybindings,
    #[serde(default)]
    pub openai: OpenAI,
    #[serde(default)]
    pub personas: BTreeMap<String, Persona>,
}

const OPENAI_ENV_KEY_VAR: &'static str = "OPENAI_API_KEY";

impl Config {
    /// Resolves the OpenAI API key, preferring the config over the environment.
    pub(crate) fn api_key(&self) -> Result<String, Error> {
        api_key_from(
            self.openai.api_key.as_deref(),
            std::env::var(OPENAI_ENV_KEY_VAR),
        )
    }
}

fn api_key_from(configured: Option<&str>, env: Result<String, VarError>) -> Result<String, Error> {
    if let Some(api_key) = configured {
        return Ok(api_key.to_string());
    }

    match env {
        Ok(api_key) if !api_key.is_empty() => Ok(api_key),
        Ok(_) | Err(VarError::NotPresent) => Err(Error::MissingApiKey(OPENAI_ENV_KEY_VAR)),
        Err(VarError::NotUnicode(_)) => Err(Error::ApiKeyNotUnicode(OPENAI_ENV_KEY_VAR)),
    }
}

fn config_path_in(home: Option<&Path>, system_config: &Path) -> Option<PathBuf> {
    if let Some(home) = home {
        const USER_PATHS: [&str; 2] = [".config/persona-chat/config.toml", ".persona-chat.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    if system_config.exists() {
        Some(system_config.to_path_buf())
    } else {
        None
    }
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);

    config_path_in(home.as_deref(), Path::new("/etc/persona-chat.toml"))
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a String>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        if let Some(config_value) = config.get(user_key) {
            match (user_value, config_value) {
                (toml::Value::Table(user_value), toml::Value::Table(config_value)) => {
                    extra_fields_helper(path, user_value, config_value, extra)
                }
                _ => {}
            }
        } else {
            let path: Vec<&str> = path.iter().map(|&s| s.as_str()).collect();

            extra.push(path.join("."));
        }

        path.pop();
    }
}

/// Lists the dotted paths of keys in `raw_config` which were not used to
/// build `config`.
fn extra_fields(config: &Config, raw_config: &str) -> Result<Vec<String>, Error> {
    let user_config: toml::Table = toml::de::from_str(raw_config)?;

    // A config which was just deserialized always serializes
    let config: toml::Table = match toml::ser::to_string(config) {
        Ok(serialized) => toml::de::from_str(&serialized)?,
        Err(_) => return Ok(Vec::new()),
    };

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &config, &mut extra);

    Ok(extra)
}

pub(crate) fn parse_config(raw_config: &str) -> Result<Config, Error> {
    let config: Config = toml::de::from_str(raw_config)?;

    for key in extra_fields(&config, raw_config)? {
        warn!("config contains extraneous key \"{}\", ignoring", key);
    }

    Ok(config)
}

/// Reads the config at `config`, or the first config found in the default
/// locations. If there is none, the default config is used.
pub(crate) fn read_config(config: Option<PathBuf>) -> Result<Config, Error> {
    let config_path = config.or_else(get_config_path);

    if let Some(path) = config_path {
        tracing::debug!(path = %path.display(), "reading config");

        let raw_config = std::fs::read_to_string(&path).map_err(|e| Error::Read(path, e))?;

        parse_config(&raw_config)
    } else {
        Ok(Config::default())
    }
}
