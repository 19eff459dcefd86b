//! # Settings & Environments
//!
//! Resolves the values a run needs (service URL, credentials, image folder)
//! from layered sources:
//!
//! 1. built-in defaults
//! 2. `globals` in the settings file
//! 3. the selected named environment in the settings file
//! 4. `PETCHECK_<KEY>` process environment variables
//!
//! Later layers override earlier ones. Values may reference other keys with
//! `{{key}}` placeholders.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;
use crate::auth::Credentials;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "petcheck.json";

const ENV_PREFIX: &str = "PETCHECK_";

/// Placeholders nested deeper than this stay unresolved.
const MAX_INTERPOLATION_PASSES: usize = 8;

pub const KEY_BASE_URL: &str = "base_url";
pub const KEY_EMAIL: &str = "email";
pub const KEY_PASSWORD: &str = "password";
pub const KEY_INVALID_EMAIL: &str = "invalid_email";
pub const KEY_INVALID_PASSWORD: &str = "invalid_password";
pub const KEY_IMAGES_DIR: &str = "images_dir";
pub const KEY_TIMEOUT_SECS: &str = "timeout_secs";

pub const KNOWN_KEYS: [&str; 7] = [
    KEY_BASE_URL,
    KEY_EMAIL,
    KEY_PASSWORD,
    KEY_INVALID_EMAIL,
    KEY_INVALID_PASSWORD,
    KEY_IMAGES_DIR,
    KEY_TIMEOUT_SECS,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment `{0}` is not defined in the settings file")]
    UnknownEnvironment(String),

    #[error("`{key}` is not set (settings file or PETCHECK_{})", .key.to_uppercase())]
    Missing { key: &'static str },

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// A named set of variables (e.g. dev, staging, prod).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// On-disk settings: shared globals plus named environments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub globals: BTreeMap<String, String>,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Merge all layers into a flat map and interpolate placeholders.
    pub fn resolve(
        &self,
        environment: Option<&str>,
        process_env: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, ConfigError> {
        let mut resolved = defaults();

        for (key, value) in &self.globals {
            resolved.insert(key.clone(), value.clone());
        }

        if let Some(name) = environment {
            let env = self
                .environment(name)
                .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))?;
            for (key, value) in &env.variables {
                resolved.insert(key.clone(), value.clone());
            }
        }

        for key in KNOWN_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
            if let Some(value) = process_env.get(&var) {
                resolved.insert(key.to_string(), value.clone());
            }
        }

        for _ in 0..MAX_INTERPOLATION_PASSES {
            let snapshot = resolved.clone();
            let mut changed = false;
            for value in resolved.values_mut() {
                let next = interpolate(value, &snapshot);
                if next != *value {
                    *value = next;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Ok(resolved)
    }
}

/// Everything a run needs to reach and authenticate against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub credentials: Credentials,
    pub invalid_email: String,
    pub invalid_password: String,
    pub images_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub environment: Option<String>,
}

impl Settings {
    /// Load from `config` (or `petcheck.json` when present) and the process
    /// environment.
    pub fn load(config: Option<&Path>, environment: Option<&str>) -> Result<Self, ConfigError> {
        let file = match config {
            Some(path) => SettingsFile::load(path)?,
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.exists() {
                    SettingsFile::load(default_path)?
                } else {
                    SettingsFile::default()
                }
            }
        };

        let process_env: HashMap<String, String> = std::env::vars().collect();
        Self::from_sources(&file, environment, &process_env)
    }

    pub fn from_sources(
        file: &SettingsFile,
        environment: Option<&str>,
        process_env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let vars = file.resolve(environment, process_env)?;
        let mut settings = Self::from_variables(&vars)?;
        settings.environment = environment.map(str::to_string);
        Ok(settings)
    }

    pub fn from_variables(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let timeout = match optional(vars, KEY_TIMEOUT_SECS) {
            Some(raw) => Some(parse_timeout(raw.trim())?),
            None => None,
        };

        Ok(Self {
            base_url: required(vars, KEY_BASE_URL)?.trim().to_string(),
            credentials: Credentials::new(required(vars, KEY_EMAIL)?, required(vars, KEY_PASSWORD)?),
            invalid_email: required(vars, KEY_INVALID_EMAIL)?.to_string(),
            invalid_password: required(vars, KEY_INVALID_PASSWORD)?.to_string(),
            images_dir: PathBuf::from(required(vars, KEY_IMAGES_DIR)?.trim()),
            timeout,
            environment: None,
        })
    }

    /// Path of a fixture image inside the configured images directory.
    pub fn image(&self, file_name: &str) -> PathBuf {
        self.images_dir.join(file_name)
    }
}

/// Replace `{{key}}` placeholders with values from `variables`, scanning
/// left to right. Unknown placeholders are left untouched; substituted text
/// is not rescanned.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len + 2;
        result.push_str(&rest[..start]);
        match variables.get(&rest[start + 2..end - 2]) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }

    result.push_str(rest);
    result
}

fn defaults() -> HashMap<String, String> {
    HashMap::from([
        (KEY_BASE_URL.to_string(), DEFAULT_BASE_URL.to_string()),
        (KEY_INVALID_EMAIL.to_string(), "invalid@petcheck.invalid".to_string()),
        (KEY_INVALID_PASSWORD.to_string(), "not-the-password".to_string()),
        (KEY_IMAGES_DIR.to_string(), "images".to_string()),
    ])
}

/// Non-blank value for `key`, returned as written.
fn optional<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn required<'a>(vars: &'a HashMap<String, String>, key: &'static str) -> Result<&'a str, ConfigError> {
    optional(vars, key).ok_or(ConfigError::Missing { key })
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
        key: KEY_TIMEOUT_SECS,
        reason: format!("`{raw}` is not a whole number of seconds"),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: KEY_TIMEOUT_SECS,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn file_with_prod() -> SettingsFile {
        SettingsFile {
            globals: BTreeMap::from([
                ("email".to_string(), "global@example.com".to_string()),
                ("password".to_string(), "global-pass".to_string()),
            ]),
            environments: vec![Environment {
                name: "prod".into(),
                variables: BTreeMap::from([
                    ("email".to_string(), "prod@example.com".to_string()),
                    ("host".to_string(), "petfriends.skillfactory.ru".to_string()),
                    ("base_url".to_string(), "https://{{host}}/".to_string()),
                ]),
            }],
        }
    }

    #[test]
    fn defaults_fill_in_optional_keys() {
        let settings = Settings::from_sources(
            &SettingsFile::default(),
            None,
            &vars(&[("PETCHECK_EMAIL", "me@example.com"), ("PETCHECK_PASSWORD", "pw")]),
        )
        .unwrap();

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.images_dir, PathBuf::from("images"));
        assert_eq!(settings.invalid_email, "invalid@petcheck.invalid");
        assert!(settings.timeout.is_none());
        assert_eq!(settings.image("cat1.jpg"), PathBuf::from("images").join("cat1.jpg"));
    }

    #[test]
    fn environment_overrides_globals() {
        let settings = Settings::from_sources(&file_with_prod(), Some("prod"), &HashMap::new()).unwrap();
        assert_eq!(settings.credentials.email, "prod@example.com");
        assert_eq!(settings.credentials.password, "global-pass");
        assert_eq!(settings.base_url, "https://petfriends.skillfactory.ru/");
        assert_eq!(settings.environment.as_deref(), Some("prod"));
    }

    #[test]
    fn process_env_overrides_file() {
        let settings = Settings::from_sources(
            &file_with_prod(),
            Some("prod"),
            &vars(&[("PETCHECK_EMAIL", "ci@example.com"), ("PETCHECK_TIMEOUT_SECS", "15")]),
        )
        .unwrap();
        assert_eq!(settings.credentials.email, "ci@example.com");
        assert_eq!(settings.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = Settings::from_sources(&file_with_prod(), Some("staging"), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment(name) if name == "staging"));
    }

    #[test]
    fn missing_credentials_reported() {
        let err = Settings::from_sources(&SettingsFile::default(), None, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "email" }));
        assert_eq!(
            err.to_string(),
            "`email` is not set (settings file or PETCHECK_EMAIL)"
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = Settings::from_sources(
            &SettingsFile::default(),
            None,
            &vars(&[("PETCHECK_EMAIL", "me@example.com"), ("PETCHECK_PASSWORD", "  ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "password" }));
    }

    #[test]
    fn bad_timeout_rejected() {
        let base = [("PETCHECK_EMAIL", "a@b.c"), ("PETCHECK_PASSWORD", "pw")];
        for bad in ["soon", "0", "-3"] {
            let mut env = vars(&base);
            env.insert("PETCHECK_TIMEOUT_SECS".into(), bad.into());
            let err = Settings::from_sources(&SettingsFile::default(), None, &env).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "timeout_secs", .. }), "{bad}");
        }
    }

    #[test]
    fn settings_file_parses_json() {
        let raw = r#"{
            "globals": {"email": "me@example.com"},
            "environments": [{"name": "prod", "variables": {"password": "pw"}}]
        }"#;
        let file: SettingsFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.globals.get("email").unwrap(), "me@example.com");
        assert!(file.environment("prod").is_some());
        assert!(file.environment("dev").is_none());
    }

    #[test]
    fn settings_file_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petcheck.json");
        fs::write(&path, "{ not json").unwrap();

        let err = SettingsFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("petcheck.json"));
    }

    #[test]
    fn interpolate_replaces_placeholders() {
        let vars = vars(&[("host", "api.example.com"), ("port", "8080")]);
        let result = interpolate("https://{{host}}:{{port}}/api", &vars);
        assert_eq!(result, "https://api.example.com:8080/api");
    }

    #[test]
    fn interpolate_leaves_unknown_placeholders() {
        let result = interpolate("{{unknown}}", &HashMap::new());
        assert_eq!(result, "{{unknown}}");
        assert_eq!(interpolate("open {{ end", &HashMap::new()), "open {{ end");
    }

    #[test]
    fn nested_placeholders_resolve_the_same_every_time() {
        let file = SettingsFile {
            globals: BTreeMap::from([
                ("host".to_string(), "{{domain}}".to_string()),
                ("domain".to_string(), "petfriends.skillfactory.ru".to_string()),
                ("base_url".to_string(), "https://{{host}}/{{domain}}".to_string()),
            ]),
            environments: Vec::new(),
        };

        for _ in 0..50 {
            let resolved = file.resolve(None, &HashMap::new()).unwrap();
            assert_eq!(
                resolved["base_url"],
                "https://petfriends.skillfactory.ru/petfriends.skillfactory.ru"
            );
        }
    }

    #[test]
    fn cyclic_placeholders_stay_unresolved() {
        let file = SettingsFile {
            globals: BTreeMap::from([
                ("a".to_string(), "{{b}}".to_string()),
                ("b".to_string(), "{{a}}".to_string()),
            ]),
            environments: Vec::new(),
        };

        let resolved = file.resolve(None, &HashMap::new()).unwrap();
        assert_eq!(resolved["a"], "{{a}}");
        assert_eq!(resolved["b"], "{{b}}");
    }

    #[test]
    fn credentials_keep_surrounding_whitespace() {
        let settings = Settings::from_sources(
            &SettingsFile::default(),
            None,
            &vars(&[
                ("PETCHECK_EMAIL", " me@example.com"),
                ("PETCHECK_PASSWORD", "pass phrase "),
                ("PETCHECK_INVALID_PASSWORD", " nope "),
                ("PETCHECK_BASE_URL", " http://127.0.0.1:8080/ "),
                ("PETCHECK_TIMEOUT_SECS", " 5"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.credentials.email, " me@example.com");
        assert_eq!(settings.credentials.password, "pass phrase ");
        assert_eq!(settings.invalid_password, " nope ");
        assert_eq!(settings.base_url, "http://127.0.0.1:8080/");
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }
}
