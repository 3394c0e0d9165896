use std::{
    fs,
    path::{Path, PathBuf},
};

use client_core::{DateOrdering, ExtensionMatch, UploadPolicy};
use serde::{de::DeserializeOwned, Deserialize};

pub const CONFIG_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_url: String,
    pub session_file: PathBuf,
    pub upload_policy: UploadPolicy,
    pub extension_match: ExtensionMatch,
    pub date_ordering: DateOrdering,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:5678".into(),
            session_file: PathBuf::from("./data/user.json"),
            upload_policy: UploadPolicy::RejectInvalid,
            extension_match: ExtensionMatch::CaseInsensitive,
            date_ordering: DateOrdering::Calendar,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    store_url: Option<String>,
    session_file: Option<PathBuf>,
    upload_policy: Option<UploadPolicy>,
    extension_match: Option<ExtensionMatch>,
    date_ordering: Option<DateOrdering>,
}

pub fn load_settings() -> Settings {
    load_settings_with(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// File values override defaults; environment values override the file.
pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.store_url {
                    settings.store_url = v;
                }
                if let Some(v) = file_cfg.session_file {
                    settings.session_file = v;
                }
                if let Some(v) = file_cfg.upload_policy {
                    settings.upload_policy = v;
                }
                if let Some(v) = file_cfg.extension_match {
                    settings.extension_match = v;
                }
                if let Some(v) = file_cfg.date_ordering {
                    settings.date_ordering = v;
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring unreadable config file");
            }
        }
    }

    for key in ["BILLED_STORE_URL", "APP__STORE_URL"] {
        if let Some(v) = env(key) {
            settings.store_url = v;
        }
    }
    if let Some(v) = env("BILLED_SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }
    if let Some(v) = env("BILLED_UPLOAD_POLICY").and_then(|v| parse_choice(&v)) {
        settings.upload_policy = v;
    }
    if let Some(v) = env("BILLED_EXTENSION_MATCH").and_then(|v| parse_choice(&v)) {
        settings.extension_match = v;
    }
    if let Some(v) = env("BILLED_DATE_ORDERING").and_then(|v| parse_choice(&v)) {
        settings.date_ordering = v;
    }

    settings
}

/// Parses a snake_case variant name such as `always_upload`.
fn parse_choice<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let deserializer =
        serde::de::value::StrDeserializer::<serde::de::value::Error>::new(raw.trim());
    match T::deserialize(deserializer) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(value = raw, %error, "ignoring unknown setting value");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
