//! Receipt file-name validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMatch {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentCheck {
    pub ok: bool,
    pub file_name: String,
    pub extension: String,
}

impl AttachmentCheck {
    pub fn into_result(self) -> Result<Self, ValidationError> {
        if self.ok {
            Ok(self)
        } else {
            Err(ValidationError::UnsupportedExtension {
                file_name: self.file_name,
                extension: self.extension,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentValidator {
    matching: ExtensionMatch,
}

impl AttachmentValidator {
    pub fn new(matching: ExtensionMatch) -> Self {
        Self { matching }
    }

    /// `path` may be a bare name or a browser-style `C:\fakepath\x.jpg`.
    pub fn validate(&self, path: &str) -> AttachmentCheck {
        let file_name = path.rsplit(|c: char| c == '\\' || c == '/').next().unwrap_or(path);
        let extension = file_name.rsplit('.').next().unwrap_or(file_name);

        let ok = match self.matching {
            ExtensionMatch::CaseSensitive => ACCEPTED_EXTENSIONS.contains(&extension),
            ExtensionMatch::CaseInsensitive => ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(extension)),
        };

        AttachmentCheck {
            ok,
            file_name: file_name.to_string(),
            extension: extension.to_string(),
        }
    }
}
