use serde::{Deserialize, Serialize};

use crate::domain::BillId;

/// Receipt upload sent ahead of the form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub email: String,
}

impl AttachmentUpload {
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Store response to an attachment upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub file_url: String,
    pub key: BillId,
}

/// Full-record update; `data` is the serialized bill and `selector` the
/// identifier handed out by the upload, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillUpdate {
    pub data: String,
    pub selector: Option<BillId>,
}
