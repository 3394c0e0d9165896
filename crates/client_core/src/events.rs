//! Structured notifications the presentation layer can subscribe to.

use shared::domain::BillId;

use crate::error::{PersistenceError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillEvent {
    AttachmentRejected(ValidationError),
    AttachmentUploaded {
        bill_id: BillId,
        file_url: String,
        file_name: String,
    },
    BillPersisted {
        bill_id: Option<BillId>,
    },
    PersistenceFailed(PersistenceError),
}
