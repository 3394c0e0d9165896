//! The remote bill store seam and an in-process implementation.

use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId},
    protocol::{AttachmentUpload, BillUpdate, CreatedBill},
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

#[async_trait]
pub trait RemoteBillStore: Send + Sync {
    /// Persists a receipt and the partial record that references it.
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError>;
    /// Replaces the record named by `update.selector` with `update.data`.
    async fn update(&self, update: BillUpdate) -> Result<Bill, StoreError>;
    async fn list(&self) -> Result<Vec<Bill>, StoreError>;
}

pub struct InMemoryBillStore {
    file_base_url: String,
    bills: RwLock<Vec<Bill>>,
}

impl InMemoryBillStore {
    pub fn new(file_base_url: impl Into<String>) -> Self {
        Self::with_bills(file_base_url, Vec::new())
    }

    pub fn with_bills(file_base_url: impl Into<String>, bills: Vec<Bill>) -> Self {
        Self {
            file_base_url: file_base_url.into().trim_end_matches('/').to_string(),
            bills: RwLock::new(bills),
        }
    }
}

#[async_trait]
impl RemoteBillStore for InMemoryBillStore {
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError> {
        let key = BillId::generate();
        let file_url = format!("{}/{}/{}", self.file_base_url, key, upload.file_name);
        debug!(bill_id = %key, size = upload.bytes.len(), "stored receipt");

        self.bills.write().await.push(Bill::attachment_only(
            key.clone(),
            upload.email,
            file_url.clone(),
            upload.file_name,
        ));

        Ok(CreatedBill { file_url, key })
    }

    async fn update(&self, update: BillUpdate) -> Result<Bill, StoreError> {
        let selector = update.selector.ok_or(StoreError::MissingSelector)?;
        let mut incoming: Bill = serde_json::from_str(&update.data)?;

        let mut bills = self.bills.write().await;
        let slot = bills
            .iter_mut()
            .find(|bill| bill.id.as_ref() == Some(&selector))
            .ok_or_else(|| StoreError::NotFound(selector.clone()))?;

        incoming.id = Some(selector);
        *slot = incoming.clone();
        Ok(incoming)
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.bills.read().await.clone())
    }
}
