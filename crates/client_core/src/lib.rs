//! Expense-bill submission and listing pipeline.
//!
//! [`NewBillController`] validates and uploads a receipt, then submits the
//! completed claim; [`BillListController`] fetches, orders and formats the
//! submitted claims. Both talk to the store through [`RemoteBillStore`] and
//! receive the signed-in user through [`SessionAccessor`].

pub mod attachment;
pub mod bill_list;
pub mod error;
pub mod events;
pub mod format;
pub mod http_store;
pub mod navigation;
pub mod new_bill;
pub mod session;
pub mod store;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use attachment::{AttachmentCheck, AttachmentValidator, ExtensionMatch};
pub use bill_list::{BillList, BillListController, BillRow, ListViewState, ReceiptPreview};
pub use error::{PersistenceError, RetrievalError, SessionError, StoreError, ValidationError};
pub use events::BillEvent;
pub use format::DateOrdering;
pub use http_store::HttpBillStore;
pub use navigation::{ChannelNavigator, Navigator, Route};
pub use new_bill::{
    AttachmentOutcome, AttachmentState, NewBillController, NewBillForm, SelectedFile,
    SubmitOutcome, UploadPolicy,
};
pub use session::{CurrentUser, PersistedSession, SessionAccessor, StaticSession};
pub use store::{InMemoryBillStore, RemoteBillStore};
