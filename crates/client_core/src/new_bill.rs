//! Receipt selection and expense-claim submission.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Bill, BillId, BillStatus, DEFAULT_PCT},
    protocol::{AttachmentUpload, BillUpdate, CreatedBill},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    attachment::AttachmentValidator,
    error::{PersistenceError, SessionError, ValidationError},
    events::BillEvent,
    format::parse_int_prefix,
    navigation::{Navigator, Route},
    session::SessionAccessor,
    store::RemoteBillStore,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What to do with a receipt whose extension is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPolicy {
    /// Show the format error and stop.
    #[default]
    RejectInvalid,
    /// Show the format error but upload anyway.
    AlwaysUpload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// As reported by the file picker; may include directories.
    pub path: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Raw values of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

impl NewBillForm {
    pub fn to_draft(&self, email: impl Into<String>, attachment: &AttachmentState) -> Bill {
        Bill {
            id: None,
            email: email.into(),
            expense_type: self.expense_type.clone(),
            name: self.name.clone(),
            amount: parse_int_prefix(&self.amount),
            date: self.date.clone(),
            vat: self.vat.clone(),
            pct: parse_int_prefix(&self.pct)
                .filter(|pct| *pct != 0)
                .unwrap_or(DEFAULT_PCT),
            commentary: self.commentary.clone(),
            file_url: attachment.file_url.clone(),
            file_name: attachment.file_name.clone(),
            status: BillStatus::Pending,
            comment_admin: None,
        }
    }
}

/// Reference to the uploaded receipt; all `None` until an upload succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentState {
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub bill_id: Option<BillId>,
}

#[derive(Debug, Default)]
struct FormView {
    format_error_visible: bool,
    selected_file: Option<String>,
}

#[derive(Debug)]
pub struct AttachmentOutcome {
    pub rejection: Option<ValidationError>,
    pub upload: Option<JoinHandle<Result<CreatedBill, PersistenceError>>>,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub draft: Bill,
    /// `None` when no store is configured.
    pub persistence: Option<JoinHandle<Result<Bill, PersistenceError>>>,
}

pub struct NewBillController {
    session: Arc<dyn SessionAccessor>,
    store: Option<Arc<dyn RemoteBillStore>>,
    navigator: Arc<dyn Navigator>,
    validator: AttachmentValidator,
    upload_policy: UploadPolicy,
    attachment: Arc<Mutex<AttachmentState>>,
    view: Mutex<FormView>,
    events: broadcast::Sender<BillEvent>,
}

impl NewBillController {
    pub fn new(
        session: Arc<dyn SessionAccessor>,
        store: Option<Arc<dyn RemoteBillStore>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session,
            store,
            navigator,
            validator: AttachmentValidator::default(),
            upload_policy: UploadPolicy::default(),
            attachment: Arc::new(Mutex::new(AttachmentState::default())),
            view: Mutex::new(FormView::default()),
            events,
        }
    }

    pub fn with_validator(mut self, validator: AttachmentValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BillEvent> {
        self.events.subscribe()
    }

    pub async fn attachment(&self) -> AttachmentState {
        self.attachment.lock().await.clone()
    }

    pub async fn format_error_visible(&self) -> bool {
        self.view.lock().await.format_error_visible
    }

    pub async fn selected_file(&self) -> Option<String> {
        self.view.lock().await.selected_file.clone()
    }

    /// Validates the receipt and, when allowed, starts uploading it.
    ///
    /// The upload runs on its own task; attachment state is only written once
    /// the store answers, so a submit racing the upload sees `None` fields.
    pub async fn on_attachment_selected(
        &self,
        file: SelectedFile,
    ) -> Result<AttachmentOutcome, SessionError> {
        let check = self.validator.validate(&file.path);
        let file_name = check.file_name.clone();
        let rejection = check.into_result().err();

        {
            let mut view = self.view.lock().await;
            view.format_error_visible = rejection.is_some();
            view.selected_file = match &rejection {
                None => Some(file_name.clone()),
                Some(_) => None,
            };
        }

        if let Some(rejection) = &rejection {
            warn!(file_name = %file_name, error = %rejection, "receipt rejected");
            let _ = self
                .events
                .send(BillEvent::AttachmentRejected(rejection.clone()));
        }

        if rejection.is_some() && self.upload_policy == UploadPolicy::RejectInvalid {
            return Ok(AttachmentOutcome {
                rejection,
                upload: None,
            });
        }

        let email = self.session.current_user()?.email;
        let Some(store) = self.store.clone() else {
            warn!(file_name = %file_name, "no bill store configured; receipt not uploaded");
            return Ok(AttachmentOutcome {
                rejection,
                upload: None,
            });
        };

        let upload = AttachmentUpload {
            file_name: file_name.clone(),
            mime_type: file.mime_type,
            bytes: file.bytes,
            email,
        };
        let attachment = Arc::clone(&self.attachment);
        let events = self.events.clone();

        debug!(file_name = %file_name, size = upload.bytes.len(), "uploading receipt");
        let handle = tokio::spawn(async move {
            match store.create(upload).await {
                Ok(created) => {
                    {
                        let mut state = attachment.lock().await;
                        state.bill_id = Some(created.key.clone());
                        state.file_url = Some(created.file_url.clone());
                        state.file_name = Some(file_name.clone());
                    }
                    info!(bill_id = %created.key, file_url = %created.file_url, "receipt uploaded");
                    let _ = events.send(BillEvent::AttachmentUploaded {
                        bill_id: created.key.clone(),
                        file_url: created.file_url.clone(),
                        file_name,
                    });
                    Ok(created)
                }
                Err(err) => {
                    let err = PersistenceError::Upload(err.to_string());
                    error!(error = %err, "receipt upload failed");
                    let _ = events.send(BillEvent::PersistenceFailed(err.clone()));
                    Err(err)
                }
            }
        });

        Ok(AttachmentOutcome {
            rejection,
            upload: Some(handle),
        })
    }

    /// Assembles the draft, hands it to the store and navigates to the bill
    /// list without waiting for the store. A successful update navigates
    /// there a second time.
    pub async fn on_submit(&self, form: &NewBillForm) -> Result<SubmitOutcome, SessionError> {
        let user = self.session.current_user()?;
        let attachment = self.attachment.lock().await.clone();
        let draft = form.to_draft(user.email, &attachment);

        let persistence = self.update_bill(&draft, attachment.bill_id);
        self.navigator.on_navigate(Route::Bills);

        Ok(SubmitOutcome { draft, persistence })
    }

    fn update_bill(
        &self,
        bill: &Bill,
        selector: Option<BillId>,
    ) -> Option<JoinHandle<Result<Bill, PersistenceError>>> {
        let Some(store) = self.store.clone() else {
            debug!("no bill store configured; draft not persisted");
            return None;
        };

        let data = match serde_json::to_string(bill) {
            Ok(data) => data,
            Err(err) => {
                let err = PersistenceError::Update(err.to_string());
                error!(error = %err, "failed to serialize bill draft");
                let _ = self.events.send(BillEvent::PersistenceFailed(err));
                return None;
            }
        };

        let navigator = Arc::clone(&self.navigator);
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            match store
                .update(BillUpdate {
                    data,
                    selector: selector.clone(),
                })
                .await
            {
                Ok(saved) => {
                    info!(bill_id = ?saved.id, "bill persisted");
                    let _ = events.send(BillEvent::BillPersisted {
                        bill_id: saved.id.clone().or(selector),
                    });
                    navigator.on_navigate(Route::Bills);
                    Ok(saved)
                }
                Err(err) => {
                    let err = PersistenceError::Update(err.to_string());
                    error!(error = %err, "bill update failed");
                    let _ = events.send(BillEvent::PersistenceFailed(err.clone()));
                    Err(err)
                }
            }
        }))
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
