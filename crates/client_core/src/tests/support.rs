use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId},
    protocol::{AttachmentUpload, BillUpdate, CreatedBill},
};
use tokio::sync::Notify;

use crate::{
    error::StoreError,
    navigation::{Navigator, Route},
    session::{CurrentUser, StaticSession},
    store::RemoteBillStore,
};

pub(crate) const EMPLOYEE_EMAIL: &str = "employee@test.tld";

pub(crate) fn employee_session() -> Arc<StaticSession> {
    Arc::new(StaticSession::new(CurrentUser::employee(EMPLOYEE_EMAIL)))
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn on_navigate(&self, route: Route) {
        self.routes.lock().expect("navigator lock").push(route);
    }
}

/// Store whose answers are fixed up front; records every call.
pub(crate) struct ScriptedStore {
    created: CreatedBill,
    bills: Vec<Bill>,
    create_fails_with: Option<String>,
    update_fails_with: Option<String>,
    list_fails_with: Option<String>,
    create_gate: Option<Arc<Notify>>,
    creates: Mutex<Vec<AttachmentUpload>>,
    updates: Mutex<Vec<BillUpdate>>,
}

impl ScriptedStore {
    pub(crate) fn ok() -> Self {
        Self {
            created: CreatedBill {
                file_url: "https://localhost:3456/images/test.jpg".into(),
                key: BillId::new("1234"),
            },
            bills: Vec::new(),
            create_fails_with: None,
            update_fails_with: None,
            list_fails_with: None,
            create_gate: None,
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_bills(mut self, bills: Vec<Bill>) -> Self {
        self.bills = bills;
        self
    }

    pub(crate) fn failing_create(mut self, message: impl Into<String>) -> Self {
        self.create_fails_with = Some(message.into());
        self
    }

    pub(crate) fn failing_update(mut self, message: impl Into<String>) -> Self {
        self.update_fails_with = Some(message.into());
        self
    }

    pub(crate) fn failing_list(mut self, message: impl Into<String>) -> Self {
        self.list_fails_with = Some(message.into());
        self
    }

    /// `create` blocks until the returned gate is notified.
    pub(crate) fn gated_create(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.create_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(crate) fn created(&self) -> CreatedBill {
        self.created.clone()
    }

    pub(crate) fn creates(&self) -> Vec<AttachmentUpload> {
        self.creates.lock().expect("creates lock").clone()
    }

    pub(crate) fn updates(&self) -> Vec<BillUpdate> {
        self.updates.lock().expect("updates lock").clone()
    }
}

#[async_trait]
impl RemoteBillStore for ScriptedStore {
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError> {
        self.creates.lock().expect("creates lock").push(upload);
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        match &self.create_fails_with {
            Some(message) => Err(StoreError::Transport(message.clone())),
            None => Ok(self.created.clone()),
        }
    }

    async fn update(&self, update: BillUpdate) -> Result<Bill, StoreError> {
        let data = update.data.clone();
        let selector = update.selector.clone();
        self.updates.lock().expect("updates lock").push(update);
        if let Some(message) = &self.update_fails_with {
            return Err(StoreError::Transport(message.clone()));
        }
        let mut bill: Bill = serde_json::from_str(&data)?;
        bill.id = selector;
        Ok(bill)
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        match &self.list_fails_with {
            Some(message) => Err(StoreError::Transport(message.clone())),
            None => Ok(self.bills.clone()),
        }
    }
}
