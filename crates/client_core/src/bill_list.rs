//! Retrieval and display preparation of submitted bills.

use std::sync::Arc;

use shared::domain::{Bill, BillId, BillStatus};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    error::RetrievalError,
    format::{format_date, sort_newest_first, DateOrdering},
    navigation::{Navigator, Route},
    session::SessionAccessor,
    store::RemoteBillStore,
};

/// One line of the bill list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRow {
    pub id: Option<BillId>,
    pub expense_type: String,
    pub name: String,
    /// Display date, or the stored text when it does not parse.
    pub date: String,
    pub raw_date: String,
    pub amount: Option<i64>,
    pub status: BillStatus,
    pub status_label: &'static str,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

impl BillRow {
    fn from_bill(bill: Bill) -> Self {
        let date = format_date(&bill.date).unwrap_or_else(|| {
            warn!(bill_id = ?bill.id, date = %bill.date, "unparsable bill date; showing it as stored");
            bill.date.clone()
        });

        Self {
            id: bill.id,
            expense_type: bill.expense_type,
            name: bill.name,
            date,
            raw_date: bill.date,
            amount: bill.amount,
            status: bill.status,
            status_label: bill.status.label(),
            file_url: bill.file_url,
            file_name: bill.file_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPreview {
    pub file_url: String,
    pub file_name: Option<String>,
}

/// Bills ordered most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillList {
    rows: Vec<BillRow>,
}

impl BillList {
    pub fn iter(&self) -> std::slice::Iter<'_, BillRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for BillList {
    type Item = BillRow;
    type IntoIter = std::vec::IntoIter<BillRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a BillList {
    type Item = &'a BillRow;
    type IntoIter = std::slice::Iter<'a, BillRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListViewState {
    #[default]
    Idle,
    Loading,
    Loaded(BillList),
    Failed(RetrievalError),
}

impl ListViewState {
    /// Plain-text rendition of the view; a failure replaces the whole list.
    pub fn render_text(&self) -> String {
        match self {
            ListViewState::Idle => String::new(),
            ListViewState::Loading => "Chargement...".to_string(),
            ListViewState::Loaded(list) if list.is_empty() => "Aucune note de frais".to_string(),
            ListViewState::Loaded(list) => list
                .iter()
                .map(|row| {
                    let amount = row
                        .amount
                        .map(|amount| format!("{amount} €"))
                        .unwrap_or_else(|| "NaN".to_string());
                    format!(
                        "{}\t{}\t{}\t{}\t{}",
                        row.expense_type, row.name, row.date, amount, row.status_label
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            ListViewState::Failed(err) => err.render(),
        }
    }
}

pub struct BillListController {
    session: Arc<dyn SessionAccessor>,
    store: Option<Arc<dyn RemoteBillStore>>,
    navigator: Arc<dyn Navigator>,
    ordering: DateOrdering,
    state: RwLock<ListViewState>,
}

impl BillListController {
    pub fn new(
        session: Arc<dyn SessionAccessor>,
        store: Option<Arc<dyn RemoteBillStore>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            store,
            navigator,
            ordering: DateOrdering::default(),
            state: RwLock::new(ListViewState::Idle),
        }
    }

    pub fn with_ordering(mut self, ordering: DateOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub async fn state(&self) -> ListViewState {
        self.state.read().await.clone()
    }

    pub async fn render(&self) -> String {
        self.state.read().await.render_text()
    }

    pub async fn load(&self) -> Result<BillList, RetrievalError> {
        *self.state.write().await = ListViewState::Loading;

        let result = self.fetch().await;
        *self.state.write().await = match &result {
            Ok(list) => ListViewState::Loaded(list.clone()),
            Err(err) => ListViewState::Failed(err.clone()),
        };
        result
    }

    async fn fetch(&self) -> Result<BillList, RetrievalError> {
        let user = self.session.current_user()?;
        let Some(store) = &self.store else {
            debug!("no bill store configured; showing an empty list");
            return Ok(BillList::default());
        };

        let mut bills = store.list().await.map_err(|err| {
            let err = RetrievalError::classify(err.to_string());
            warn!(email = %user.email, error = %err, "failed to fetch bills");
            err
        })?;

        sort_newest_first(&mut bills, self.ordering);
        let rows: Vec<BillRow> = bills.into_iter().map(BillRow::from_bill).collect();
        info!(email = %user.email, count = rows.len(), "loaded bills");

        Ok(BillList { rows })
    }

    /// Surfaces the stored receipt URL; nothing is fetched or checked.
    pub fn preview(&self, row: &BillRow) -> Option<ReceiptPreview> {
        row.file_url.as_ref().map(|file_url| ReceiptPreview {
            file_url: file_url.clone(),
            file_name: row.file_name.clone(),
        })
    }

    pub fn on_new_bill_clicked(&self) {
        self.navigator.on_navigate(Route::NewBill);
    }
}

#[cfg(test)]
#[path = "tests/bill_list_tests.rs"]
mod tests;
