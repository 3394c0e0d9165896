//! `RemoteBillStore` over the bills REST API.

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{Bill, BillId},
    error::ApiError,
    protocol::{AttachmentUpload, BillUpdate, CreatedBill},
};
use tracing::debug;
use url::Url;

use crate::{error::StoreError, store::RemoteBillStore};

pub struct HttpBillStore {
    http: Client,
    base_url: Url,
}

impl HttpBillStore {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::with_client(Client::new(), Url::parse(base_url)?))
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn bills_url(&self, id: Option<&BillId>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::Transport(format!("store url '{}' cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty().push("bills");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }
}

/// Turns non-success statuses into `StoreError::Status`, preferring the
/// message of a JSON `ApiError` body.
async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ApiError>(&body)
        .map(|api_error| api_error.message)
        .unwrap_or(body);
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteBillStore for HttpBillStore {
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError> {
        let url = self.bills_url(None)?;
        let mime_type = upload.mime_type_or_default().to_string();
        debug!(%url, file_name = %upload.file_name, "POST receipt");

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&mime_type)?;
        let form = Form::new().part("file", part).text("email", upload.email);

        let response = self.http.post(url).multipart(form).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update(&self, update: BillUpdate) -> Result<Bill, StoreError> {
        let selector = update.selector.ok_or(StoreError::MissingSelector)?;
        let url = self.bills_url(Some(&selector))?;

        debug!(%url, "PATCH bill");
        let response = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, "application/json")
            .body(update.data)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        let url = self.bills_url(None)?;
        debug!(%url, "GET bills");
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/http_store_tests.rs"]
mod tests;
