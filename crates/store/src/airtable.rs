use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sharenote_kernel::settings::StoreSettings;

use crate::error::StoreError;
use crate::record::{Fields, ListQuery, Record};
use crate::RecordStore;

/// Airtable REST implementation of [`RecordStore`].
///
/// Credentials are captured at construction and reused for every call.
pub struct AirtableStore {
    http: reqwest::Client,
    table_url: Url,
    api_key: String,
}

#[derive(Deserialize)]
struct RecordPage {
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Serialize)]
struct WriteBatch<'a> {
    records: [WriteRecord<'a>; 1],
}

#[derive(Serialize)]
struct WriteRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    fields: &'a Fields,
}

#[derive(Deserialize)]
struct Deleted {
    id: String,
    deleted: bool,
}

impl AirtableStore {
    pub fn new(api_url: &str, api_key: &str, base_id: &str, table: &str) -> Result<Self, StoreError> {
        let mut table_url = Url::parse(api_url)
            .map_err(|e| StoreError::InvalidConfig(format!("api url '{api_url}': {e}")))?;
        table_url
            .path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig(format!("api url '{api_url}' cannot be a base")))?
            .pop_if_empty()
            .push(base_id)
            .push(table);

        Ok(Self {
            http: reqwest::Client::new(),
            table_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        Self::new(
            &settings.api_url,
            &settings.api_key,
            &settings.base_id,
            &settings.table,
        )
    }

    /// The endpoint every call is addressed to.
    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.api_key)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let payload = serde_json::from_slice(&body).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
            });
            tracing::debug!(
                operation,
                status = status.as_u16(),
                %payload,
                "record store rejected request"
            );
            return Err(StoreError::Api {
                status: status.as_u16(),
                payload,
            });
        }

        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(format!("{operation}: {e}")))
    }

    async fn write_one(
        &self,
        method: Method,
        id: Option<&str>,
        fields: &Fields,
        operation: &'static str,
    ) -> Result<Record, StoreError> {
        let batch = WriteBatch {
            records: [WriteRecord { id, fields }],
        };
        let request = self.request(method, self.table_url.clone()).json(&batch);
        let page: RecordPage = self.send(request, operation).await?;

        page.records
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyResponse(operation))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, StoreError> {
        let mut url = self.table_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(filter) = &query.filter {
                pairs.append_pair("filterByFormula", &filter.to_formula());
            }
            if let Some(max_records) = query.max_records {
                pairs.append_pair("maxRecords", &max_records.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        tracing::debug!(filter = ?query.filter.as_ref().map(|f| f.to_formula()), "listing records");
        let page: RecordPage = self.send(self.request(Method::GET, url), "list").await?;

        if page.offset.is_some() {
            tracing::debug!(
                returned = page.records.len(),
                "more records exist past the first page; ignoring them"
            );
        }

        Ok(page.records)
    }

    async fn create(&self, fields: &Fields) -> Result<Record, StoreError> {
        let record = self.write_one(Method::POST, None, fields, "create").await?;
        tracing::debug!(id = %record.id, "record created");
        Ok(record)
    }

    async fn update(&self, id: &str, fields: &Fields) -> Result<Record, StoreError> {
        let record = self.write_one(Method::PATCH, Some(id), fields, "update").await?;
        tracing::debug!(id = %record.id, "record updated");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig(format!("table url '{}' cannot be a base", self.table_url)))?
            .push(id);

        let deleted: Deleted = self.send(self.request(Method::DELETE, url), "delete").await?;
        if !deleted.deleted || deleted.id != id {
            return Err(StoreError::Decode(format!(
                "delete: store did not confirm removal of '{id}'"
            )));
        }

        tracing::debug!(id, "record deleted");
        Ok(())
    }
}
