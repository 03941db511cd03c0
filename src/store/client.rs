//! HTTP client for the hosted document store.
//!
//! Tickets and the pricing document live in a Sanity-style content lake;
//! this wrapper covers the query, mutation and asset-upload endpoints the
//! counter flows need. No state is kept locally.

use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::billing::PriceTable;
use crate::models::{Person, Ticket};

pub(crate) const TICKET_QUERY: &str = r#"*[_type == "ticket"]"#;
const TICKET_BY_ID_QUERY: &str = r#"*[_type == "ticket" && _id == $id][0]"#;
const PRICING_QUERY: &str = r#"*[_id == $id][0]"#;
const PRICING_DOC_ID: &str = "pricing";

/// Failures talking to the document store. Mapped to 502-class responses at
/// the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("mutation acknowledged without a document id")]
    MissingId,
}

/// Client for one dataset of the hosted store.
#[derive(Clone)]
pub struct DocStore {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutationResult>,
}

#[derive(Debug, Deserialize)]
struct MutationResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    document: AssetDocument,
}

#[derive(Debug, Deserialize)]
struct AssetDocument {
    url: String,
}

/// Singleton pricing document wrapping the price table.
#[derive(Debug, Serialize, Deserialize)]
struct PricingDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_type")]
    doc_type: String,
    #[serde(flatten)]
    table: PriceTable,
}

impl DocStore {
    pub fn new(base_url: String, dataset: String, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset,
            token,
        }
    }

    fn data_url(&self, endpoint: &str) -> String {
        format!("{}/v1/data/{}/{}", self.base_url, endpoint, self.dataset)
    }

    pub(crate) fn listen_url(&self) -> String {
        self.data_url("listen")
    }

    pub(crate) fn http_get(&self, url: String) -> reqwest::RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Run a query with named parameters; parameter values are sent
    /// JSON-encoded as the store expects.
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<T, StoreError> {
        let mut pairs = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }

        let response = self
            .authorized(self.http.get(self.data_url("query")))
            .query(&pairs)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: QueryResponse<T> = response.json().await?;
        Ok(body.result)
    }

    async fn mutate(&self, mutations: Vec<serde_json::Value>) -> Result<MutateResponse, StoreError> {
        let response = self
            .authorized(self.http.post(self.data_url("mutate")))
            .query(&[("returnIds", "true")])
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn fetch_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        self.query(TICKET_QUERY, &[]).await
    }

    pub async fn fetch_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        self.query(TICKET_BY_ID_QUERY, &[("id", id)]).await
    }

    /// Create a ticket document; returns the id the store acknowledged.
    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<String, StoreError> {
        let response = self.mutate(vec![json!({ "create": ticket })]).await?;
        response
            .results
            .into_iter()
            .next()
            .map(|result| result.id)
            .ok_or(StoreError::MissingId)
    }

    /// Replace a ticket's people array (waiver save-all).
    pub async fn patch_ticket_people(&self, id: &str, people: &[Person]) -> Result<(), StoreError> {
        self.mutate(vec![json!({
            "patch": { "id": id, "set": { "people": people } }
        })])
        .await?;
        Ok(())
    }

    pub async fn delete_tickets(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mutations = ids.iter().map(|id| json!({ "delete": { "id": id } })).collect();
        self.mutate(mutations).await?;
        Ok(())
    }

    /// Upload a signature PNG to the asset endpoint; returns the asset URL.
    pub async fn upload_signature_image(
        &self,
        filename: &str,
        png: Vec<u8>,
    ) -> Result<String, StoreError> {
        let url = format!("{}/v1/assets/images/{}", self.base_url, self.dataset);
        let response = self
            .authorized(self.http.post(url))
            .query(&[("filename", filename)])
            .header(header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: AssetResponse = response.json().await?;
        Ok(body.document.url)
    }

    /// The published price table, if any.
    pub async fn load_price_table(&self) -> Result<Option<PriceTable>, StoreError> {
        let doc: Option<PricingDoc> = self.query(PRICING_QUERY, &[("id", PRICING_DOC_ID)]).await?;
        Ok(doc.map(|doc| doc.table))
    }

    pub async fn save_price_table(&self, table: &PriceTable) -> Result<(), StoreError> {
        let doc = PricingDoc {
            id: PRICING_DOC_ID.to_string(),
            doc_type: PRICING_DOC_ID.to_string(),
            table: table.clone(),
        };
        self.mutate(vec![json!({ "createOrReplace": doc })]).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into `StoreError::Api` with the body preserved.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api { status, message })
}
