//! REST gateway backed by reqwest.
//!
//! Endpoints follow the catalog API layout:
//!
//! | Operation  | Request                          |
//! |------------|----------------------------------|
//! | fetch page | `GET    {base}/api/{path}?page=N` |
//! | fetch one  | `GET    {base}/api/{path}/{id}`   |
//! | create     | `POST   {base}/api/{path}`        |
//! | update     | `PATCH  {base}/api/{path}/{id}`   |
//! | delete     | `DELETE {base}/api/{path}/{id}`   |
//! | populate   | `GET    {base}/api/populate`      |

use super::Gateway;
use crate::config::Config;
use crate::error::{from_reqwest, from_status};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use stockroom_engine::{
    error::Result, Entity, PageToken, Product, RecordId, Transaction, FIRST_PAGE,
};

/// A record type served by the catalog API.
pub trait Resource: Entity {
    /// Path segment under `/api`.
    const PATH: &'static str;
    /// Whether the list endpoint honours the `page` query parameter.
    ///
    /// Unpaginated endpoints return everything for the first page; later
    /// pages are reported empty without a request.
    const PAGINATED: bool = true;
}

impl Resource for Product {
    const PATH: &'static str = "products";
}

impl Resource for Transaction {
    const PATH: &'static str = "transactions";
    const PAGINATED: bool = false;
}

/// Gateway talking to the catalog REST API.
#[derive(Debug, Clone)]
pub struct HttpGateway<T> {
    client: Client,
    base_url: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Resource> HttpGateway<T> {
    /// Build a gateway with the configured base URL and request timeout.
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    /// Build a gateway around an existing HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            _record: PhantomData,
        }
    }

    /// Fetch a single record, as the detail view does.
    pub async fn fetch_one(&self, id: RecordId) -> Result<T> {
        tracing::debug!(resource = T::PATH, id, "GET record");
        let response = self
            .client
            .get(self.record_url(id))
            .send()
            .await
            .map_err(from_reqwest)?;
        read_json(response, Some(id)).await
    }

    /// Ask the remote to seed itself with sample data.
    pub async fn populate(&self) -> Result<serde_json::Value> {
        let url = format!("{}/api/populate", self.base_url);
        tracing::info!(%url, "Populating remote catalog");
        let response = self.client.get(url).send().await.map_err(from_reqwest)?;
        read_json(response, None).await
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.base_url, T::PATH)
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/api/{}/{}", self.base_url, T::PATH, id)
    }
}

#[async_trait]
impl<T: Resource> Gateway<T> for HttpGateway<T> {
    async fn fetch_page(&self, token: PageToken) -> Result<Vec<T>> {
        if !T::PAGINATED && token > FIRST_PAGE {
            return Ok(Vec::new());
        }

        tracing::debug!(resource = T::PATH, token, "GET page");
        let mut request = self.client.get(self.collection_url());
        if T::PAGINATED {
            request = request.query(&[("page", token)]);
        }
        let response = request.send().await.map_err(from_reqwest)?;
        read_json(response, None).await
    }

    async fn create(&self, draft: &T::Draft) -> Result<T> {
        tracing::debug!(resource = T::PATH, "POST record");
        let response = self
            .client
            .post(self.collection_url())
            .json(draft)
            .send()
            .await
            .map_err(from_reqwest)?;
        read_json(response, None).await
    }

    async fn update(&self, id: RecordId, patch: &T::Patch) -> Result<T> {
        tracing::debug!(resource = T::PATH, id, "PATCH record");
        let response = self
            .client
            .patch(self.record_url(id))
            .json(patch)
            .send()
            .await
            .map_err(from_reqwest)?;
        read_json(response, Some(id)).await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        tracing::debug!(resource = T::PATH, id, "DELETE record");
        let response = self
            .client
            .delete(self.record_url(id))
            .send()
            .await
            .map_err(from_reqwest)?;
        ensure_success(response, Some(id)).await
    }
}

async fn ensure_success(response: Response, target: Option<RecordId>) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(from_status(status, target, &body))
}

async fn read_json<R: DeserializeOwned>(response: Response, target: Option<RecordId>) -> Result<R> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(from_status(status, target, &body));
    }
    response.json().await.map_err(from_reqwest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_api_layout() {
        let gateway: HttpGateway<Product> =
            HttpGateway::with_client(Client::new(), "http://localhost:4000/");
        assert_eq!(gateway.collection_url(), "http://localhost:4000/api/products");
        assert_eq!(gateway.record_url(12), "http://localhost:4000/api/products/12");

        let gateway: HttpGateway<Transaction> =
            HttpGateway::with_client(Client::new(), "http://localhost:4000");
        assert_eq!(
            gateway.collection_url(),
            "http://localhost:4000/api/transactions"
        );
    }

    #[tokio::test]
    async fn unpaginated_resource_is_empty_after_first_page() {
        // No server is listening; a request would fail.
        let gateway: HttpGateway<Transaction> =
            HttpGateway::with_client(Client::new(), "http://127.0.0.1:9");
        let page = gateway.fetch_page(2).await.unwrap();
        assert!(page.is_empty());
    }
}
