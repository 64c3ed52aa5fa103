//! Backend client
//!
//! Thin typed wrapper over the point-of-sale backend's JSON API. Calls are independent: no
//! retries, no de-duplication and no cancellation.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{CatalogItem, InventoryItem},
    items::ItemId,
    orders::{ModifyOrderRequest, ModifyOrderResponse, OrderLineRecord, OrderRecord, OrderRequest},
    search::OrderQuery,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx response.
    #[error("request failed with status {status}: {detail}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Backend `detail` message, or the raw body
        detail: String,
    },
}

/// Calls the point-of-sale flows make against the backend.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// All catalog items.
    async fn list_items(&self) -> Result<Vec<CatalogItem>, ApiError>;

    /// Catalog items whose name matches `query`.
    async fn search_items(&self, query: &str) -> Result<Vec<CatalogItem>, ApiError>;

    /// A single catalog item.
    async fn get_item(&self, item_id: ItemId) -> Result<CatalogItem, ApiError>;

    /// Add an item to the catalog, returning its id.
    async fn create_item(&self, item: &InventoryItem) -> Result<ItemId, ApiError>;

    /// Replace an item's name, price and stock. Returns whether the backend applied it.
    async fn update_item(&self, item_id: ItemId, item: &InventoryItem) -> Result<bool, ApiError>;

    /// Delete an item that no order refers to.
    async fn delete_item(&self, item_id: ItemId) -> Result<(), ApiError>;

    /// Reset every item's stock. Returns whether the backend applied it.
    async fn restock_all(&self) -> Result<bool, ApiError>;

    /// Lines recorded for an order.
    async fn order_items(&self, order_id: u64) -> Result<Vec<OrderLineRecord>, ApiError>;

    /// Place a new order.
    async fn create_order(&self, request: &OrderRequest) -> Result<(), ApiError>;

    /// Replace an order's lines.
    async fn modify_order(
        &self,
        order_id: u64,
        request: &ModifyOrderRequest,
    ) -> Result<ModifyOrderResponse, ApiError>;

    /// Cancel an order.
    async fn cancel_order(&self, order_id: u64) -> Result<(), ApiError>;

    /// Mark a pending order as paid.
    async fn mark_paid(&self, order_id: u64) -> Result<(), ApiError>;

    /// Search the order history.
    async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<OrderRecord>, ApiError>;
}

/// [`OrdersApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOrdersApi {
    base_url: String,
    http: Client,
}

impl HttpOrdersApi {
    /// Create a client for the backend at `base_url`, e.g. `"http://localhost:8000"`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { base_url, http }
    }

    /// Backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        debug!(status = status.as_u16(), url = %response.url(), "backend responded");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.detail)
            .unwrap_or(text);

        Err(ApiError::UnexpectedResponse {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.get_json(self.http.get(self.url("/api/items"))).await
    }

    async fn search_items(&self, query: &str) -> Result<Vec<CatalogItem>, ApiError> {
        let request = self
            .http
            .get(self.url("/api/search-items"))
            .query(&[("query", query)]);

        self.get_json(request).await
    }

    async fn get_item(&self, item_id: ItemId) -> Result<CatalogItem, ApiError> {
        let url = self.url(&format!("/api/items/{item_id}"));

        self.get_json(self.http.get(url)).await
    }

    async fn create_item(&self, item: &InventoryItem) -> Result<ItemId, ApiError> {
        let request = self.http.post(self.url("/api/items")).json(item);
        let created: CreatedBody = self.get_json(request).await?;

        Ok(created.id)
    }

    async fn update_item(
        &self,
        item_id: ItemId,
        item: &InventoryItem,
    ) -> Result<bool, ApiError> {
        let url = self.url(&format!("/api/items/{item_id}"));
        let body: SuccessBody = self.get_json(self.http.put(url).json(item)).await?;

        Ok(body.success)
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/items/{item_id}"));

        self.send(self.http.delete(url)).await?;

        Ok(())
    }

    async fn restock_all(&self) -> Result<bool, ApiError> {
        let request = self.http.post(self.url("/api/restock-all"));
        let body: SuccessBody = self.get_json(request).await?;

        Ok(body.success)
    }

    async fn order_items(&self, order_id: u64) -> Result<Vec<OrderLineRecord>, ApiError> {
        let url = self.url(&format!("/api/orders/{order_id}/items"));

        self.get_json(self.http.get(url)).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<(), ApiError> {
        let request = self.http.post(self.url("/api/create-order")).json(request);

        self.send(request).await?;

        Ok(())
    }

    async fn modify_order(
        &self,
        order_id: u64,
        request: &ModifyOrderRequest,
    ) -> Result<ModifyOrderResponse, ApiError> {
        let url = self.url(&format!("/api/modify-order/{order_id}"));

        self.get_json(self.http.put(url).json(request)).await
    }

    async fn cancel_order(&self, order_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/cancel-order/{order_id}"));

        self.send(self.http.post(url)).await?;

        Ok(())
    }

    async fn mark_paid(&self, order_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/update-payment-status/{order_id}"));

        self.send(self.http.post(url)).await?;

        Ok(())
    }

    async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<OrderRecord>, ApiError> {
        let request = self
            .http
            .get(self.url("/api/search-orders"))
            .query(&query.to_query_pairs());

        self.get_json(request).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedBody {
    id: ItemId,
}
