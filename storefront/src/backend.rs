//! Cart and catalog data sources.

use async_trait::async_trait;
use free_sample::cart::CartSnapshot;
use free_sample::catalog::CatalogProduct;
use tracing::debug;

use crate::error::BackendError;
use crate::wire::{AddItemRequest, AjaxCart, ChangeLineRequest, ProductsPage};

/// Where a [`crate::CartSession`] reads and mutates the cart.
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError>;

    async fn fetch_catalog(&self) -> Result<Vec<CatalogProduct>, BackendError>;

    async fn add_item(&self, request: AddItemRequest) -> Result<(), BackendError>;

    async fn change_line(&self, request: ChangeLineRequest) -> Result<(), BackendError>;
}

const CATALOG_PAGE_SIZE: u32 = 50;

/// Backend speaking the Shopify storefront Ajax API.
#[derive(Clone, Debug)]
pub struct AjaxBackend {
    http: reqwest::Client,
    base_url: String,
}

impl AjaxBackend {
    /// `base_url` is the shop origin, e.g. `https://example.myshopify.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        debug!(path, "GET");
        self.send(self.http.get(self.url(path)))
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn post_json<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), BackendError> {
        debug!(path, "POST");
        self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl CartBackend for AjaxBackend {
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError> {
        let cart: AjaxCart = self.get_json("/cart.js").await?;
        Ok(cart.into())
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogProduct>, BackendError> {
        let page: ProductsPage = self
            .get_json(&format!("/collections/all/products.json?limit={CATALOG_PAGE_SIZE}"))
            .await?;
        Ok(page.into_catalog())
    }

    async fn add_item(&self, request: AddItemRequest) -> Result<(), BackendError> {
        self.post_json("/cart/add.js", &request).await
    }

    async fn change_line(&self, request: ChangeLineRequest) -> Result<(), BackendError> {
        self.post_json("/cart/change.js", &request).await
    }
}
