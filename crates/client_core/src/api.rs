use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ApiException},
    protocol::{item_route, items_route, ProductBody},
};

/// Remote product resource consumed by [`crate::CollectionStore`].
#[async_trait]
pub trait ProductsApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    /// Sends a candidate product. The returned product carries the id the
    /// server settled on, which may differ from the candidate's.
    async fn create_product(&self, candidate: &Product) -> Result<Product>;
    async fn update_product(&self, product: &Product) -> Result<Product>;
    async fn delete_product(&self, id: ProductId) -> Result<()>;
}

pub struct HttpProductsApi {
    http: Client,
    server_url: String,
}

impl HttpProductsApi {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    pub fn with_timeout(server_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            server_url: server_url.into(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), route)
    }
}

#[async_trait]
impl ProductsApi for HttpProductsApi {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let url = self.url(items_route());
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        let products = check_status(res).await?.json().await?;
        Ok(products)
    }

    async fn create_product(&self, candidate: &Product) -> Result<Product> {
        let url = self.url(items_route());
        let res = self
            .http
            .post(&url)
            .json(&ProductBody::from(candidate))
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        let created = check_status(res).await?.json().await?;
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let url = self.url(&item_route(product.id));
        let res = self
            .http
            .put(&url)
            .json(&ProductBody::from(product))
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;
        let updated = check_status(res).await?.json().await?;
        Ok(updated)
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let url = self.url(&item_route(id));
        let res = self
            .http
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {url} failed"))?;
        check_status(res).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into an error, preferring the server's
/// `ApiError` body when it sent one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_error = response.error_for_status_ref().err();
    match response.json::<ApiError>().await {
        Ok(api_error) => Err(anyhow::Error::new(ApiException::from(api_error))
            .context(format!("server responded with {status}"))),
        Err(_) => Err(status_error
            .map(anyhow::Error::new)
            .unwrap_or_else(|| anyhow!("server responded with {status}"))),
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
