//! Catalog client for the product collection endpoint.

use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{self, HeaderMap};
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{CatalogClientError, RequestFailure, parse_error_detail};
use crate::types::{NewProduct, Product, ProductId, ProductUpdate};

/// Path segment of the collection endpoint, relative to the base URL.
pub const COLLECTION_PATH: &str = "products";

/// A client for the product catalog API.
///
/// Every operation is a single request, nothing is cached between calls.
pub struct CatalogClient {
    client: reqwest::Client,
    collection_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let collection_url = collection_url(&config.catalog_url)?;
        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            collection_url,
            config,
        })
    }

    /// The collection endpoint, `{base}/products`.
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// The endpoint of a single product, `{base}/products/{id}`.
    ///
    /// The id is always a single path segment, reserved characters are
    /// percent-encoded.
    pub fn product_url(&self, id: &ProductId) -> Url {
        let mut url = self.collection_url.clone();
        // collection_url() guarantees a base URL
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }

    /// Send a request and turn anything but a 2xx response into an error.
    async fn send(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, CatalogClientError> {
        debug!(%method, %url, "sending catalog request");

        let request = build(self.client.request(method.clone(), url.clone()));
        let response = request
            .send()
            .await
            .map_err(|e| request_failed(&method, &url, RequestFailure::Transport(e)))?;

        let status = response.status();
        debug!(%method, %url, %status, "received catalog response");

        if status.is_success() {
            return Ok(response);
        }

        // The body is only used for diagnostics, failing to read it is fine.
        let detail = match response.bytes().await {
            Ok(body) => parse_error_detail(&body),
            Err(_) => None,
        };

        Err(request_failed(
            &method,
            &url,
            RequestFailure::Status { status, detail },
        ))
    }
}

fn request_failed(method: &Method, url: &Url, cause: RequestFailure) -> CatalogClientError {
    CatalogClientError::RequestFailed {
        method: method.clone(),
        url: url.to_string(),
        cause,
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The product catalog API interface.
///
/// This trait enables alternate implementations,
/// e.g. a client with canned responses in tests.
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch the whole product collection.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogClientError>;

    /// Create a product. The response body is not used.
    async fn create_product(&self, product: &NewProduct) -> Result<(), CatalogClientError>;

    /// Delete the product with the given id.
    async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogClientError>;

    /// Overwrite the given fields of a product.
    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<(), CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all)]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        let url = self.collection_url.clone();
        let response = self.send(Method::GET, url.clone(), |req| req).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| request_failed(&Method::GET, &url, RequestFailure::Transport(e)))?;

        let products: Vec<Product> = serde_json::from_slice(&body)
            .map_err(|e| request_failed(&Method::GET, &url, RequestFailure::MalformedBody(e)))?;

        debug!(n_products = products.len(), "received product list");
        Ok(products)
    }

    #[instrument(skip_all, fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<(), CatalogClientError> {
        debug!(?product, "creating product");
        self.send(Method::POST, self.collection_url.clone(), |req| {
            req.json(product)
        })
        .await?;

        debug!("successfully created product");
        Ok(())
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogClientError> {
        self.send(Method::DELETE, self.product_url(id), |req| req)
            .await?;

        debug!("successfully deleted product");
        Ok(())
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<(), CatalogClientError> {
        debug!(?update, "updating product");
        self.send(Method::PUT, self.product_url(id), |req| req.json(update))
            .await?;

        debug!("successfully updated product");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Derive the collection endpoint from the configured base URL.
///
/// A trailing slash on the base URL is ignored.
fn collection_url(catalog_url: &str) -> Result<Url, CatalogClientError> {
    let mut url = Url::parse(catalog_url).map_err(|e| {
        CatalogClientError::InvalidConfig(format!("catalog url '{catalog_url}': {e}"))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            CatalogClientError::InvalidConfig(format!(
                "catalog url '{catalog_url}' cannot be used as a base"
            ))
        })?
        .pop_if_empty()
        .push(COLLECTION_PATH);

    Ok(url)
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client used for all catalog requests.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: header::InvalidHeaderName| CatalogClientError::InvalidConfig(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: header::InvalidHeaderValue| CatalogClientError::InvalidConfig(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        timeout = ?config.request_timeout,
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(15));

    let client_builder = if let Some(timeout) = config.request_timeout {
        client_builder.timeout(timeout)
    } else {
        client_builder
    };

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::InvalidConfig(e.to_string()))
}
