//! HTTP client for a product catalog REST API.
//!
//! This crate provides:
//! - HTTP client construction from a [`CatalogClientConfig`]
//! - The [`ClientTrait`] seam for listing, creating, updating and deleting products
//! - Wire types for product records and create/update payloads
//! - A single error type for failed catalog requests
//!
//! ## Usage
//!
//! ```ignore
//! use product_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let config = CatalogClientConfig {
//!     catalog_url: "http://127.0.0.1:5000/api".to_string(),
//!     ..Default::default()
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let products = client.list_products().await?;
//! ```

mod client;
mod config;
mod error;
pub mod types;

pub use client::{COLLECTION_PATH, CatalogClient, ClientTrait};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::{CatalogClientError, RequestFailure};
pub use reqwest::{Method, StatusCode};
pub use types::{NewProduct, Product, ProductForm, ProductId, ProductUpdate, ProductUpdateForm};
