//! Catalog flows shared by the sub-commands and the interactive mode.
//!
//! Every flow issues a single request and, once a mutation went through,
//! reloads the whole product list from the server.
//! Failures are logged, shown to the user with a generic message and
//! returned as [Reported].

use product_catalog::{ClientTrait, NewProduct, ProductForm, ProductId, ProductUpdate};
use tracing::{error, instrument};

use crate::utils::errors::{Reported, display_chain};
use crate::utils::listing::ProductListing;
use crate::utils::message;

pub const LIST_FAILED: &str = "Error fetching products.";
pub const CREATE_FAILED: &str = "Error adding product.";
pub const DELETE_FAILED: &str = "Error deleting product.";
pub const UPDATE_FAILED: &str = "Error updating product.";

/// A catalog client together with the listing it last rendered.
///
/// The listing is only ever replaced with a fresh copy from the server,
/// it is never used to answer a request.
#[derive(Debug)]
pub struct CatalogSession<C> {
    client: C,
    listing: ProductListing,
}

impl<C: ClientTrait> CatalogSession<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            listing: ProductListing::default(),
        }
    }

    pub fn listing(&self) -> &ProductListing {
        &self.listing
    }

    /// Fetch all products and replace the listing.
    ///
    /// The previous listing stays in place if the fetch fails.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result<(), Reported> {
        match self.client.list_products().await {
            Ok(products) => {
                self.listing.replace(products);
                Ok(())
            },
            Err(err) => {
                error!(error = %display_chain(&err), "Error fetching products");
                message::error(LIST_FAILED);
                Err(Reported(LIST_FAILED))
            },
        }
    }

    /// Submit the product form, then reload the list.
    #[instrument(skip_all)]
    pub async fn create_product(&mut self, form: ProductForm) -> Result<(), Reported> {
        let product = NewProduct::from(form);
        tracing::info!(?product, "sending product data");

        if let Err(err) = self.client.create_product(&product).await {
            error!(error = %display_chain(&err), "Error adding product");
            message::error(CREATE_FAILED);
            return Err(Reported(CREATE_FAILED));
        }

        message::created("Product added successfully!");
        self.refresh().await
    }

    /// Delete the product with `id`, then reload the list.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), Reported> {
        tracing::info!("deleting product");

        if let Err(err) = self.client.delete_product(id).await {
            error!(error = %display_chain(&err), "Error deleting product");
            message::error(DELETE_FAILED);
            return Err(Reported(DELETE_FAILED));
        }

        message::deleted("Product deleted!");
        self.refresh().await
    }

    /// Change some fields of the product with `id`, then reload the list.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn update_product(
        &mut self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<(), Reported> {
        tracing::info!(?update, "updating product");

        if let Err(err) = self.client.update_product(id, update).await {
            error!(error = %display_chain(&err), "Error updating product");
            message::error(UPDATE_FAILED);
            return Err(Reported(UPDATE_FAILED));
        }

        message::updated("Product updated!");
        self.refresh().await
    }
}
