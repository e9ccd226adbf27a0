use anyhow::Result;
use bpaf::Bpaf;
use product_catalog::{CatalogClient, ProductForm};
use tracing::instrument;

use crate::session::CatalogSession;

// Add a product to the catalog
//
// Fields are sent as given, numbers are coerced leniently
// and anything that is not a number is sent as null.
#[derive(Bpaf, Clone, Debug)]
pub struct Add {
    /// Name of the product
    #[bpaf(long, argument("NAME"), fallback(String::new()))]
    name: String,

    /// Unit price, e.g. '9.99'
    #[bpaf(long, argument("PRICE"), fallback(String::new()))]
    price: String,

    /// Free text description
    #[bpaf(long, argument("TEXT"), fallback(String::new()))]
    description: String,

    /// Category the product is filed under
    #[bpaf(long, argument("CATEGORY"), fallback(String::new()))]
    category: String,

    /// Number of items in stock
    #[bpaf(long, argument("COUNT"), fallback(String::new()))]
    stock: String,
}

impl Add {
    /// The form as it would be submitted.
    pub fn form(&self) -> ProductForm {
        ProductForm {
            name: self.name.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            stock: self.stock.clone(),
        }
    }

    #[instrument(name = "add", skip_all)]
    pub async fn handle(self, client: CatalogClient) -> Result<()> {
        let mut session = CatalogSession::new(client);
        session.create_product(self.form()).await?;
        session.listing().render(std::io::stdout().lock())?;
        Ok(())
    }
}
