use anyhow::{Result, bail};
use bpaf::Bpaf;
use product_catalog::{CatalogClient, ProductId, ProductUpdate, ProductUpdateForm};
use tracing::instrument;

use crate::session::CatalogSession;

// Change fields of an existing product
//
// Only the given fields are sent.
#[derive(Bpaf, Clone, Debug)]
pub struct Update {
    /// New name
    #[bpaf(long, argument("NAME"))]
    name: Option<String>,

    /// New unit price
    #[bpaf(long, argument("PRICE"))]
    price: Option<String>,

    /// New description
    #[bpaf(long, argument("TEXT"))]
    description: Option<String>,

    /// New category
    #[bpaf(long, argument("CATEGORY"))]
    category: Option<String>,

    /// New stock count
    #[bpaf(long, argument("COUNT"))]
    stock: Option<String>,

    /// Id of the product to change
    #[bpaf(positional("ID"))]
    id: String,
}

impl Update {
    fn changes(&self) -> ProductUpdate {
        ProductUpdate::from(ProductUpdateForm {
            name: self.name.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            stock: self.stock.clone(),
        })
    }

    #[instrument(name = "update", skip_all)]
    pub async fn handle(self, client: CatalogClient) -> Result<()> {
        let changes = self.changes();
        if changes.is_empty() {
            bail!("Nothing to update, pass at least one of --name, --price, --description, --category or --stock");
        }

        let mut session = CatalogSession::new(client);
        session
            .update_product(&ProductId::new(self.id), &changes)
            .await?;
        session.listing().render(std::io::stdout().lock())?;
        Ok(())
    }
}
