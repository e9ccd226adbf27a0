use anyhow::Result;
use bpaf::Bpaf;
use product_catalog::{CatalogClient, ProductId};
use tracing::instrument;

use crate::session::CatalogSession;
use crate::utils::message;

// Delete a product by id
#[derive(Bpaf, Clone, Debug)]
pub struct Delete {
    /// Id of the product to delete, as shown by 'products list'
    #[bpaf(positional("ID"))]
    pub id: String,
}

impl Delete {
    #[instrument(name = "delete", skip_all)]
    pub async fn handle(self, client: CatalogClient) -> Result<()> {
        let mut session = CatalogSession::new(client);
        session.delete_product(&ProductId::new(self.id)).await?;

        if session.listing().is_empty() {
            message::plain("The catalog is now empty.");
        } else {
            session.listing().render(std::io::stdout().lock())?;
        }
        Ok(())
    }
}
