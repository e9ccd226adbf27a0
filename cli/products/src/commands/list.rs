use std::io::stdout;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use product_catalog::CatalogClient;
use tracing::instrument;

use crate::session::CatalogSession;
use crate::utils::message;

// List all products in the catalog
#[derive(Bpaf, Clone, Debug)]
pub struct List {
    /// Print the records as received from the server, as JSON
    #[bpaf(long)]
    pub json: bool,
}

impl List {
    #[instrument(name = "list", skip_all)]
    pub async fn handle(self, client: CatalogClient) -> Result<()> {
        let mut session = CatalogSession::new(client);
        session.refresh().await?;

        let listing = session.listing();
        if self.json {
            listing
                .render_json(stdout().lock())
                .context("could not write product list")?;
            return Ok(());
        }

        if listing.is_empty() {
            message::warning("No products in the catalog.");
            return Ok(());
        }

        listing
            .render(stdout().lock())
            .context("could not write product list")?;
        Ok(())
    }
}
