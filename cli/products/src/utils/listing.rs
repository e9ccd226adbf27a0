use std::fmt::Display;
use std::io::Write;

use product_catalog::{Product, ProductId};

/// One rendered line of the product list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    /// `{name} - ${price}`
    pub label: String,
    /// Id the entry's delete action is bound to.
    ///
    /// `None` if the server did not send an id for the record.
    pub delete_id: Option<ProductId>,
}

impl From<&Product> for ListEntry {
    fn from(product: &Product) -> Self {
        ListEntry {
            label: format!("{} - ${}", product.name, format_price(product.price)),
            delete_id: product.id.clone(),
        }
    }
}

impl Display for ListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.delete_id {
            Some(id) => write!(f, "{}  (id: {id})", self.label),
            None => write!(f, "{}", self.label),
        }
    }
}

/// Shortest representation that round trips, `9.99`, `12.5`, `10`.
fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => price.to_string(),
        None => "?".to_string(),
    }
}

/// The product list as last received from the server.
///
/// Nothing is ever patched in place,
/// every successful fetch replaces the whole listing.
#[derive(Debug, Clone, Default)]
pub struct ProductListing {
    products: Vec<Product>,
    entries: Vec<ListEntry>,
}

impl ProductListing {
    /// Clear the listing, then add one entry per product.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.entries.clear();
        self.entries.extend(products.iter().map(ListEntry::from));
        self.products = products;
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Entries that carry a delete action.
    pub fn deletable(&self) -> impl Iterator<Item = &ListEntry> {
        self.entries.iter().filter(|entry| entry.delete_id.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write one line per entry.
    pub fn render(&self, mut out: impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }

    /// Write the received records as a JSON array.
    pub fn render_json(&self, mut out: impl Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut out, &self.products)?;
        writeln!(out)
    }
}
