use std::fmt;
use std::ops::ControlFlow;

use anyhow::Result;
use bpaf::Bpaf;
use inquire::error::InquireResult;
use product_catalog::{CatalogClient, ClientTrait, ProductForm, ProductId};
use tracing::{debug, instrument};

use crate::session::CatalogSession;
use crate::utils::dialog::{Dialog, Select, Text, is_cancelled};
use crate::utils::listing::{ListEntry, ProductListing};
use crate::utils::message;

// Browse and edit the product list interactively
#[derive(Bpaf, Clone, Debug)]
pub struct Interactive {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Add,
    Delete,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 4] = [Action::Add, Action::Delete, Action::Refresh, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => write!(f, "Add a product"),
            Action::Delete => write!(f, "Delete a product"),
            Action::Refresh => write!(f, "Reload the list"),
            Action::Quit => write!(f, "Quit"),
        }
    }
}

/// What the user asked for, with everything needed to carry it out.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Create(ProductForm),
    Delete(ProductId),
    Refresh,
    /// Nothing to do, e.g. a cancelled sub-menu
    Skip,
    Quit,
}

impl Interactive {
    /// Show the list, then keep asking for actions until the user quits.
    ///
    /// Failed requests are reported by the session and do not end the loop.
    #[instrument(name = "interactive", skip_all)]
    pub async fn handle(self, client: CatalogClient) -> Result<()> {
        let mut session = CatalogSession::new(client);
        let _ = session.refresh().await;

        loop {
            print_listing(session.listing());

            let step = prompt_step(session.listing()).await?;
            debug!(?step, "selected");

            if run_step(&mut session, step).await.is_break() {
                break;
            }
        }

        Ok(())
    }
}

/// Ask for the next action and the input it needs.
async fn prompt_step(listing: &ProductListing) -> Result<Step> {
    let dialog = Dialog {
        message: "What would you like to do?",
        help_message: None,
        typed: Select {
            options: Action::ALL.to_vec(),
        },
    };

    let Some(action) = cancellable(dialog.prompt().await)? else {
        return Ok(Step::Quit);
    };

    let step = match action {
        Action::Add => match prompt_form().await? {
            Some(form) => Step::Create(form),
            None => Step::Skip,
        },
        Action::Delete => {
            let entries = delete_menu(listing);
            if entries.is_empty() {
                message::warning("There are no products to delete.");
                return Ok(Step::Skip);
            }

            let dialog = Dialog {
                message: "Which product should be deleted?",
                help_message: Some("Press escape to go back"),
                typed: Select { options: entries },
            };
            match cancellable(dialog.prompt().await)? {
                Some(ListEntry {
                    delete_id: Some(id),
                    ..
                }) => Step::Delete(id),
                _ => Step::Skip,
            }
        },
        Action::Refresh => Step::Refresh,
        Action::Quit => Step::Quit,
    };
    Ok(step)
}

/// Entries offered for deletion, those without an id are left out.
fn delete_menu(listing: &ProductListing) -> Vec<ListEntry> {
    listing.deletable().cloned().collect()
}

/// Carry out a step against the catalog.
///
/// Failures were already shown by the session and keep the loop going.
async fn run_step<C: ClientTrait>(
    session: &mut CatalogSession<C>,
    step: Step,
) -> ControlFlow<()> {
    let _ = match step {
        Step::Create(form) => session.create_product(form).await,
        Step::Delete(id) => session.delete_product(&id).await,
        Step::Refresh => session.refresh().await,
        Step::Skip => Ok(()),
        Step::Quit => return ControlFlow::Break(()),
    };
    ControlFlow::Continue(())
}

fn print_listing(listing: &ProductListing) {
    if listing.is_empty() {
        message::plain("No products in the catalog.");
        return;
    }
    for entry in listing.entries() {
        message::plain(entry);
    }
}

/// Turn a cancelled prompt into `None`.
fn cancellable<T>(result: InquireResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if is_cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn ask(message: &str, help_message: Option<&str>) -> Result<Option<String>> {
    let dialog = Dialog {
        message,
        help_message,
        typed: Text,
    };
    cancellable(dialog.prompt().await)
}

/// Ask for every field of a new product.
///
/// Returns `None` if any of the prompts was cancelled.
async fn prompt_form() -> Result<Option<ProductForm>> {
    let Some(name) = ask("Name:", None).await? else {
        return Ok(None);
    };
    let Some(price) = ask("Price:", Some("e.g. 9.99")).await? else {
        return Ok(None);
    };
    let Some(description) = ask("Description:", None).await? else {
        return Ok(None);
    };
    let Some(category) = ask("Category:", None).await? else {
        return Ok(None);
    };
    let Some(stock) = ask("Stock:", Some("number of items in stock")).await? else {
        return Ok(None);
    };

    Ok(Some(ProductForm {
        name,
        price,
        description,
        category,
        stock,
    }))
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;
    use product_catalog::CatalogClientConfig;
    use serde_json::json;

    use super::*;
    use crate::utils::message::history::History;

    fn session_for(server: &MockServer) -> CatalogSession<CatalogClient> {
        let client = CatalogClient::new(CatalogClientConfig {
            catalog_url: server.url("/api"),
            ..Default::default()
        })
        .unwrap();
        CatalogSession::new(client)
    }

    #[test]
    fn quit_is_the_last_action() {
        assert_eq!(Action::ALL.last(), Some(&Action::Quit));
        assert_eq!(Action::Add.to_string(), "Add a product");
    }

    #[test]
    fn cancelled_prompt_is_none() {
        let result: InquireResult<String> = Err(inquire::InquireError::OperationCanceled);
        assert!(cancellable(result).unwrap().is_none());

        let result: InquireResult<String> = Err(inquire::InquireError::NotTTY);
        assert!(cancellable(result).is_err());
    }

    #[test]
    fn delete_menu_offers_entries_with_id() {
        let mut listing = ProductListing::default();
        listing.replace(
            serde_json::from_value(json!([
                {"_id": "1", "name": "Widget", "price": 9.99},
                {"name": "Orphan", "price": 1},
                {"_id": "2", "name": "Gadget", "price": 12.5}
            ]))
            .unwrap(),
        );

        let ids = delete_menu(&listing)
            .into_iter()
            .map(|entry| entry.delete_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![
            Some(ProductId::from("1")),
            Some(ProductId::from("2"))
        ]);

        assert!(delete_menu(&ProductListing::default()).is_empty());
    }

    #[tokio::test]
    async fn create_step_posts_then_reloads() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/products");
            then.status(201);
        });
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200)
                .json_body(json!([{"_id": "2", "name": "Gadget", "price": 12.5}]));
        });

        let mut session = session_for(&server);
        let form = ProductForm {
            name: "Gadget".to_string(),
            price: "12.5".to_string(),
            ..Default::default()
        };
        let flow = run_step(&mut session, Step::Create(form)).await;

        assert_eq!(flow, ControlFlow::Continue(()));
        create.assert_hits(1);
        list.assert_hits(1);
        assert_eq!(session.listing().entries()[0].label, "Gadget - $12.5");
    }

    #[tokio::test]
    async fn failed_delete_step_keeps_the_loop_going() {
        let server = MockServer::start_async().await;
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/products/1");
            then.status(404);
        });
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200).json_body(json!([]));
        });

        let mut session = session_for(&server);
        let flow = run_step(&mut session, Step::Delete(ProductId::from("1"))).await;

        assert_eq!(flow, ControlFlow::Continue(()));
        delete.assert_hits(1);
        list.assert_hits(0);
        assert_eq!(&History::global().messages(), &[
            "❌ ERROR: Error deleting product."
        ]);
    }

    #[tokio::test]
    async fn refresh_skip_and_quit_steps() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200).json_body(json!([]));
        });

        let mut session = session_for(&server);
        assert_eq!(
            run_step(&mut session, Step::Refresh).await,
            ControlFlow::Continue(())
        );
        list.assert_hits(1);

        assert_eq!(
            run_step(&mut session, Step::Skip).await,
            ControlFlow::Continue(())
        );
        assert_eq!(run_step(&mut session, Step::Quit).await, ControlFlow::Break(()));
        list.assert_hits(1);
    }
}
