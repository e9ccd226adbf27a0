mod add;
mod delete;
mod interactive;
mod list;
mod update;

use std::fmt;

use anyhow::Result;
use bpaf::{Bpaf, ParseFailure};
use indoc::indoc;
use tracing::debug;

use crate::config::Config;
use crate::utils::dialog::Dialog;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

static PRODUCTS_DESCRIPTION: &'_ str = indoc! {"
    Manage the products of a catalog API.\n\n

    Products are listed, added, updated and deleted through the API's product collection.
    After every change the full list is fetched again and shown."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(
    options,
    descr(PRODUCTS_DESCRIPTION),
    footer("Configuration is read from 'products.toml' and 'PRODUCTS_*' variables.")
)]
pub struct ProductsCli(#[bpaf(external(products_args))] pub ProductsArgs);

/// Main products args parser
///
/// To parse the whole CLI, use [`ProductsCli`] instead using [`products_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct ProductsArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    /// Base URL of the product API, overrides the configured 'catalog_url'
    #[bpaf(long, argument("URL"))]
    pub catalog_url: Option<String>,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

impl ProductsArgs {
    /// Build the catalog client and run the selected command
    ///
    /// Without a command, the interactive mode is started on a terminal,
    /// otherwise the product list is printed.
    pub async fn handle(self, config: Config) -> Result<()> {
        let config = config.with_catalog_url(self.catalog_url);
        debug!(catalog_url = %config.catalog_url, "using catalog");

        let command = match self.command {
            Some(command) => command,
            None if Dialog::can_prompt() => Commands::Interactive(interactive::Interactive {}),
            None => Commands::List(list::List { json: false }),
        };

        match command {
            Commands::Help(args) => args.handle(),
            Commands::List(args) => args.handle(init_catalog_client(&config)?).await?,
            Commands::Add(args) => args.handle(init_catalog_client(&config)?).await?,
            Commands::Delete(args) => args.handle(init_catalog_client(&config)?).await?,
            Commands::Update(args) => args.handle(init_catalog_client(&config)?).await?,
            Commands::Interactive(args) => args.handle(init_catalog_client(&config)?).await?,
        }
        Ok(())
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Prints help information
    #[bpaf(command, hide)]
    Help(#[bpaf(external(help))] Help),

    /// List all products
    #[bpaf(command, long("ls"))]
    List(#[bpaf(external(list::list))] list::List),

    /// Add a product
    #[bpaf(command, long("create"))]
    Add(#[bpaf(external(add::add))] add::Add),

    /// Delete a product by id
    #[bpaf(command, long("remove"))]
    Delete(#[bpaf(external(delete::delete))] delete::Delete),

    /// Change fields of a product
    #[bpaf(command)]
    Update(#[bpaf(external(update::update))] update::Update),

    /// Browse and edit the product list interactively
    #[bpaf(command)]
    Interactive(#[bpaf(external(interactive::interactive))] interactive::Interactive),
}

#[derive(Debug, Bpaf, Clone)]
struct Help {
    /// Command to show help for
    #[bpaf(positional("cmd"))]
    cmd: Option<String>,
}

/// Force `--help` output for `products` with a given command
pub fn display_help(cmd: Option<String>) {
    let mut args = Vec::from_iter(cmd.as_deref());
    args.push("--help");

    match products_cli().run_inner(&*args) {
        Ok(_) => message::error("expected help output"),
        Err(ParseFailure::Completion(comp)) => print!("{comp:80}"),
        Err(ParseFailure::Stdout(doc, _)) => message::plain(format!("{doc:80}")),
        Err(ParseFailure::Stderr(err)) => message::error(err),
    }
}

impl Help {
    fn handle(self) {
        display_help(self.cmd);
    }
}
