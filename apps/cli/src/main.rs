use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    config::{load_settings, validate_server_url},
    Controller, SortConfig, SortDirection, SortKey, SortScope, SubmitOutcome,
};
use shared::domain::ProductId;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "products", about = "Manage the product list on a products server")]
struct Args {
    /// Overrides `server_url` from the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Client config file; defaults to ./client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of products.
    List {
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long, value_enum, default_value_t = SortArg::Id)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Sort the whole filtered collection instead of the current page.
        #[arg(long)]
        sort_all: bool,
    },
    Add {
        name: String,
    },
    Edit {
        id: i64,
        name: String,
    },
    /// Delete every listed id.
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Id,
    Name,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Id => SortKey::Id,
            SortArg::Name => SortKey::Name,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = &args.server_url {
        settings.server_url = validate_server_url(url)?;
    }
    if let Command::List { sort_all: true, .. } = &args.command {
        settings.sort_scope = SortScope::Collection;
    }

    let mut controller = Controller::connect(&settings)?;
    controller
        .refresh()
        .await
        .with_context(|| format!("could not load products from {}", settings.server_url))?;

    match args.command {
        Command::List {
            filter,
            sort,
            desc,
            page,
            ..
        } => {
            controller.set_filter(filter);
            controller.set_sort(SortConfig {
                key: sort.into(),
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            });
            controller.set_page(page);
            print_view(&controller);
        }
        Command::Add { name } => {
            controller.form_mut().set_name(name);
            let outcome = controller.submit_form().await?;
            report(&controller, outcome)?;
        }
        Command::Edit { id, name } => {
            if !controller.toggle_select_id(ProductId(id)) {
                bail!("no product with id {id}");
            }
            controller.form_mut().set_name(name);
            let outcome = controller.submit_form().await?;
            report(&controller, outcome)?;
        }
        Command::Delete { ids } => {
            let ids: Vec<ProductId> = ids.into_iter().map(ProductId).collect();
            for id in controller.select_ids(&ids) {
                warn!(product_id = id.0, "unknown product id skipped");
            }
            if controller.delete_selected().await.is_none() {
                bail!("none of the given ids exist");
            }
            print_view(&controller);
        }
    }
    Ok(())
}

fn report(controller: &Controller, outcome: SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Created(product) => println!("{}  {}", product.id, product.name),
        SubmitOutcome::Updated(Some(product)) => println!("{}  {}", product.id, product.name),
        SubmitOutcome::Updated(None) => println!("update accepted; local copy unchanged"),
        SubmitOutcome::Failed => {
            print_notification(controller);
            bail!("server rejected the change");
        }
    }
    print_notification(controller);
    Ok(())
}

fn print_view(controller: &Controller) {
    let view = controller.view();
    for product in &view.rows {
        println!("{}  {}", product.id, product.name);
    }
    println!("Page {} of {}", view.current_page, view.total_pages);
    print_notification(controller);
}

fn print_notification(controller: &Controller) {
    if let Some(message) = controller.notification() {
        println!("{message}");
    }
}
