use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::cart::CartAction;
use commands::chat::ChatAction;
use commands::{AppContext, GlobalOptions};
use ephone_core::product::ProductId;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "ephone")]
#[command(about = "e-phone - browse the catalog, manage the cart and ask the shopping assistant", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products page by page
    List {
        /// Number of pages to show
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Search the whole catalog
    Search {
        query: String,
        /// Let the assistant rank the results
        #[arg(long)]
        ai: bool,
    },
    /// Show a single product
    Show {
        id: ProductId,
        /// Ask the assistant for a fresh description
        #[arg(long)]
        describe: bool,
    },
    /// List product categories
    Categories,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Recommend products for the current cart
    Recommend,
    /// Chat with the shopping assistant (interactive without a subcommand)
    Chat {
        #[command(subcommand)]
        action: Option<ChatAction>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_tracing(cli.global.log_dir.as_deref())
        .context("Failed to initialize logging")?;

    let ctx = AppContext::build(&cli.global).await?;

    match cli.command {
        Commands::List { pages } => commands::catalog::list(&ctx, pages).await?,
        Commands::Search { query, ai } => commands::catalog::search(&ctx, &query, ai).await?,
        Commands::Show { id, describe } => commands::catalog::show(&ctx, id, describe).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Recommend => commands::recommend::run(&ctx).await?,
        Commands::Chat { action } => commands::chat::run(&ctx, action).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["ephone", "cart", "set", "3", "-1", "--ephemeral"]);
        assert!(cli.global.ephemeral);
        match cli.command {
            Commands::Cart {
                action: CartAction::Set { id, quantity },
            } => {
                assert_eq!(id, 3);
                assert_eq!(quantity, -1);
            }
            _ => panic!("expected cart set"),
        }
    }
}
