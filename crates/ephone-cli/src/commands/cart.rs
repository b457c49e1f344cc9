use super::AppContext;
use super::output::print_cart;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use ephone_core::product::ProductId;

#[derive(Subcommand, Debug)]
pub enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Set a product's quantity (0 or less removes it)
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &AppContext, action: CartAction) -> Result<()> {
    let ledger = ctx.cart().await;

    match action {
        CartAction::Show => {}
        CartAction::Add { id } => {
            let product = ctx
                .feed()
                .product(id)
                .await
                .with_context(|| format!("Failed to fetch product #{id}"))?;
            let cart = ledger.add_to_cart(&product);
            println!(
                "{}",
                format!(
                    "Added {} (quantity {})",
                    product.title,
                    cart.quantity_of(id).unwrap_or_default()
                )
                .green()
            );
        }
        CartAction::Set { id, quantity } => {
            if !ledger.cart().contains(id) {
                println!("{}", format!("#{id} is not in the cart").yellow());
            }
            ledger.update_quantity(id, quantity);
        }
        CartAction::Remove { id } => {
            if !ledger.cart().contains(id) {
                println!("{}", format!("#{id} is not in the cart").yellow());
            }
            ledger.remove_from_cart(id);
        }
        CartAction::Clear => {
            ledger.clear_cart();
            println!("{}", "Cart cleared".green());
        }
    }

    ledger.flush().await;
    print_cart(&ledger.cart(), &ledger.price_summary(None, None));
    Ok(())
}
