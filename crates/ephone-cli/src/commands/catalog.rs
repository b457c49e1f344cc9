use super::AppContext;
use super::output::{print_error, print_product_detail, print_products};
use anyhow::{Context, Result};
use colored::Colorize;
use ephone_application::{AiSearchOutcome, PageOutcome};
use ephone_core::product::ProductId;

/// Prints the first `pages` pages of the catalog.
pub async fn list(ctx: &AppContext, pages: usize) -> Result<()> {
    let feed = ctx.loaded_feed().await?;
    for _ in 1..pages {
        match feed.load_more().await {
            PageOutcome::Appended { .. } => {}
            PageOutcome::Exhausted => break,
            other => tracing::debug!(?other, "Page not appended"),
        }
    }

    let view = feed.snapshot();
    print_products(&view.products);
    println!();
    let footer = format!("Showing {} of {} products", view.products.len(), view.catalog_len);
    if view.has_more {
        let hint = format!("({} per page, use --pages for more)", feed.page_size());
        println!("{} {}", footer.bright_black(), hint.bright_black());
    } else {
        println!("{}", footer.bright_black());
    }
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str, ai: bool) -> Result<()> {
    let feed = ctx.loaded_feed().await?;

    if ai {
        match feed.ai_search(query).await {
            AiSearchOutcome::Refined { .. } => println!("{}", "AI-ranked results".magenta()),
            AiSearchOutcome::Provisional { .. } => {
                print_error("AI search unavailable, showing basic matches.")
            }
            AiSearchOutcome::Cleared | AiSearchOutcome::Stale => {}
        }
    } else {
        feed.search(query);
    }

    print_products(&feed.snapshot().products);
    Ok(())
}

pub async fn show(ctx: &AppContext, id: ProductId, describe: bool) -> Result<()> {
    let feed = ctx.feed();
    let product = feed
        .product(id)
        .await
        .with_context(|| format!("Failed to fetch product #{id}"))?;

    let description = if describe {
        ctx.assistant.describe_product(&product).await
    } else {
        product.description.clone()
    };

    print_product_detail(&product, &description);
    Ok(())
}

pub async fn categories(ctx: &AppContext) -> Result<()> {
    let categories = ctx
        .feed()
        .categories()
        .await
        .context("Failed to fetch categories")?;
    for category in categories {
        println!("{}", category.cyan());
    }
    Ok(())
}
