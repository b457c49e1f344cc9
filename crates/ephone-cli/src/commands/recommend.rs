use super::AppContext;
use super::output::print_products;
use anyhow::Result;
use colored::Colorize;
use ephone_application::RecommendationKind;

pub async fn run(ctx: &AppContext) -> Result<()> {
    let feed = ctx.loaded_feed().await?;
    let ledger = ctx.cart().await;

    let recommendations = ctx
        .assistant
        .recommend_or_fallback(&ledger.cart(), &feed.catalog())
        .await;

    let heading = match recommendations.kind {
        RecommendationKind::Popular => "Popular Products",
        RecommendationKind::Personalized => "Recommended for You",
        RecommendationKind::Fallback => "You Might Also Like",
    };
    println!("{}", heading.bright_magenta().bold());
    print_products(&recommendations.products);
    Ok(())
}
