//! Shopping Assistant
//!
//! Turns catalog and cart data into prompts, sends them to a
//! [`TextGenerator`] and converts the replies back into products. Model
//! output is never trusted: ids are resolved against the catalog, unknown
//! ids are dropped, and every public entry point except [`converse`] has a
//! deterministic fallback.
//!
//! [`converse`]: ShoppingAssistant::converse

use ephone_core::cart::Cart;
use ephone_core::chat::ChatMessage;
use ephone_core::config::AssistantConfig;
use ephone_core::error::{EphoneError, Result};
use ephone_core::generation::TextGenerator;
use ephone_core::product::{Product, ProductId, filter_products, resolve_ids};
use ephone_interaction::{ParseError, PromptRenderer, parse_id_list};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Why an AI ranking could not be used.
#[derive(Debug, Clone, Error)]
pub enum RecommendationError {
    #[error("AI service failed: {0}")]
    Service(#[from] EphoneError),
    #[error("AI reply could not be parsed: {0}")]
    Parse(#[from] ParseError),
    #[error("AI reply named no known products")]
    NoKnownProducts,
}

/// Where a recommendation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RecommendationKind {
    /// Empty cart: the first catalog items.
    Popular,
    /// AI-ranked picks for the current cart.
    Personalized,
    /// Same-category picks used when the AI was unavailable.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub kind: RecommendationKind,
    pub products: Vec<Product>,
}

/// AI-backed recommendation, search and chat adapter.
pub struct ShoppingAssistant {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptRenderer,
    config: AssistantConfig,
}

impl ShoppingAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>, config: AssistantConfig) -> Result<Self> {
        Ok(Self {
            generator,
            prompts: PromptRenderer::new()?,
            config,
        })
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Recommends `recommendation_count` products for `cart`.
    ///
    /// An empty cart or catalog returns the first catalog items without
    /// calling the model. Otherwise the model's picks (in the model's order,
    /// limited to catalog products not already in the cart) are backfilled
    /// with the earliest remaining catalog items.
    pub async fn recommend(
        &self,
        cart: &Cart,
        catalog: &[Product],
    ) -> std::result::Result<Vec<Product>, RecommendationError> {
        let count = self.config.recommendation_count;
        if cart.is_empty() || catalog.is_empty() {
            return Ok(catalog.iter().take(count).cloned().collect());
        }

        let in_cart: HashSet<ProductId> = cart.products().map(|p| p.id).collect();
        let candidates = catalog.iter().filter(|p| !in_cart.contains(&p.id));
        let prompt = self.prompts.recommendation(cart.products(), candidates, count)?;

        let reply = self.generator.generate(&prompt).await?;
        let ids = parse_id_list(&reply)?;

        let mut picks: Vec<Product> = resolve_ids(&ids, catalog)
            .into_iter()
            .filter(|p| !in_cart.contains(&p.id))
            .take(count)
            .collect();

        if picks.len() < count {
            let chosen: HashSet<ProductId> = picks.iter().map(|p| p.id).collect();
            let backfill: Vec<Product> = catalog
                .iter()
                .filter(|p| !in_cart.contains(&p.id) && !chosen.contains(&p.id))
                .take(count - picks.len())
                .cloned()
                .collect();
            tracing::debug!(
                picked = picks.len(),
                backfilled = backfill.len(),
                "Backfilling recommendations"
            );
            picks.extend(backfill);
        }

        Ok(picks)
    }

    /// [`recommend`](Self::recommend), degrading to same-category products
    /// when the model fails.
    pub async fn recommend_or_fallback(&self, cart: &Cart, catalog: &[Product]) -> Recommendations {
        let kind = if cart.is_empty() {
            RecommendationKind::Popular
        } else {
            RecommendationKind::Personalized
        };

        match self.recommend(cart, catalog).await {
            Ok(products) => Recommendations { kind, products },
            Err(err) => {
                tracing::warn!(error = %err, "Recommendation failed, using category fallback");
                Recommendations {
                    kind: RecommendationKind::Fallback,
                    products: self.category_fallback(cart, catalog),
                }
            }
        }
    }

    /// Asks the model to rank `catalog` against `query`.
    ///
    /// Returns at most `search_result_limit` products in the model's order.
    /// A reply that names no catalog product is an error.
    pub async fn rank_search(
        &self,
        query: &str,
        catalog: &[Product],
    ) -> std::result::Result<Vec<Product>, RecommendationError> {
        let limit = self.config.search_result_limit;
        let prompt = self.prompts.smart_search(query, catalog, limit)?;
        let reply = self.generator.generate(&prompt).await?;
        let ids = parse_id_list(&reply)?;

        let mut ranked = resolve_ids(&ids, catalog);
        ranked.truncate(limit);
        if ranked.is_empty() {
            return Err(RecommendationError::NoKnownProducts);
        }
        Ok(ranked)
    }

    /// AI-ranked search that falls back to the local substring match.
    ///
    /// Both paths return at most `search_result_limit` products; an empty
    /// query returns the first catalog items.
    pub async fn smart_search(&self, query: &str, catalog: &[Product]) -> Vec<Product> {
        let limit = self.config.search_result_limit;
        if query.trim().is_empty() {
            return catalog.iter().take(limit).cloned().collect();
        }

        match self.rank_search(query, catalog).await {
            Ok(ranked) => ranked,
            Err(err) => {
                tracing::warn!(query, error = %err, "Smart search failed, using basic search");
                let mut results = filter_products(catalog, query);
                results.truncate(limit);
                results
            }
        }
    }

    /// Marketing copy for `product`, or its catalog description when the
    /// model is unavailable.
    pub async fn describe_product(&self, product: &Product) -> String {
        let generated = match self.prompts.product_description(product) {
            Ok(prompt) => self.generator.generate(&prompt).await,
            Err(err) => Err(err),
        };

        match generated {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => product.description.clone(),
            Err(err) => {
                tracing::warn!(product_id = product.id, error = %err, "Description generation failed");
                product.description.clone()
            }
        }
    }

    /// One chat turn. Errors are returned to the caller unchanged.
    ///
    /// Only the last `chat_history_window` messages of `history` and the
    /// first `chat_product_context` products are included in the prompt.
    pub async fn converse(
        &self,
        message: &str,
        history: &[ChatMessage],
        products: &[Product],
    ) -> Result<String> {
        let window = history.len().saturating_sub(self.config.chat_history_window);
        let context = &products[..products.len().min(self.config.chat_product_context)];
        let prompt = self.prompts.chat(message, &history[window..], context)?;

        let reply = self.generator.generate(&prompt).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(EphoneError::generation("AI returned an empty reply"));
        }
        Ok(reply.to_string())
    }

    fn category_fallback(&self, cart: &Cart, catalog: &[Product]) -> Vec<Product> {
        let in_cart: HashSet<ProductId> = cart.products().map(|p| p.id).collect();
        let categories: HashSet<&str> = cart.products().map(|p| p.category.as_str()).collect();
        catalog
            .iter()
            .filter(|p| categories.contains(p.category.as_str()) && !in_cart.contains(&p.id))
            .take(self.config.recommendation_count)
            .cloned()
            .collect()
    }
}
