//! Prompt templates for the shopping assistant.
//!
//! Templates are Jinja (minijinja) so wording can change without touching
//! the code that gathers the data. Product data is embedded as compact JSON
//! projections; full descriptions are only sent where ranking needs them.

use ephone_core::chat::ChatMessage;
use ephone_core::error::{EphoneError, Result};
use ephone_core::product::{Product, ProductId};
use minijinja::{Environment, context};
use serde::Serialize;

const RECOMMENDATION_TEMPLATE: &str = r#"You are a smart e-commerce recommendation AI.

Current cart items:
{{ cart }}

Available products:
{{ candidates }}

Analyze the user's shopping behavior and recommend {{ count }} product IDs that:
1. Complement items in their cart
2. Match their price range preference
3. Are highly rated
4. Make sense as a bundle or related purchase

Return ONLY a JSON array of {{ count }} product IDs, like: [1, 5, 8]
No explanations, just the array."#;

const SEARCH_TEMPLATE: &str = r#"You are a smart product search AI.

User search query: "{{ query }}"

Available products:
{{ candidates }}

Find the most relevant products matching the user's intent. Consider:
1. Direct keyword matches
2. Category relevance
3. Description context
4. Price range if mentioned

Return ONLY a JSON array of up to {{ limit }} product IDs, ordered by relevance: [1, 3, 7]"#;

const CHAT_TEMPLATE: &str = r#"You are a helpful e-commerce shopping assistant.
{% if products %}
Products currently in the store:
{% for p in products -%}
- #{{ p.id }} {{ p.title }} ({{ p.category }}) ${{ p.price }}
{% endfor %}{% endif %}{% if history %}
Conversation so far:
{% for m in history -%}
{{ m.role }}: {{ m.content }}
{% endfor %}{% endif %}
User question: {{ message }}

Provide a helpful, concise response (2-3 sentences). Be friendly and professional."#;

const DESCRIPTION_TEMPLATE: &str = r#"You are a professional e-commerce product copywriter.

Product: {{ product.title }}
Category: {{ product.category }}
Price: ${{ price }}
Current description: {{ product.description }}

Write a compelling, engaging product description (2-3 sentences) that:
1. Highlights key features
2. Appeals to potential buyers
3. Maintains a professional yet friendly tone

Return ONLY the description text, no quotes or formatting."#;

/// Cart entry as shown to the model: no id, no description.
#[derive(Debug, Serialize)]
struct CartSummaryEntry<'a> {
    title: &'a str,
    category: &'a str,
    price: f64,
    rating: f64,
}

#[derive(Debug, Serialize)]
struct RecommendationCandidate<'a> {
    id: ProductId,
    title: &'a str,
    category: &'a str,
    price: f64,
    rating: f64,
}

#[derive(Debug, Serialize)]
struct SearchCandidate<'a> {
    id: ProductId,
    title: &'a str,
    category: &'a str,
    description: &'a str,
    price: f64,
}

#[derive(Debug, Serialize)]
struct ProductLine<'a> {
    id: ProductId,
    title: &'a str,
    category: &'a str,
    price: String,
}

/// Renders every prompt the assistant sends.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("recommendation", RECOMMENDATION_TEMPLATE),
            ("search", SEARCH_TEMPLATE),
            ("chat", CHAT_TEMPLATE),
            ("description", DESCRIPTION_TEMPLATE),
        ] {
            env.add_template(name, source)
                .map_err(|e| EphoneError::internal(format!("Invalid prompt template {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Recommendation prompt: compact cart summary plus candidates.
    pub fn recommendation<'a>(
        &self,
        cart: impl IntoIterator<Item = &'a Product>,
        candidates: impl IntoIterator<Item = &'a Product>,
        count: usize,
    ) -> Result<String> {
        let cart: Vec<_> = cart
            .into_iter()
            .map(|p| CartSummaryEntry {
                title: &p.title,
                category: &p.category,
                price: p.price,
                rating: p.rating.rate,
            })
            .collect();
        let candidates: Vec<_> = candidates
            .into_iter()
            .map(|p| RecommendationCandidate {
                id: p.id,
                title: &p.title,
                category: &p.category,
                price: p.price,
                rating: p.rating.rate,
            })
            .collect();

        self.render(
            "recommendation",
            context! {
                cart => to_json(&cart)?,
                candidates => to_json(&candidates)?,
                count => count,
            },
        )
    }

    /// Search ranking prompt over the given candidates.
    pub fn smart_search(&self, query: &str, candidates: &[Product], limit: usize) -> Result<String> {
        let candidates: Vec<_> = candidates
            .iter()
            .map(|p| SearchCandidate {
                id: p.id,
                title: &p.title,
                category: &p.category,
                description: &p.description,
                price: p.price,
            })
            .collect();

        self.render(
            "search",
            context! {
                query => query,
                candidates => to_json(&candidates)?,
                limit => limit,
            },
        )
    }

    /// Chat prompt with prior transcript and optional product context.
    pub fn chat(&self, message: &str, history: &[ChatMessage], products: &[Product]) -> Result<String> {
        let products: Vec<_> = products
            .iter()
            .map(|p| ProductLine {
                id: p.id,
                title: &p.title,
                category: &p.category,
                price: format!("{:.2}", p.price),
            })
            .collect();

        self.render(
            "chat",
            context! {
                message => message,
                history => history,
                products => products,
            },
        )
    }

    /// Copywriting prompt for a single product.
    pub fn product_description(&self, product: &Product) -> Result<String> {
        self.render(
            "description",
            context! {
                product => product,
                price => format!("{:.2}", product.price),
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| EphoneError::internal(format!("Failed to render prompt {name}: {e}")))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
