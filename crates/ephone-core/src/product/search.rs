//! Local product search.

use super::model::{Product, ProductId};
use std::collections::HashSet;

/// Case-insensitive substring match over title, description and category.
///
/// `query` is trimmed before matching; an empty query matches everything.
pub fn matches_query(product: &Product, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    matches_lowered(product, &needle)
}

fn matches_lowered(product: &Product, needle: &str) -> bool {
    product.title.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

/// Filters `products` with [`matches_query`], preserving order.
pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }
    products
        .iter()
        .filter(|product| matches_lowered(product, &needle))
        .cloned()
        .collect()
}

/// Drops repeated ids, keeping the first occurrence in its original position.
pub fn dedup_by_id(products: impl IntoIterator<Item = Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|product| seen.insert(product.id))
        .collect()
}

/// Resolves ids against `catalog`, keeping the order of `ids`.
///
/// Unknown and repeated ids are dropped.
pub fn resolve_ids(ids: &[ProductId], catalog: &[Product]) -> Vec<Product> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| catalog.iter().find(|product| product.id == *id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Cotton Jacket", "men's clothing", 55.99)
                .with_description("Great outerwear for spring"),
            Product::new(2, "Gold Ring", "jewelery", 168.0),
            Product::new(3, "SSD 1TB", "electronics", 109.0)
                .with_description("Fast JACKET-free storage"),
        ]
    }

    #[test]
    fn test_matches_is_case_insensitive_across_fields() {
        let products = catalog();
        let found = filter_products(&products, "JaCkEt");
        let ids: Vec<_> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let found = filter_products(&products, "JEWEL");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let products = catalog();
        assert_eq!(filter_products(&products, "   ").len(), 3);
        assert!(matches_query(&products[0], ""));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut products = catalog();
        products.push(Product::new(1, "Duplicate", "other", 1.0));
        products.insert(1, Product::new(3, "Early three", "other", 2.0));

        let deduped = dedup_by_id(products);
        let titles: Vec<_> = deduped.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Cotton Jacket", "Early three", "Gold Ring"]);
    }

    #[test]
    fn test_resolve_ids_keeps_requested_order() {
        let products = catalog();
        let resolved = resolve_ids(&[3, 99, 1, 3], &products);
        let ids: Vec<_> = resolved.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
