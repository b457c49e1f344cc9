//! Terminal rendering shared by the subcommands.

use colored::Colorize;
use ephone_core::cart::{Cart, PriceSummary};
use ephone_core::chat::{ChatMessage, ChatRole};
use ephone_core::product::Product;

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("{}", "No products found.".bright_black());
        return;
    }
    for product in products {
        println!(
            "{:>4}  {:<48}  {:>9}  {}",
            format!("#{}", product.id).bright_black(),
            truncate(&product.title, 48),
            format!("${:.2}", product.price).green(),
            product.category.cyan()
        );
    }
}

pub fn print_product_detail(product: &Product, description: &str) {
    println!("{}", product.title.bold());
    println!(
        "{}  {}  {} ({} ratings)",
        format!("${:.2}", product.price).green().bold(),
        product.category.cyan(),
        format!("★ {:.1}", product.rating.rate).yellow(),
        product.rating.count
    );
    println!();
    println!("{description}");
}

pub fn print_cart(cart: &Cart, summary: &PriceSummary) {
    if cart.is_empty() {
        println!("{}", "Your cart is empty.".bright_black());
        return;
    }
    for line in cart.lines() {
        println!(
            "{:>4}  {:<40}  {:>3} x {:>9}  {:>10}",
            format!("#{}", line.id()).bright_black(),
            truncate(&line.product.title, 40),
            line.quantity,
            format!("${:.2}", line.product.price),
            format!("${:.2}", line.line_total()).green()
        );
    }
    println!();
    println!("{:>16} {:>10}", "Items:", cart.total_items());
    println!("{:>16} {:>10}", "Subtotal:", format!("${:.2}", summary.subtotal));
    println!("{:>16} {:>10}", "Tax:", format!("${:.2}", summary.tax));
    println!(
        "{:>16} {:>10}",
        "Shipping:",
        if summary.shipping == 0.0 {
            "Free".to_string()
        } else {
            format!("${:.2}", summary.shipping)
        }
    );
    println!(
        "{:>16} {:>10}",
        "Total:".bold(),
        format!("${:.2}", summary.total).green().bold()
    );
}

pub fn print_message(message: &ChatMessage) {
    match message.role {
        ChatRole::User => println!("{}", format!("> {}", message.content).green()),
        ChatRole::Assistant => println!("{}", message.content.bright_white()),
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }
}
