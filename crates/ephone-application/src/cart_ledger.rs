//! Cart Ledger
//!
//! The authoritative, persisted cart. Mutations apply to the in-memory
//! [`Cart`] immediately and schedule a background write of the full
//! snapshot; storage problems are logged and never reach the caller.

use crate::persistence::{SnapshotWriter, load_snapshot};
use ephone_core::cart::{Cart, PriceSummary};
use ephone_core::product::{Product, ProductId};
use ephone_core::storage::{CART_STORAGE_KEY, KeyValueStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Persisted shopping cart shared by every screen that shows or edits it.
///
/// Construct it with [`CartLedger::load`]: the persisted snapshot is read
/// before the ledger exists, so no save can run ahead of the load and
/// overwrite a previous session's cart with an empty one.
pub struct CartLedger {
    cart: Mutex<Cart>,
    writer: SnapshotWriter,
}

impl CartLedger {
    /// Restores the cart from `store` and starts its snapshot writer.
    ///
    /// Unreadable or corrupt snapshots are logged and the ledger starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let cart = match load_snapshot::<Cart>(store.as_ref(), CART_STORAGE_KEY).await {
            Ok(Some(cart)) => {
                tracing::info!(lines = cart.len(), items = cart.total_items(), "Restored cart");
                cart
            }
            Ok(None) => Cart::new(),
            Err(err) => {
                tracing::error!(error = %err, "Error loading cart, starting empty");
                Cart::new()
            }
        };

        Self {
            cart: Mutex::new(cart),
            writer: SnapshotWriter::spawn(store, CART_STORAGE_KEY),
        }
    }

    /// Current cart contents.
    pub fn cart(&self) -> Cart {
        self.lock().clone()
    }

    pub fn total_items(&self) -> u64 {
        self.lock().total_items()
    }

    pub fn total_price(&self) -> f64 {
        self.lock().total_price()
    }

    pub fn price_summary(&self, tax: Option<f64>, shipping: Option<f64>) -> PriceSummary {
        self.lock().price_summary(tax, shipping)
    }

    /// Adds one unit of `product`, appending a new line if needed.
    pub fn add_to_cart(&self, product: &Product) -> Cart {
        self.mutate("add", |cart| {
            let quantity = cart.add(product);
            tracing::debug!(product_id = product.id, quantity, "Added to cart");
            true
        })
    }

    /// Sets a line's quantity exactly; `quantity <= 0` removes the line.
    pub fn update_quantity(&self, id: ProductId, quantity: i64) -> Cart {
        self.mutate("update_quantity", |cart| cart.update_quantity(id, quantity))
    }

    pub fn remove_from_cart(&self, id: ProductId) -> Cart {
        self.mutate("remove", |cart| cart.remove(id))
    }

    pub fn clear_cart(&self) -> Cart {
        self.mutate("clear", Cart::clear)
    }

    /// Waits for every scheduled snapshot write to be attempted.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn mutate(&self, action: &'static str, apply: impl FnOnce(&mut Cart) -> bool) -> Cart {
        let mut cart = self.lock();
        if apply(&mut cart) {
            // Scheduled under the lock so writes reach the writer in mutation order.
            self.writer.save(&*cart);
        } else {
            tracing::debug!(action, "Cart unchanged");
        }
        cart.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, RecordingStore, product};

    async fn persisted_cart(store: &RecordingStore) -> Option<Cart> {
        load_snapshot(store, CART_STORAGE_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_merges_quantities() {
        let ledger = CartLedger::load(Arc::new(RecordingStore::default())).await;
        let p1 = product(1, "Backpack", "bags");
        let p2 = product(2, "Shirt", "men's clothing");

        ledger.add_to_cart(&p1);
        ledger.add_to_cart(&p1);
        let cart = ledger.add_to_cart(&p2);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(1), Some(2));
        assert_eq!(cart.quantity_of(2), Some(1));
        assert_eq!(ledger.total_items(), 3);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let store = Arc::new(RecordingStore::default());
        let ledger = CartLedger::load(store.clone()).await;

        ledger.add_to_cart(&product(1, "Backpack", "bags"));
        ledger.add_to_cart(&product(2, "Shirt", "men's clothing"));
        ledger.update_quantity(2, 4);
        ledger.flush().await;

        let stored = persisted_cart(&store).await.unwrap();
        assert_eq!(stored, ledger.cart());
        assert_eq!(stored.quantity_of(2), Some(4));
    }

    #[tokio::test]
    async fn test_reload_restores_previous_session() {
        let store = Arc::new(RecordingStore::default());
        {
            let ledger = CartLedger::load(store.clone()).await;
            ledger.add_to_cart(&product(3, "Ring", "jewelery"));
            ledger.add_to_cart(&product(1, "Backpack", "bags"));
            ledger.add_to_cart(&product(3, "Ring", "jewelery"));
            ledger.flush().await;
        }

        let restored = CartLedger::load(store.clone()).await;
        let cart = restored.cart();
        let lines: Vec<_> = cart.lines().iter().map(|l| (l.id(), l.quantity)).collect();
        assert_eq!(lines, vec![(3, 2), (1, 1)]);
    }

    #[tokio::test]
    async fn test_loading_never_overwrites_stored_cart() {
        let store = Arc::new(RecordingStore::default());
        let mut seeded = Cart::new();
        seeded.add(&product(9, "Lamp", "home"));
        store
            .set(CART_STORAGE_KEY, serde_json::to_vec(&seeded).unwrap())
            .await
            .unwrap();

        let ledger = CartLedger::load(store.clone()).await;
        ledger.flush().await;

        assert_eq!(store.sets(), 1);
        assert_eq!(ledger.cart(), seeded);
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_write() {
        let store = Arc::new(RecordingStore::default());
        let ledger = CartLedger::load(store.clone()).await;

        ledger.remove_from_cart(42);
        ledger.update_quantity(42, 3);
        ledger.clear_cart();
        ledger.flush().await;

        assert_eq!(store.sets(), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_line() {
        let ledger = CartLedger::load(Arc::new(RecordingStore::default())).await;
        ledger.add_to_cart(&product(1, "Backpack", "bags"));

        let cart = ledger.update_quantity(1, 0);
        assert!(cart.is_empty());
        assert_eq!(ledger.total_price(), 0.0);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_in_memory_state() {
        let ledger = CartLedger::load(Arc::new(FailingStore)).await;

        let cart = ledger.add_to_cart(&product(1, "Backpack", "bags"));
        ledger.flush().await;

        assert_eq!(cart.total_items(), 1);
        assert_eq!(ledger.cart().total_items(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let store = Arc::new(RecordingStore::default());
        store
            .set(CART_STORAGE_KEY, b"{ definitely not a cart".to_vec())
            .await
            .unwrap();

        let ledger = CartLedger::load(store).await;
        assert!(ledger.cart().is_empty());
    }

    #[tokio::test]
    async fn test_price_summary_matches_totals() {
        let ledger = CartLedger::load(Arc::new(RecordingStore::default())).await;
        ledger.add_to_cart(&product(1, "Backpack", "bags"));
        ledger.add_to_cart(&product(1, "Backpack", "bags"));

        let summary = ledger.price_summary(None, Some(5.0));
        assert_eq!(summary.subtotal, ledger.total_price());
        assert_eq!(summary.total, ledger.total_price() + 5.0);
    }
}
