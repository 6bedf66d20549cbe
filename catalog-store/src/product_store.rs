//! Product state store.
//!
//! Holds the cached product collection and the current selection, and
//! reconciles data client results into them. Consumers read a derived
//! [`ProductView`] and observe changes through a watch channel.
//!
//! Three channels feed the view:
//!
//! - list fetch ([`ProductStore::load_products`])
//! - single fetch ([`ProductStore::load_product`])
//! - mutations (create, update, delete), serialized through one lane
//!
//! No operation returns an error. Failures are stored as messages and
//! surface through [`ProductView::error`].
//!
//! Operations may be cancelled by dropping their future. The request's
//! loading state is then settled as if it had never been issued.

use catalog_core::{NewProduct, Navigator, Product, ProductId, ProductPatch, Rating, Route};
use catalog_fetch::{FetchError, ProductApi};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use crate::channel::{Channel, MutationState, RequestStatus};

/// Rating stamped on newly created products. The create response is not
/// trusted for this field.
// Placeholder, kept literally for compatibility.
pub const CREATED_PRODUCT_RATING: Rating = Rating::new(0.0, 0);

/// Rating stamped on updated products, since the update endpoint never
/// returns one.
// Placeholder, kept literally for compatibility.
pub const UPDATED_PRODUCT_RATING: Rating = Rating::new(3.2, 120);

/// Selection id meaning "nothing selected".
pub const NO_SELECTION: ProductId = 0;

const CREATE_FAILED: &str = "Failed to create product";
const UPDATE_FAILED: &str = "Failed to update product";
const DELETE_FAILED: &str = "Failed to delete product";

// ============================================================================
// View
// ============================================================================

/// Derived, read-only view of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// All known products, empty before the first load.
    pub products: Vec<Product>,
    /// The selected product, once fetched.
    pub selected_product: Option<Product>,
    /// True while any channel has a request in flight.
    pub loading: bool,
    /// First error among list fetch, single fetch, last mutation.
    pub error: Option<String>,
}

// ============================================================================
// Inner State
// ============================================================================

#[derive(Debug, Default)]
struct StoreInner {
    products: Channel<Vec<Product>>,
    selected_id: ProductId,
    selected: Channel<Product>,
    mutation: MutationState,
}

impl StoreInner {
    fn products(&self) -> Vec<Product> {
        self.products.value().cloned().unwrap_or_default()
    }

    fn selected_product(&self) -> Option<Product> {
        if self.selected_id == NO_SELECTION {
            return None;
        }
        self.selected.value().cloned()
    }

    fn loading(&self) -> bool {
        self.products.is_loading() || self.selected.is_loading() || self.mutation.is_loading()
    }

    fn error(&self) -> Option<String> {
        self.products
            .error()
            .or_else(|| self.selected.error())
            .or_else(|| self.mutation.error())
            .map(ToString::to_string)
    }

    fn view(&self) -> ProductView {
        ProductView {
            products: self.products(),
            selected_product: self.selected_product(),
            loading: self.loading(),
            error: self.error(),
        }
    }

    fn abandon(&mut self, track: Track) -> bool {
        match track {
            Track::List(generation) => self.products.abandon(generation),
            Track::Single(generation) => self.selected.abandon(generation),
            Track::Mutation => {
                self.mutation.abandon();
                true
            }
        }
    }
}

// ============================================================================
// In-flight Guard
// ============================================================================

/// Request track an [`InFlight`] guard settles.
#[derive(Debug, Clone, Copy)]
enum Track {
    List(u64),
    Single(u64),
    Mutation,
}

/// Settles a request's loading state when its future is dropped before the
/// result is applied.
struct InFlight {
    inner: Arc<RwLock<StoreInner>>,
    notify: Arc<watch::Sender<u64>>,
    track: Option<Track>,
}

impl InFlight {
    /// Marks the result as applied. Call while holding the write lock.
    fn disarm(&mut self) {
        self.track = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(track) = self.track.take() else {
            return;
        };
        debug!(?track, "Request dropped before completion");

        if let Ok(mut inner) = self.inner.try_write() {
            let changed = inner.abandon(track);
            drop(inner);
            if changed {
                bump_version(&self.notify);
            }
            return;
        }

        // Lock is busy; settle from a task instead.
        let inner = Arc::clone(&self.inner);
        let notify = Arc::clone(&self.notify);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if inner.write().await.abandon(track) {
                        bump_version(&notify);
                    }
                });
            }
            Err(_) => warn!(?track, "No runtime to settle dropped request"),
        }
    }
}

fn bump_version(notify: &watch::Sender<u64>) {
    notify.send_modify(|version| *version += 1);
}

// ============================================================================
// Product Store
// ============================================================================

/// State store for the product catalog.
///
/// Construct once and share by `Arc` with every view that needs it.
pub struct ProductStore {
    api: Arc<dyn ProductApi>,
    navigator: Arc<dyn Navigator>,
    inner: Arc<RwLock<StoreInner>>,
    mutation_lane: Mutex<()>,
    notify: Arc<watch::Sender<u64>>,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("version", &*self.notify.borrow())
            .finish_non_exhaustive()
    }
}

impl ProductStore {
    /// Creates a store with an empty collection and no selection.
    pub fn new(api: Arc<dyn ProductApi>, navigator: Arc<dyn Navigator>) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            api,
            navigator,
            inner: Arc::new(RwLock::new(StoreInner::default())),
            mutation_lane: Mutex::new(()),
            notify: Arc::new(notify),
        }
    }

    // ========================================================================
    // State Access
    // ========================================================================

    /// Returns a consistent view of all derived fields.
    pub async fn snapshot(&self) -> ProductView {
        self.inner.read().await.view()
    }

    /// All known products.
    pub async fn products(&self) -> Vec<Product> {
        self.inner.read().await.products()
    }

    /// The selected product, if one is selected and fetched.
    pub async fn selected_product(&self) -> Option<Product> {
        self.inner.read().await.selected_product()
    }

    /// The current selection id ([`NO_SELECTION`] when none).
    pub async fn selected_id(&self) -> ProductId {
        self.inner.read().await.selected_id
    }

    /// True while any request is in flight.
    pub async fn loading(&self) -> bool {
        self.inner.read().await.loading()
    }

    /// The first error message across channels.
    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error()
    }

    /// Error of the most recent mutation, if it failed.
    pub async fn mutation_error(&self) -> Option<String> {
        self.inner.read().await.mutation.error().map(ToString::to_string)
    }

    /// Status of the list channel.
    pub async fn list_status(&self) -> RequestStatus {
        self.inner.read().await.products.status()
    }

    // ========================================================================
    // Fetch Operations
    // ========================================================================

    /// (Re-)executes the list fetch.
    ///
    /// A newer call supersedes an older in-flight one; the older response is
    /// discarded when it arrives.
    pub async fn load_products(&self) {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.products.begin(true)
        };
        let mut guard = self.in_flight(Track::List(generation));
        self.notify_change();
        debug!(generation, "Loading products");

        let result = self.api.list().await;

        let applied = {
            let mut inner = self.inner.write().await;
            guard.disarm();
            match result {
                Ok(products) => {
                    debug!(count = products.len(), "Products loaded");
                    inner.products.succeed(generation, products)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load products");
                    inner.products.fail(generation, e.message())
                }
            }
        };

        if applied {
            self.notify_change();
        } else {
            debug!(generation, "Discarded superseded product list response");
        }
    }

    /// Selects `id` and (re-)executes the single fetch for it.
    ///
    /// [`NO_SELECTION`] clears the selection without a network call.
    pub async fn load_product(&self, id: ProductId) {
        let generation = {
            let mut inner = self.inner.write().await;
            let same_product = inner.selected.value().is_some_and(|p| p.id == id);
            inner.selected_id = id;
            if id == NO_SELECTION {
                inner.selected.reset();
                None
            } else {
                Some(inner.selected.begin(same_product))
            }
        };
        self.notify_change();

        let Some(generation) = generation else {
            debug!("Selection cleared");
            return;
        };
        let mut guard = self.in_flight(Track::Single(generation));
        debug!(id, generation, "Loading product");

        let result = self.api.get(id).await;

        let applied = {
            let mut inner = self.inner.write().await;
            guard.disarm();
            match result {
                Ok(product) => inner.selected.succeed(generation, product),
                Err(e) => {
                    warn!(id, error = %e, "Failed to load product");
                    inner.selected.fail(generation, e.message())
                }
            }
        };

        if applied {
            self.notify_change();
        } else {
            debug!(id, generation, "Discarded superseded product response");
        }
    }

    /// Clears the selection. Any in-flight single fetch is discarded.
    pub async fn clear_selected_product(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.selected_id = NO_SELECTION;
            inner.selected.reset();
        }
        self.notify_change();
    }

    /// Drops the data client's cache, then reloads the list.
    pub async fn refresh_cache(&self) {
        info!("Refreshing product cache");
        self.api.invalidate_cache().await;
        self.load_products().await;
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Creates a product.
    ///
    /// On success the server record, with its rating reset to
    /// [`CREATED_PRODUCT_RATING`], is appended to the collection and the
    /// store navigates to the product list.
    pub async fn create_product(&self, product: NewProduct) {
        let guard = self.begin_mutation().await;
        let _lane = self.mutation_lane.lock().await;
        debug!(title = %product.title, "Creating product");

        match self.api.create(&product).await {
            Ok(created) => {
                let created = created.with_rating(CREATED_PRODUCT_RATING);
                let id = created.id;
                self.finish_mutation(guard, |inner| {
                    inner.products.update(|products| products.push(created));
                })
                .await;
                info!(id, "Product created");
                self.navigator.navigate(Route::ProductList);
            }
            Err(e) => self.fail_mutation(guard, &e, CREATE_FAILED).await,
        }
    }

    /// Updates product `id` with the fields in `patch`.
    ///
    /// On success the returned record, with its rating replaced by
    /// [`UPDATED_PRODUCT_RATING`], replaces the element with the same id
    /// and the store navigates to the product list.
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) {
        let guard = self.begin_mutation().await;
        let _lane = self.mutation_lane.lock().await;
        debug!(id, "Updating product");

        match self.api.update(id, &patch).await {
            Ok(updated) => {
                let updated = updated.with_rating(UPDATED_PRODUCT_RATING);
                self.finish_mutation(guard, |inner| {
                    // Nothing to reconcile before the first list load.
                    if inner.products.value().is_some() {
                        inner.products.update(|products| {
                            for product in products.iter_mut().filter(|p| p.id == id) {
                                *product = updated.clone();
                            }
                        });
                    }
                })
                .await;
                info!(id, "Product updated");
                self.navigator.navigate(Route::ProductList);
            }
            Err(e) => self.fail_mutation(guard, &e, UPDATE_FAILED).await,
        }
    }

    /// Deletes product `id`.
    ///
    /// On success the element is removed from the collection and the store
    /// navigates to the product list.
    pub async fn delete_product(&self, id: ProductId) {
        let guard = self.begin_mutation().await;
        let _lane = self.mutation_lane.lock().await;
        debug!(id, "Deleting product");

        match self.api.delete(id).await {
            Ok(()) => {
                self.finish_mutation(guard, |inner| {
                    if inner.products.value().is_some() {
                        inner.products.update(|products| products.retain(|p| p.id != id));
                    }
                })
                .await;
                info!(id, "Product deleted");
                self.navigator.navigate(Route::ProductList);
            }
            Err(e) => self.fail_mutation(guard, &e, DELETE_FAILED).await,
        }
    }

    async fn begin_mutation(&self) -> InFlight {
        self.inner.write().await.mutation.begin();
        self.notify_change();
        self.in_flight(Track::Mutation)
    }

    async fn finish_mutation<F>(&self, mut guard: InFlight, reconcile: F)
    where
        F: FnOnce(&mut StoreInner),
    {
        {
            let mut inner = self.inner.write().await;
            guard.disarm();
            reconcile(&mut inner);
            inner.mutation.succeed();
        }
        self.notify_change();
    }

    async fn fail_mutation(&self, mut guard: InFlight, error: &FetchError, fallback: &str) {
        let message = error.message().unwrap_or_else(|| fallback.to_string());
        warn!(error = %message, "Mutation failed");
        {
            let mut inner = self.inner.write().await;
            guard.disarm();
            inner.mutation.fail(message);
        }
        self.notify_change();
    }

    fn in_flight(&self, track: Track) -> InFlight {
        InFlight {
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
            track: Some(track),
        }
    }

    // ========================================================================
    // Observable
    // ========================================================================

    /// Subscribes to store changes. The value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        bump_version(&self.notify);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Router;
    use crate::testing::MockApi;
    use catalog_core::NoopNavigator;
    use std::time::Duration;

    fn product(id: ProductId) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            price: 10.0 * id as f64,
            description: "d".to_string(),
            category: "c".to_string(),
            image: "i".to_string(),
            rating: Rating::new(4.5, 10),
        }
    }

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            price: 9.99,
            description: "d".to_string(),
            category: "c".to_string(),
            image: "i".to_string(),
            rating: Rating::new(5.0, 999),
        }
    }

    fn store_with(api: Arc<MockApi>) -> (ProductStore, Arc<Router>) {
        let router = Arc::new(Router::default());
        (ProductStore::new(api, router.clone()), router)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let store = ProductStore::new(Arc::new(MockApi::default()), Arc::new(NoopNavigator));
        let view = store.snapshot().await;
        assert!(view.products.is_empty());
        assert!(view.selected_product.is_none());
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(store.selected_id().await, NO_SELECTION);
    }

    #[tokio::test]
    async fn test_load_products() {
        let api = Arc::new(MockApi::with_products(vec![product(1), product(2)]));
        let (store, _) = store_with(api.clone());

        store.load_products().await;
        assert_eq!(store.products().await.len(), 2);
        assert_eq!(store.list_status().await, RequestStatus::Success);
        assert!(!store.loading().await);
        assert_eq!(api.call_count("list"), 1);
    }

    #[tokio::test]
    async fn test_load_products_failure_sets_error() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api.clone());
        store.load_products().await;

        api.fail_next(FetchError::Other("network down".to_string()));
        store.load_products().await;

        let view = store.snapshot().await;
        assert_eq!(view.error.as_deref(), Some("network down"));
        assert!(!view.loading);
        // The last good collection stays visible.
        assert_eq!(view.products.len(), 1);
    }

    #[tokio::test]
    async fn test_newer_list_fetch_supersedes_older() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("list", Duration::from_millis(50));
        let (store, _) = store_with(api.clone());

        let slow = store.load_products();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            api.set_products(vec![product(1), product(2), product(3)]);
            store.load_products().await;
        };
        tokio::join!(slow, fast);

        // The slow first response (one product) arrived last but was dropped.
        assert_eq!(store.products().await.len(), 3);
        assert!(!store.loading().await);
    }

    #[tokio::test]
    async fn test_load_product_selects() {
        let api = Arc::new(MockApi::with_products(vec![product(1), product(2)]));
        let (store, _) = store_with(api.clone());

        store.load_product(2).await;
        assert_eq!(store.selected_id().await, 2);
        assert_eq!(store.selected_product().await.map(|p| p.id), Some(2));
    }

    #[tokio::test]
    async fn test_load_product_zero_skips_network() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api.clone());

        store.load_product(1).await;
        store.load_product(NO_SELECTION).await;

        assert!(store.selected_product().await.is_none());
        assert_eq!(api.call_count("get"), 1);
    }

    #[tokio::test]
    async fn test_load_missing_product_sets_error() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api);

        store.load_product(42).await;
        let view = store.snapshot().await;
        assert!(view.selected_product.is_none());
        assert_eq!(view.error.as_deref(), Some("Product 42 not found"));
    }

    #[tokio::test]
    async fn test_clear_selection_discards_late_response() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("get", Duration::from_millis(40));
        let (store, _) = store_with(api);

        let load = store.load_product(1);
        let clear = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.clear_selected_product().await;
        };
        tokio::join!(load, clear);

        assert!(store.selected_product().await.is_none());
        assert_eq!(store.selected_id().await, NO_SELECTION);
        assert!(!store.loading().await);
    }

    #[tokio::test]
    async fn test_clear_selection_always_empties() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api);

        store.clear_selected_product().await;
        assert!(store.selected_product().await.is_none());

        store.load_product(1).await;
        store.clear_selected_product().await;
        assert!(store.selected_product().await.is_none());
    }

    #[tokio::test]
    async fn test_create_appends_with_empty_rating() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, router) = store_with(api);
        store.load_products().await;

        store.create_product(new_product("Lamp")).await;
        store.create_product(new_product("Desk")).await;

        let products = store.products().await;
        assert_eq!(products.len(), 3);
        let lamp = products.iter().find(|p| p.title == "Lamp").unwrap();
        assert_eq!(lamp.rating, Rating::new(0.0, 0));
        assert!(products.iter().filter(|p| p.id != 1).all(|p| p.rating == CREATED_PRODUCT_RATING));

        let view = store.snapshot().await;
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(router.current(), Route::ProductList);
    }

    #[tokio::test]
    async fn test_create_before_first_load_starts_collection() {
        let api = Arc::new(MockApi::default());
        let (store, _) = store_with(api);

        store.create_product(new_product("Lamp")).await;
        assert_eq!(store.products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_before_first_load_leave_list_idle() {
        let api = Arc::new(MockApi::with_products(vec![product(1), product(2)]));
        let (store, router) = store_with(api.clone());

        store
            .update_product(
                1,
                ProductPatch {
                    price: Some(1.0),
                    ..Default::default()
                },
            )
            .await;
        store.delete_product(2).await;

        assert!(store.products().await.is_empty());
        assert_eq!(store.list_status().await, RequestStatus::Idle);
        assert_eq!(router.current(), Route::ProductList);

        store.load_products().await;
        assert_eq!(store.products().await.len(), 1);
        assert_eq!(store.products().await[0].price, 1.0);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_collection() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, router) = store_with(api.clone());
        store.load_products().await;
        let before = router.history().len();

        api.fail_next(FetchError::server(409, "duplicate title"));
        store.create_product(new_product("Lamp")).await;

        let view = store.snapshot().await;
        assert_eq!(view.error.as_deref(), Some("duplicate title"));
        assert!(!view.loading);
        assert_eq!(view.products, vec![product(1)]);
        assert_eq!(router.history().len(), before);
    }

    #[tokio::test]
    async fn test_mutation_failure_uses_fallback_message() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, router) = store_with(api.clone());
        store.load_products().await;
        let history = router.history();

        api.fail_next(FetchError::server(500, ""));
        store.create_product(new_product("Lamp")).await;
        assert_eq!(store.error().await.as_deref(), Some("Failed to create product"));

        api.fail_next(FetchError::Other(String::new()));
        store
            .update_product(
                1,
                ProductPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(store.error().await.as_deref(), Some("Failed to update product"));
        assert_eq!(store.products().await, vec![product(1)]);
        assert_eq!(router.history(), history);

        api.fail_next(FetchError::Other(" ".to_string()));
        store.delete_product(1).await;
        assert_eq!(store.error().await.as_deref(), Some("Failed to delete product"));
        assert_eq!(store.products().await, vec![product(1)]);
        assert_eq!(router.history(), history);
        assert!(!store.loading().await);
    }

    #[tokio::test]
    async fn test_dropped_create_settles_loading() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("create", Duration::from_millis(200));
        let (store, router) = store_with(api.clone());
        store.load_products().await;
        let history = router.history();

        let result =
            tokio::time::timeout(Duration::from_millis(20), store.create_product(new_product("Lamp"))).await;
        assert!(result.is_err());

        let view = store.snapshot().await;
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.products, vec![product(1)]);
        assert_eq!(router.history(), history);

        // The lane is free for the next mutation.
        store.delete_product(1).await;
        assert!(store.products().await.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_queued_mutation_settles_loading() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("update", Duration::from_millis(60));
        let (store, _) = store_with(api.clone());
        store.load_products().await;

        let first = store.update_product(
            1,
            ProductPatch {
                title: Some("first".to_string()),
                ..Default::default()
            },
        );
        let queued = async {
            let result =
                tokio::time::timeout(Duration::from_millis(10), store.create_product(new_product("Lamp"))).await;
            assert!(result.is_err());
            // The update is still in flight.
            assert!(store.loading().await);
        };
        tokio::join!(first, queued);

        assert!(!store.loading().await);
        assert_eq!(api.call_count("create"), 0);
        assert_eq!(store.products().await[0].title, "first");
    }

    #[tokio::test]
    async fn test_dropped_list_load_settles_loading() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("list", Duration::from_millis(200));
        let (store, _) = store_with(api.clone());

        let result = tokio::time::timeout(Duration::from_millis(20), store.load_products()).await;
        assert!(result.is_err());
        assert!(!store.loading().await);
        assert_eq!(store.list_status().await, RequestStatus::Idle);

        store.load_products().await;
        api.delay_next("list", Duration::from_millis(200));
        let result = tokio::time::timeout(Duration::from_millis(20), store.load_products()).await;
        assert!(result.is_err());

        // The last good collection stays, with nothing in flight.
        assert!(!store.loading().await);
        assert_eq!(store.list_status().await, RequestStatus::Success);
        assert_eq!(store.products().await, vec![product(1)]);
    }

    #[tokio::test]
    async fn test_dropped_product_load_settles_loading() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("get", Duration::from_millis(200));
        let (store, _) = store_with(api);

        let result = tokio::time::timeout(Duration::from_millis(20), store.load_product(1)).await;
        assert!(result.is_err());

        let view = store.snapshot().await;
        assert!(!view.loading);
        assert!(view.selected_product.is_none());
        assert_eq!(store.selected_id().await, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_element_with_placeholder_rating() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        // The update endpoint answers without a rating.
        api.set_update_response(Product {
            id: 1,
            title: "X".to_string(),
            price: 50.0,
            description: "d".to_string(),
            category: "c".to_string(),
            image: "i".to_string(),
            rating: Rating::empty(),
        });
        let (store, router) = store_with(api);
        store.load_products().await;

        let patch = ProductPatch {
            price: Some(50.0),
            ..Default::default()
        };
        store.update_product(1, patch).await;

        let expected = Product {
            id: 1,
            title: "X".to_string(),
            price: 50.0,
            description: "d".to_string(),
            category: "c".to_string(),
            image: "i".to_string(),
            rating: Rating::new(3.2, 120),
        };
        assert_eq!(store.products().await, vec![expected]);
        assert_eq!(router.current(), Route::ProductList);
    }

    #[tokio::test]
    async fn test_update_does_not_refetch_selection() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api.clone());
        store.load_products().await;
        store.load_product(1).await;

        let patch = ProductPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        store.update_product(1, patch).await;

        assert_eq!(store.products().await[0].title, "Renamed");
        assert_eq!(store.selected_product().await.unwrap().title, "Product 1");
        assert_eq!(api.call_count("get"), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_by_id() {
        let api = Arc::new(MockApi::with_products(vec![product(1), product(2)]));
        let (store, router) = store_with(api);
        store.load_products().await;

        store.delete_product(1).await;
        let products = store.products().await;
        assert_eq!(products.len(), 1);
        assert!(products.iter().all(|p| p.id != 1));
        assert_eq!(router.current(), Route::ProductList);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_length() {
        let api = Arc::new(MockApi::with_products(vec![product(1), product(2)]));
        let (store, _) = store_with(api.clone());
        store.load_products().await;

        // The server accepts the delete of an id the cache never saw.
        api.insert_remote(product(9));
        store.delete_product(9).await;
        assert_eq!(store.products().await.len(), 2);
    }

    #[tokio::test]
    async fn test_error_precedence() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api.clone());

        api.fail_next(FetchError::Other("mutation failed".to_string()));
        store.delete_product(1).await;
        assert_eq!(store.error().await.as_deref(), Some("mutation failed"));

        store.load_product(77).await;
        assert_eq!(store.error().await.as_deref(), Some("Product 77 not found"));

        api.fail_next(FetchError::Other("list failed".to_string()));
        store.load_products().await;
        assert_eq!(store.error().await.as_deref(), Some("list failed"));
    }

    #[tokio::test]
    async fn test_mutations_are_serialized() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        api.delay_next("update", Duration::from_millis(30));
        let (store, _) = store_with(api.clone());
        store.load_products().await;

        let first = store.update_product(
            1,
            ProductPatch {
                title: Some("first".to_string()),
                ..Default::default()
            },
        );
        let second = store.update_product(
            1,
            ProductPatch {
                title: Some("second".to_string()),
                ..Default::default()
            },
        );
        let observe = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert!(store.loading().await);
        };
        tokio::join!(first, second, observe);

        assert_eq!(store.products().await[0].title, "second");
        assert_eq!(api.call_count("update"), 2);
        assert!(!store.loading().await);
    }

    #[tokio::test]
    async fn test_refresh_cache_invalidates_then_loads() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api.clone());

        store.refresh_cache().await;
        assert_eq!(api.call_count("invalidate_cache"), 1);
        assert_eq!(api.call_count("list"), 1);
        assert_eq!(store.products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let api = Arc::new(MockApi::with_products(vec![product(1)]));
        let (store, _) = store_with(api);
        let mut rx = store.subscribe();

        store.load_products().await;
        assert!(rx.has_changed().unwrap());
        let version = *rx.borrow_and_update();
        assert!(version >= 2);
    }
}
