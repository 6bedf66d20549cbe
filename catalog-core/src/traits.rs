//! Trait definitions for the catalog.
//!
//! Seams between the state store and the collaborators it drives.

use crate::models::Route;

/// Side-effect sink for navigation requests.
///
/// The product store only ever asks for [`Route::ProductList`], after a
/// successful mutation. Implementations decide what navigating means (a
/// router, a recorded history, a redraw).
pub trait Navigator: Send + Sync {
    /// Navigates to the given route.
    fn navigate(&self, route: Route);
}

/// A navigator that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: Route) {}
}
