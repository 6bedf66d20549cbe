//! In-process router.
//!
//! Keeps the current [`Route`] in a watch channel so views can follow
//! navigation, plus a bounded history of visited routes.

use catalog_core::{Navigator, Route};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Number of routes kept in the history.
const HISTORY_LIMIT: usize = 32;

/// Router holding the current route.
#[derive(Debug)]
pub struct Router {
    current: watch::Sender<Route>,
    history: Mutex<VecDeque<Route>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl Router {
    /// Creates a router positioned at `initial`.
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            history: Mutex::new(VecDeque::from([initial])),
        }
    }

    /// Returns the current route.
    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    /// Returns visited routes, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Subscribes to route changes.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigating");
        if let Ok(mut history) = self.history.lock() {
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(route);
        }
        self.current.send_replace(route);
    }
}
