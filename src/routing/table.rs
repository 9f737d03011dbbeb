//! Ordered route table.
//!
//! # Responsibilities
//! - Keep routes in registration order
//! - Resolve duplicate (method, path) pairs before the router is built
//!
//! # Design Decisions
//! - No ranking beyond registration order
//! - Duplicates: the last registered route wins, earlier ones are skipped
//! - The table only grows; the listener works from an immutable snapshot

use std::collections::HashMap;

use crate::routing::route::Route;

/// Registered routes in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Routes {
    routes: Vec<Route>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// Routes that will actually be installed: for each (method, path) only the
    /// last registration survives. Registration order is otherwise preserved.
    pub fn effective(&self) -> Vec<&Route> {
        let mut last: HashMap<(&str, &str), usize> = HashMap::new();
        for (idx, route) in self.routes.iter().enumerate() {
            if let Some(prev) = last.insert((route.method(), route.path()), idx) {
                tracing::warn!(
                    method = %route.method(),
                    path = %route.path(),
                    shadowed = %self.routes[prev].name(),
                    winner = %route.name(),
                    "Duplicate route, last registration wins"
                );
            }
        }

        self.routes
            .iter()
            .enumerate()
            .filter(|(idx, r)| last.get(&(r.method(), r.path())) == Some(idx))
            .map(|(_, r)| r)
            .collect()
    }
}

impl FromIterator<Route> for Routes {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Routes {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
