//! Route table module
//!
//! Ordered pattern-to-target bindings. Resolution walks the table in
//! declaration order and stops at the first match.

use thiserror::Error;

use super::pattern::RoutePattern;

/// Route table construction errors
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate route pattern '{0}'")]
    DuplicatePattern(String),
}

/// What a route binds to
#[derive(Debug)]
pub enum Target<T> {
    /// A handler endpoint
    Endpoint(T),
    /// A sub-application resolved against the rest of the path
    Include(RouteTable<T>),
}

/// A single pattern binding
#[derive(Debug)]
pub struct Route<T> {
    pub pattern: RoutePattern,
    pub target: Target<T>,
}

/// Outcome of a successful resolution
#[derive(Debug)]
pub struct Resolved<'a, T> {
    pub endpoint: &'a T,
    /// Positional arguments for the endpoint
    pub args: Vec<String>,
    /// Pattern sources that matched, outermost first
    pub chain: Vec<&'a str>,
}

impl<T> Resolved<'_, T> {
    /// Matched pattern chain joined for logging, e.g. `^admin/ -> ^$`
    pub fn route_name(&self) -> String {
        self.chain.join(" -> ")
    }
}

/// Ordered route table
#[derive(Debug)]
pub struct RouteTable<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    pub const fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Bind a pattern to an endpoint
    pub fn route(self, pattern: &str, endpoint: T) -> Result<Self, RoutingError> {
        self.push(pattern, Target::Endpoint(endpoint))
    }

    /// Mount a sub-table under a pattern prefix
    pub fn include(self, pattern: &str, table: Self) -> Result<Self, RoutingError> {
        self.push(pattern, Target::Include(table))
    }

    fn push(mut self, pattern: &str, target: Target<T>) -> Result<Self, RoutingError> {
        if self.routes.iter().any(|r| r.pattern.as_str() == pattern) {
            return Err(RoutingError::DuplicatePattern(pattern.to_string()));
        }

        let compiled = RoutePattern::new(pattern).map_err(|source| RoutingError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        self.routes.push(Route {
            pattern: compiled,
            target,
        });
        Ok(self)
    }

    /// Convert every endpoint of this table (and of included tables)
    pub fn map<U, F>(self, f: F) -> RouteTable<U>
    where
        F: Fn(T) -> U + Copy,
    {
        RouteTable {
            routes: self
                .routes
                .into_iter()
                .map(|route| Route {
                    pattern: route.pattern,
                    target: match route.target {
                        Target::Endpoint(endpoint) => Target::Endpoint(f(endpoint)),
                        Target::Include(table) => Target::Include(table.map(f)),
                    },
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a path (without its leading `/`) to an endpoint
    ///
    /// An include that matches the prefix owns the whole request: when its
    /// sub-table has no match, resolution fails instead of falling through
    /// to later routes.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_, T>> {
        for route in &self.routes {
            let Some(m) = route.pattern.match_path(path) else {
                continue;
            };

            return match &route.target {
                Target::Endpoint(endpoint) => Some(Resolved {
                    endpoint,
                    args: m.captures,
                    chain: vec![route.pattern.as_str()],
                }),
                Target::Include(table) => {
                    let mut inner = table.resolve(&path[m.end..])?;
                    let mut args = m.captures;
                    args.append(&mut inner.args);
                    inner.args = args;
                    inner.chain.insert(0, route.pattern.as_str());
                    Some(inner)
                }
            };
        }

        None
    }

    /// Flattened list of pattern chains, in resolution order
    pub fn patterns(&self) -> Vec<String> {
        let mut out = Vec::new();
        for route in &self.routes {
            match &route.target {
                Target::Endpoint(_) => out.push(route.pattern.as_str().to_string()),
                Target::Include(table) => out.extend(
                    table
                        .patterns()
                        .into_iter()
                        .map(|inner| format!("{} -> {inner}", route.pattern.as_str())),
                ),
            }
        }
        out
    }
}
