//! HTTP method dispatch module
//!
//! Explicit method-to-action tables for endpoints. `HEAD` falls back to the
//! `GET` action and `OPTIONS` is answered from the table when not declared.

use hyper::Method;

/// Method dispatch table of an endpoint
#[derive(Debug, Clone)]
pub struct MethodTable<A> {
    entries: Vec<(Method, A)>,
}

/// Outcome of dispatching a request method
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<'a, A> {
    /// Run the declared action
    Handler(&'a A),
    /// Run the `GET` action and drop the body
    Head(&'a A),
    /// Answer the preflight with the `Allow` value
    Options(String),
    /// Reject with 405 and the `Allow` value
    NotAllowed(String),
}

impl<A> MethodTable<A> {
    /// Table with a single `GET` action (function views)
    pub fn get(action: A) -> Self {
        Self {
            entries: vec![(Method::GET, action)],
        }
    }

    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare an action for a method, replacing an earlier declaration
    #[must_use]
    pub fn on(mut self, method: Method, action: A) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            entry.1 = action;
        } else {
            self.entries.push((method, action));
        }
        self
    }

    /// Convert every action of the table
    pub fn map<B, F>(self, f: F) -> MethodTable<B>
    where
        F: Fn(A) -> B,
    {
        MethodTable {
            entries: self
                .entries
                .into_iter()
                .map(|(method, action)| (method, f(action)))
                .collect(),
        }
    }

    fn find(&self, method: &Method) -> Option<&A> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, action)| action)
    }

    /// `Allow` header value: declared methods, then implied `HEAD` and `OPTIONS`
    pub fn allow(&self) -> String {
        let mut methods: Vec<&str> = self.entries.iter().map(|(m, _)| m.as_str()).collect();
        if self.find(&Method::GET).is_some() && self.find(&Method::HEAD).is_none() {
            methods.push(Method::HEAD.as_str());
        }
        if self.find(&Method::OPTIONS).is_none() {
            methods.push(Method::OPTIONS.as_str());
        }
        methods.join(", ")
    }

    pub fn dispatch(&self, method: &Method) -> Dispatch<'_, A> {
        if let Some(action) = self.find(method) {
            return Dispatch::Handler(action);
        }

        match method {
            &Method::HEAD => self
                .find(&Method::GET)
                .map_or_else(|| Dispatch::NotAllowed(self.allow()), Dispatch::Head),
            &Method::OPTIONS => Dispatch::Options(self.allow()),
            _ => Dispatch::NotAllowed(self.allow()),
        }
    }
}

impl<A> Default for MethodTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Act {
        Fetch,
        Save,
        Peek,
    }

    fn annotation_table() -> MethodTable<Act> {
        MethodTable::new()
            .on(Method::GET, Act::Fetch)
            .on(Method::POST, Act::Save)
    }

    #[test]
    fn test_declared_methods_dispatch() {
        let table = annotation_table();
        assert_eq!(table.dispatch(&Method::GET), Dispatch::Handler(&Act::Fetch));
        assert_eq!(table.dispatch(&Method::POST), Dispatch::Handler(&Act::Save));
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let table = annotation_table();
        assert_eq!(table.dispatch(&Method::HEAD), Dispatch::Head(&Act::Fetch));
    }

    #[test]
    fn test_explicit_head_wins() {
        let table = annotation_table().on(Method::HEAD, Act::Peek);
        assert_eq!(table.dispatch(&Method::HEAD), Dispatch::Handler(&Act::Peek));
        assert_eq!(table.allow(), "GET, POST, HEAD, OPTIONS");
    }

    #[test]
    fn test_allow_header_order() {
        assert_eq!(annotation_table().allow(), "GET, POST, HEAD, OPTIONS");
        assert_eq!(MethodTable::get(Act::Fetch).allow(), "GET, HEAD, OPTIONS");
        assert_eq!(
            MethodTable::new().on(Method::DELETE, Act::Save).allow(),
            "DELETE, OPTIONS"
        );
    }

    #[test]
    fn test_options_and_not_allowed() {
        let table = annotation_table();
        assert_eq!(
            table.dispatch(&Method::OPTIONS),
            Dispatch::Options("GET, POST, HEAD, OPTIONS".to_string())
        );
        assert_eq!(
            table.dispatch(&Method::PUT),
            Dispatch::NotAllowed("GET, POST, HEAD, OPTIONS".to_string())
        );
    }

    #[test]
    fn test_head_without_get_not_allowed() {
        let table = MethodTable::new().on(Method::POST, Act::Save);
        assert_eq!(
            table.dispatch(&Method::HEAD),
            Dispatch::NotAllowed("POST, OPTIONS".to_string())
        );
    }

    #[test]
    fn test_map_keeps_methods() {
        let table = annotation_table().map(|act| format!("{act:?}"));
        assert_eq!(table.dispatch(&Method::POST), Dispatch::Handler(&"Save".to_string()));
        assert_eq!(table.allow(), "GET, POST, HEAD, OPTIONS");
    }

    #[test]
    fn test_redeclaration_replaces() {
        let table = MethodTable::get(Act::Fetch).on(Method::GET, Act::Peek);
        assert_eq!(table.dispatch(&Method::GET), Dispatch::Handler(&Act::Peek));
        assert_eq!(table.allow(), "GET, HEAD, OPTIONS");
    }
}
