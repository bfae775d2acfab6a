//! Routing module
//!
//! Provides the URL route table:
//! - Start-anchored regex patterns with positional captures
//! - First-match resolution in declaration order
//! - Included sub-applications mounted under a prefix

mod pattern;
mod table;

pub use table::{RouteTable, RoutingError};
