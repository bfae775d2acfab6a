//! Request handler module
//!
//! Turns each HTTP request into a route resolution, a method dispatch and a
//! view call.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
