//! HTTP protocol layer module
//!
//! Method dispatch tables and response builders, decoupled from the views.

pub mod method;
pub mod response;

// Re-export commonly used types
pub use method::{Dispatch, MethodTable};
pub use response::{
    build_204_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_html_response, build_json_response, build_options_response,
    build_redirect_response, build_text_response,
};
