//! Application URL table

use crate::admin;
use crate::config::Config;
use crate::routing::{RouteTable, RoutingError};
use crate::views::{self, Action, Endpoint};

/// Build the application route table, in resolution order
pub fn build(config: &Config) -> Result<RouteTable<Endpoint>, RoutingError> {
    let table = RouteTable::new()
        .route(r"^$", views::home_endpoint())?
        .route(r"^video/(\w+)", views::video_endpoint())?
        .route(r"^annotation/(\w+)", views::annotation_endpoint())?;

    if !config.admin.enabled {
        return Ok(table);
    }

    let admin_urls = admin::urls()?.map(|endpoint| endpoint.map(Action::Admin));
    table.include(&format!("^{}", admin::MOUNT), admin_urls)
}
