// Application state module
// Holds configuration, the route table and the video catalog

use super::types::Config;
use crate::catalog::{self, Catalog};
use crate::error::AppError;
use crate::routes;
use crate::routing::RouteTable;
use crate::views::Endpoint;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    /// Route table, built once at startup
    pub routes: RouteTable<Endpoint>,
    pub catalog: Catalog,
}

impl AppState {
    /// Build state from configuration
    ///
    /// Videos from `catalog.file` are registered before the inline
    /// `[[catalog.videos]]` entries; an id may only appear once overall.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut videos = match &config.catalog.file {
            Some(path) => catalog::load_file(path)?,
            None => Vec::new(),
        };
        videos.extend(config.catalog.videos.iter().cloned());

        Ok(Self {
            config: config.clone(),
            routes: routes::build(config)?,
            catalog: Catalog::new(videos)?,
        })
    }
}
