//! Video catalog module
//!
//! In-memory registry of the videos served by the annotator, seeded from
//! configuration at startup. Annotations saved through the API live here for
//! the lifetime of the process.

mod annotation;

pub use annotation::Annotation;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tokio::sync::RwLock;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid video id '{0}': must be one or more word characters")]
    InvalidId(String),

    #[error("video '{0}' already exists")]
    Duplicate(String),

    #[error("video '{0}' not found")]
    UnknownVideo(String),

    #[error("video '{id}' has an invalid annotation: {reason}")]
    InvalidAnnotation { id: String, reason: String },

    #[error("failed to read catalog file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A video available for annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub filename: String,
    /// URL prefix the file is served from
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Video {
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.filename)
    }
}

/// Partial update of a video's descriptive fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoUpdate {
    pub filename: Option<String>,
    pub host: Option<String>,
    pub verified: Option<bool>,
}

/// Catalog file layout: `[[videos]]` tables
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    videos: Vec<Video>,
}

fn id_regex() -> &'static Regex {
    static ID: OnceLock<Regex> = OnceLock::new();
    ID.get_or_init(|| Regex::new(r"^\w+$").expect("static id pattern"))
}

/// Video ids must be routable by the `(\w+)` captures
pub fn is_valid_id(id: &str) -> bool {
    id_regex().is_match(id)
}

/// Read `[[videos]]` entries from a TOML catalog file
pub fn load_file(path: &str) -> Result<Vec<Video>, CatalogError> {
    let content = std::fs::read_to_string(Path::new(path)).map_err(|source| CatalogError::Read {
        path: path.to_string(),
        source,
    })?;
    let file: CatalogFile = toml::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_string(),
        source,
    })?;
    Ok(file.videos)
}

/// Shared video registry
#[derive(Debug, Default)]
pub struct Catalog {
    videos: RwLock<BTreeMap<String, Video>>,
}

impl Catalog {
    /// Build a catalog, rejecting invalid and duplicate ids
    pub fn new(videos: Vec<Video>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for video in videos {
            if !is_valid_id(&video.id) {
                return Err(CatalogError::InvalidId(video.id));
            }
            if map.contains_key(&video.id) {
                return Err(CatalogError::Duplicate(video.id));
            }
            if let Some(annotation) = &video.annotation {
                annotation
                    .validate()
                    .map_err(|reason| CatalogError::InvalidAnnotation {
                        id: video.id.clone(),
                        reason,
                    })?;
            }
            map.insert(video.id.clone(), video);
        }

        Ok(Self {
            videos: RwLock::new(map),
        })
    }

    /// All videos ordered by id
    pub async fn list(&self) -> Vec<Video> {
        self.videos.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<Video> {
        self.videos.read().await.get(id).cloned()
    }

    /// Stored annotation of a video; `Ok(None)` when nothing was saved yet
    pub async fn annotation(&self, id: &str) -> Result<Option<Annotation>, CatalogError> {
        self.videos
            .read()
            .await
            .get(id)
            .map(|video| video.annotation.clone())
            .ok_or_else(|| CatalogError::UnknownVideo(id.to_string()))
    }

    /// Replace the annotation of a video
    pub async fn set_annotation(&self, id: &str, annotation: Annotation) -> Result<(), CatalogError> {
        let mut videos = self.videos.write().await;
        let video = videos
            .get_mut(id)
            .ok_or_else(|| CatalogError::UnknownVideo(id.to_string()))?;
        video.annotation = Some(annotation);
        Ok(())
    }

    pub async fn insert(&self, video: Video) -> Result<(), CatalogError> {
        if !is_valid_id(&video.id) {
            return Err(CatalogError::InvalidId(video.id));
        }

        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(CatalogError::Duplicate(video.id));
        }
        videos.insert(video.id.clone(), video);
        Ok(())
    }

    /// Apply a partial update and return the updated video
    pub async fn update(&self, id: &str, update: VideoUpdate) -> Result<Video, CatalogError> {
        let mut videos = self.videos.write().await;
        let video = videos
            .get_mut(id)
            .ok_or_else(|| CatalogError::UnknownVideo(id.to_string()))?;

        if let Some(filename) = update.filename {
            video.filename = filename;
        }
        if let Some(host) = update.host {
            video.host = host;
        }
        if let Some(verified) = update.verified {
            video.verified = verified;
        }
        Ok(video.clone())
    }

    pub async fn remove(&self, id: &str) -> Result<Video, CatalogError> {
        self.videos
            .write()
            .await
            .remove(id)
            .ok_or_else(|| CatalogError::UnknownVideo(id.to_string()))
    }
}
