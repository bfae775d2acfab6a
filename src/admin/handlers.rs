//! Admin handlers module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::catalog::{Video, VideoUpdate};
use crate::config::AppState;
use crate::http;
use crate::views::ViewError;

const VIDEO_ADMIN_URL: &str = "/admin/annotator/video/";

#[derive(Debug, Serialize)]
struct AdminIndex {
    site_name: String,
    apps: Vec<AdminApp>,
}

#[derive(Debug, Serialize)]
struct AdminApp {
    app_label: &'static str,
    models: Vec<AdminModel>,
}

#[derive(Debug, Serialize)]
struct AdminModel {
    name: &'static str,
    admin_url: &'static str,
    count: usize,
}

#[derive(Debug, Serialize)]
struct VideoSummary {
    id: String,
    url: String,
    verified: bool,
    annotated: bool,
    admin_url: String,
}

impl From<&Video> for VideoSummary {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            url: video.url(),
            verified: video.verified,
            annotated: video.annotation.is_some(),
            admin_url: format!("{VIDEO_ADMIN_URL}{}/", video.id),
        }
    }
}

/// Registered models
pub async fn index(state: &AppState) -> Response<Full<Bytes>> {
    let index = AdminIndex {
        site_name: state.config.admin.site_name.clone(),
        apps: vec![AdminApp {
            app_label: "annotator",
            models: vec![AdminModel {
                name: "video",
                admin_url: VIDEO_ADMIN_URL,
                count: state.catalog.len().await,
            }],
        }],
    };

    http::build_json_response(StatusCode::OK, &index)
}

pub async fn list_videos(state: &AppState) -> Response<Full<Bytes>> {
    let videos = state.catalog.list().await;
    let summaries: Vec<VideoSummary> = videos.iter().map(VideoSummary::from).collect();

    http::build_json_response(StatusCode::OK, &summaries)
}

pub async fn create_video(
    body: &Bytes,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    let video: Video = serde_json::from_slice(body)
        .map_err(|e| ViewError::BadRequest(format!("Invalid JSON: {e}")))?;

    if let Some(annotation) = &video.annotation {
        annotation.validate().map_err(ViewError::BadRequest)?;
    }

    state.catalog.insert(video.clone()).await?;

    Ok(http::build_json_response(StatusCode::CREATED, &video))
}

pub async fn video_detail(
    video_id: &str,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    let video = state
        .catalog
        .get(video_id)
        .await
        .ok_or_else(|| ViewError::NotFound(format!("video '{video_id}' not found")))?;

    Ok(http::build_json_response(StatusCode::OK, &video))
}

pub async fn update_video(
    video_id: &str,
    body: &Bytes,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    let update: VideoUpdate = serde_json::from_slice(body)
        .map_err(|e| ViewError::BadRequest(format!("Invalid JSON: {e}")))?;

    let video = state.catalog.update(video_id, update).await?;

    Ok(http::build_json_response(StatusCode::OK, &video))
}

pub async fn delete_video(
    video_id: &str,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    state.catalog.remove(video_id).await?;

    Ok(http::build_204_response())
}
