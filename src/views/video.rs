//! Video page: the annotator for one video

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use maud::html;

use super::{page, ViewError};
use crate::config::AppState;
use crate::http;

pub async fn video(video_id: &str, state: &AppState) -> Result<Response<Full<Bytes>>, ViewError> {
    let video = state
        .catalog
        .get(video_id)
        .await
        .ok_or_else(|| ViewError::NotFound(format!("video '{video_id}' not found")))?;

    let verified = if video.verified { "true" } else { "false" };

    let body = html! {
        h1 { (video.id) }
        div id="annotator"
            data-video-id=(video.id)
            data-annotation-url={ "/annotation/" (video.id) }
            data-verified=(verified) {
            video id="video" src=(video.url()) preload="auto" {}
        }
        p { a href="/" { "All videos" } }
    };

    let title = format!("BeaverDam - {}", video.id);
    Ok(http::build_html_response(page(&title, body).into_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::{body_string, test_state};

    #[tokio::test]
    async fn test_video_page() {
        let state = test_state();
        let resp = video("beach", &state).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body = body_string(resp).await;
        assert!(body.contains(r#"src="/media/beach.mp4""#));
        assert!(body.contains(r#"data-annotation-url="/annotation/beach""#));
        assert!(body.contains(r#"data-verified="true""#));
    }

    #[tokio::test]
    async fn test_video_source_is_escaped() {
        let state = test_state();
        let body = body_string(video("street", &state).await.unwrap()).await;
        assert!(body.contains(r#"src="street &lt;1&gt;.mp4""#));
    }

    #[tokio::test]
    async fn test_unknown_video() {
        let state = test_state();
        let err = video("nope", &state).await.unwrap_err();
        assert!(matches!(err, ViewError::NotFound(_)));
    }
}
