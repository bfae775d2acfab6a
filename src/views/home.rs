//! Home page: the list of videos to annotate

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use maud::html;

use super::{page, ViewError};
use crate::config::AppState;
use crate::http;

pub async fn home(state: &AppState) -> Result<Response<Full<Bytes>>, ViewError> {
    let videos = state.catalog.list().await;

    let body = html! {
        h1 { "BeaverDam" }
        @if videos.is_empty() {
            p class="empty" { "No videos available for annotation." }
        } @else {
            ul class="videos" {
                @for video in &videos {
                    @let status = if video.verified { "verified" } else { "pending" };
                    li {
                        a href={ "/video/" (video.id) } { (video.id) }
                        " "
                        span class=(status) { (status) }
                    }
                }
            }
        }
    };

    Ok(http::build_html_response(page("BeaverDam", body).into_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::{body_string, test_state};

    #[tokio::test]
    async fn test_home_lists_videos() {
        let state = test_state();
        let resp = home(&state).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");

        let body = body_string(resp).await;
        assert!(body.contains(r#"<a href="/video/beach">beach</a>"#));
        assert!(body.contains(r#"<a href="/video/street">street</a>"#));
        assert!(body.contains(r#"<span class="verified">verified</span>"#));
        assert!(body.find("beach").unwrap() < body.find("street").unwrap());
    }

    #[tokio::test]
    async fn test_home_empty_catalog() {
        let state = test_state();
        state.catalog.remove("beach").await.unwrap();
        state.catalog.remove("street").await.unwrap();

        let body = body_string(home(&state).await.unwrap()).await;
        assert!(body.contains("No videos available"));
        assert!(!body.contains("<ul"));
    }
}
