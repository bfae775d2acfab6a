//! Annotation endpoint: per-method handlers
//!
//! `GET` returns the stored annotation as JSON (`[]` before the first save),
//! `POST` replaces it with the request body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::ViewError;
use crate::catalog::Annotation;
use crate::config::AppState;
use crate::http;
use crate::logger;

pub async fn get(video_id: &str, state: &AppState) -> Result<Response<Full<Bytes>>, ViewError> {
    let annotation = state.catalog.annotation(video_id).await?.unwrap_or_default();
    Ok(http::build_json_response(StatusCode::OK, &annotation))
}

pub async fn post(
    video_id: &str,
    body: &Bytes,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    let annotation = Annotation::from_slice(body).map_err(ViewError::BadRequest)?;
    let things = annotation.things();

    state.catalog.set_annotation(video_id, annotation).await?;
    logger::log_debug(&format!(
        "[Annotation] Saved {things} thing(s) for video '{video_id}'"
    ));

    Ok(http::build_text_response(StatusCode::OK, "success"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::{body_string, test_state};

    const BODY: &str = r#"[{"type":"person","keyframes":[{"x":10,"y":20,"w":30,"h":40,"frame":1.5}]}]"#;

    #[tokio::test]
    async fn test_get_before_save_is_empty_list() {
        let state = test_state();
        let resp = get("beach", &state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(body_string(resp).await, "[]");
    }

    #[tokio::test]
    async fn test_post_then_get() {
        let state = test_state();
        let resp = post("beach", &Bytes::from(BODY), &state).await.unwrap();
        assert_eq!(body_string(resp).await, "success");

        let body = body_string(get("beach", &state).await.unwrap()).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0]["type"], "person");
        assert_eq!(json[0]["keyframes"][0]["frame"], 1.5);
    }

    #[tokio::test]
    async fn test_post_invalid_body() {
        let state = test_state();
        let err = post("beach", &Bytes::from("{"), &state).await.unwrap_err();
        assert!(matches!(err, ViewError::BadRequest(_)));

        // nothing stored
        assert_eq!(body_string(get("beach", &state).await.unwrap()).await, "[]");
    }

    #[tokio::test]
    async fn test_unknown_video() {
        let state = test_state();
        assert!(matches!(
            get("nope", &state).await.unwrap_err(),
            ViewError::NotFound(_)
        ));
        assert!(matches!(
            post("nope", &Bytes::from(BODY), &state).await.unwrap_err(),
            ViewError::NotFound(_)
        ));
    }
}
