//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health checks, admin credentials,
//! body limits, route resolution, method dispatch and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Version};

use crate::admin;
use crate::config::AppState;
use crate::http::{self, Dispatch};
use crate::logger::{self, AccessLogEntry};
use crate::views::{self, ViewError, ViewRequest};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let start = Instant::now();
    let (parts, body) = req.into_parts();

    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&parts, peer_addr));
    logger::log_headers_count(parts.headers.len(), state.config.logging.show_headers);

    let (mut response, route) = route_request(parts, body, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        entry.route = route;
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve and run the request; also returns the matched route chain
async fn route_request<B>(
    parts: Parts,
    body: B,
    state: &AppState,
) -> (Response<Full<Bytes>>, Option<String>)
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let raw_path = parts.uri.path();

    // 1. Health check endpoints
    let health = &state.config.health;
    if health.enabled && (raw_path == health.liveness_path || raw_path == health.readiness_path) {
        return (http::build_health_response("ok"), None);
    }

    // 2. Admin credentials, ahead of body limits, redirects and method dispatch
    let path = decode_path(raw_path);
    let relative = path.strip_prefix('/').unwrap_or(&path);
    let admin_config = &state.config.admin;
    if admin_config.enabled && admin::covers(relative) {
        if let Err(err) = admin::authorize(&parts.headers, admin_config.token.as_deref()) {
            logger::log_warning(&format!("Rejected admin request: {} {path}: {err}", parts.method));
            return (err.into_response(), None);
        }
    }

    // 3. Declared body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        return (resp, None);
    }

    // 4. Route resolution against the path without its leading slash
    let Some(resolved) = state.routes.resolve(relative) else {
        return (unresolved_response(&parts, relative, state), None);
    };
    let route = resolved.route_name();

    // 5. Method dispatch
    let action = match resolved.endpoint.dispatch(&parts.method) {
        Dispatch::Handler(action) | Dispatch::Head(action) => *action,
        Dispatch::Options(allow) => {
            let resp = http::build_options_response(&allow, state.config.http.enable_cors);
            return (resp, Some(route));
        }
        Dispatch::NotAllowed(allow) => {
            logger::log_warning(&format!("Method not allowed: {} {path}", parts.method));
            return (http::build_405_response(&allow), Some(route));
        }
    };
    logger::log_debug(&format!("{} {path} -> {route} {action:?}", parts.method));

    // 6. Request body, capped at the configured size
    let body = match read_body(body, max_body_size).await {
        Ok(body) => body,
        Err(resp) => return (resp, Some(route)),
    };

    let req = ViewRequest {
        method: parts.method,
        path,
        args: resolved.args,
        headers: parts.headers,
        body,
    };

    // 7. Run the action
    let mut response = match views::respond(action, &req, state).await {
        Ok(resp) => resp,
        Err(err) => {
            log_view_error(&req, &err);
            err.into_response()
        }
    };

    // HEAD keeps the length of the body it would have carried
    if req.method == Method::HEAD {
        if let Some(len) = response.body().size_hint().exact() {
            response
                .headers_mut()
                .entry(CONTENT_LENGTH)
                .or_insert_with(|| HeaderValue::from(len));
        }
        *response.body_mut() = Full::new(Bytes::new());
    }

    (response, Some(route))
}

/// 404, or a redirect to the slashed path when only that form resolves
fn unresolved_response(parts: &Parts, relative: &str, state: &AppState) -> Response<Full<Bytes>> {
    let redirect = state.config.http.append_slash
        && matches!(&parts.method, &Method::GET | &Method::HEAD)
        && !relative.ends_with('/')
        && state.routes.resolve(&format!("{relative}/")).is_some();

    if !redirect {
        return http::build_404_response();
    }

    let target = match parts.uri.query() {
        Some(query) => format!("{}/?{query}", parts.uri.path()),
        None => format!("{}/", parts.uri.path()),
    };
    http::build_redirect_response(&target)
}

/// Percent-decode the request path; undecodable input is matched as sent
fn decode_path(path: &str) -> String {
    urlencoding::decode(path).map_or_else(
        |e| {
            logger::log_debug(&format!("Path {path} is not valid UTF-8 once decoded: {e}"));
            path.to_string()
        },
        |decoded| decoded.into_owned(),
    )
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the body; streams longer than the limit get 413
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_text_response(
                StatusCode::BAD_REQUEST,
                "400 Bad Request",
            ))
        }
    }
}

fn log_view_error(req: &ViewRequest, err: &ViewError) {
    let message = format!("{} {} - {}: {err}", req.method, req.path, err.status().as_u16());
    if err.status().is_server_error() {
        logger::log_error(&message);
    } else {
        logger::log_debug(&message);
    }
}

fn access_entry(parts: &Parts, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = http_version(parts.version).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

const fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::{body_string, test_state};

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn req(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, request: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(request, Arc::clone(state), peer()).await.unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let state = Arc::new(test_state());
        let resp = send(&state, req(Method::GET, "/", "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[SERVER], "BeaverDam/0.1");
        assert!(body_string(resp).await.contains("/video/beach"));
    }

    #[tokio::test]
    async fn test_video_and_missing_video() {
        let state = Arc::new(test_state());
        assert_eq!(send(&state, req(Method::GET, "/video/beach", "")).await.status(), 200);
        assert_eq!(send(&state, req(Method::GET, "/video/be%61ch", "")).await.status(), 200);
        assert_eq!(send(&state, req(Method::GET, "/video/nope", "")).await.status(), 404);
        assert_eq!(send(&state, req(Method::GET, "/video", "")).await.status(), 404);
        assert_eq!(send(&state, req(Method::GET, "/nowhere", "")).await.status(), 404);
    }

    #[tokio::test]
    async fn test_annotation_round_trip_through_router() {
        let state = Arc::new(test_state());
        let body = r#"[{"keyframes":[{"x":1,"y":2,"w":3,"h":4,"frame":0}]}]"#;

        let resp = send(&state, req(Method::POST, "/annotation/beach", body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "success");

        let resp = send(&state, req(Method::GET, "/annotation/beach", "")).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json[0]["keyframes"][0]["w"], 3.0);

        let resp = send(&state, req(Method::POST, "/annotation/beach", "not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_method_not_allowed_and_options() {
        let state = Arc::new(test_state());

        let resp = send(&state, req(Method::DELETE, "/annotation/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "GET, POST, HEAD, OPTIONS");

        let resp = send(&state, req(Method::POST, "/video/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD, OPTIONS");

        let resp = send(&state, req(Method::OPTIONS, "/annotation/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Allow"], "GET, POST, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_head_drops_body() {
        let state = Arc::new(test_state());
        let resp = send(&state, req(Method::HEAD, "/video/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("Content-Length"));
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_head_keeps_content_length() {
        let state = Arc::new(test_state());
        let resp = send(&state, req(Method::HEAD, "/annotation/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Length"], "2");
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_append_slash_redirect() {
        let state = Arc::new(test_state());

        let resp = send(&state, req(Method::GET, "/admin", "")).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["Location"], "/admin/");

        let resp = send(&state, req(Method::GET, "/admin/annotator/video?page=2", "")).await;
        assert_eq!(resp.headers()["Location"], "/admin/annotator/video/?page=2");

        // no redirect for methods that carry a body
        let resp = send(&state, req(Method::POST, "/admin", "")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_append_slash_disabled() {
        let mut state = test_state();
        state.config.http.append_slash = false;
        let state = Arc::new(state);
        let resp = send(&state, req(Method::GET, "/admin", "")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_prefix_has_no_fallthrough() {
        let state = Arc::new(test_state());
        assert_eq!(send(&state, req(Method::GET, "/admin/", "")).await.status(), 200);
        assert_eq!(
            send(&state, req(Method::GET, "/admin/video/beach", "")).await.status(),
            404
        );
    }

    #[tokio::test]
    async fn test_admin_token() {
        let mut state = test_state();
        state.config.admin.token = Some("s3cret".to_string());
        let state = Arc::new(state);

        let resp = send(&state, req(Method::GET, "/admin/", "")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let mut authorized = req(Method::GET, "/admin/", "");
        authorized
            .headers_mut()
            .insert("Authorization", HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(send(&state, authorized).await.status(), StatusCode::OK);

        // the public views stay open
        assert_eq!(send(&state, req(Method::GET, "/", "")).await.status(), 200);
    }

    #[tokio::test]
    async fn test_admin_token_checked_before_dispatch() {
        let mut state = test_state();
        state.config.admin.token = Some("s3cret".to_string());
        state.config.http.max_body_size = 8;
        let state = Arc::new(state);

        let detail = "/admin/annotator/video/beach/";
        let resp = send(&state, req(Method::OPTIONS, detail, "")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!resp.headers().contains_key("Allow"));

        let resp = send(&state, req(Method::PATCH, detail, "")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // no redirect hints at which admin paths exist
        let resp = send(&state, req(Method::GET, "/admin/annotator/video/beach", "")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let resp = send(&state, req(Method::GET, "/admin", "")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let oversized = req(Method::POST, "/admin/annotator/video/", "{\"id\":\"a-long-id\"}");
        assert_eq!(send(&state, oversized).await.status(), StatusCode::UNAUTHORIZED);

        let mut authorized = req(Method::OPTIONS, detail, "");
        authorized
            .headers_mut()
            .insert("Authorization", HeaderValue::from_static("Bearer s3cret"));
        let resp = send(&state, authorized).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Allow"], "GET, PUT, DELETE, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_body_limits() {
        let mut state = test_state();
        state.config.http.max_body_size = 8;
        let state = Arc::new(state);

        let mut declared = req(Method::POST, "/annotation/beach", "[]");
        declared
            .headers_mut()
            .insert("Content-Length", HeaderValue::from_static("100"));
        assert_eq!(send(&state, declared).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let streamed = req(Method::POST, "/annotation/beach", "[ {}, {}, {} ]");
        assert_eq!(send(&state, streamed).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let small = req(Method::POST, "/annotation/beach", "[]");
        assert_eq!(send(&state, small).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let state = Arc::new(test_state());
        let resp = send(&state, req(Method::GET, "/healthz", "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "ok");
        assert_eq!(send(&state, req(Method::GET, "/readyz", "")).await.status(), 200);
    }
}
