//! Admin sub-application
//! JSON management surface for the video catalog, mounted under `admin/`

mod auth;
mod handlers;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Response};

use crate::config::AppState;
use crate::http::MethodTable;
use crate::routing::{RouteTable, RoutingError};
use crate::views::{ViewError, ViewRequest};

/// Admin handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Index,
    VideoList,
    VideoCreate,
    VideoDetail,
    VideoUpdate,
    VideoDelete,
}

/// Prefix the admin routes are included under, relative to the site root
pub const MOUNT: &str = "admin/";

/// Whether a root-relative path belongs to the admin mount, slashless form included
pub fn covers(path: &str) -> bool {
    path == MOUNT.trim_end_matches('/') || path.starts_with(MOUNT)
}

/// Check the request headers against the configured admin token, if any
pub fn authorize(headers: &HeaderMap, token: Option<&str>) -> Result<(), ViewError> {
    let Some(token) = token else {
        return Ok(());
    };
    auth::verify_bearer(headers, token).map_err(|e| ViewError::Unauthorized(e.to_string()))
}

/// Admin route table, resolved against the path after `admin/`
pub fn urls() -> Result<RouteTable<MethodTable<AdminAction>>, RoutingError> {
    RouteTable::new()
        .route(r"^$", MethodTable::get(AdminAction::Index))?
        .route(
            r"^annotator/video/$",
            MethodTable::new()
                .on(Method::GET, AdminAction::VideoList)
                .on(Method::POST, AdminAction::VideoCreate),
        )?
        .route(
            r"^annotator/video/(\w+)/$",
            MethodTable::new()
                .on(Method::GET, AdminAction::VideoDetail)
                .on(Method::PUT, AdminAction::VideoUpdate)
                .on(Method::DELETE, AdminAction::VideoDelete),
        )
}

/// Run an admin action; credentials are checked by the router via [`authorize`]
pub async fn respond(
    action: AdminAction,
    req: &ViewRequest,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    match action {
        AdminAction::Index => Ok(handlers::index(state).await),
        AdminAction::VideoList => Ok(handlers::list_videos(state).await),
        AdminAction::VideoCreate => handlers::create_video(&req.body, state).await,
        AdminAction::VideoDetail => handlers::video_detail(req.arg(0)?, state).await,
        AdminAction::VideoUpdate => handlers::update_video(req.arg(0)?, &req.body, state).await,
        AdminAction::VideoDelete => handlers::delete_video(req.arg(0)?, state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Dispatch;

    #[test]
    fn test_admin_urls() {
        let table = urls().unwrap();

        let resolved = table.resolve("").unwrap();
        assert_eq!(resolved.endpoint.dispatch(&Method::GET), Dispatch::Handler(&AdminAction::Index));

        let resolved = table.resolve("annotator/video/").unwrap();
        assert_eq!(
            resolved.endpoint.dispatch(&Method::POST),
            Dispatch::Handler(&AdminAction::VideoCreate)
        );

        let resolved = table.resolve("annotator/video/beach/").unwrap();
        assert_eq!(resolved.args, vec!["beach".to_string()]);
        assert_eq!(
            resolved.endpoint.dispatch(&Method::DELETE),
            Dispatch::Handler(&AdminAction::VideoDelete)
        );
        assert_eq!(resolved.endpoint.allow(), "GET, PUT, DELETE, HEAD, OPTIONS");

        assert!(table.resolve("annotator/video/beach").is_none());
        assert!(table.resolve("auth/user/").is_none());
    }

    #[test]
    fn test_covers_admin_mount() {
        assert!(covers("admin"));
        assert!(covers("admin/"));
        assert!(covers("admin/annotator/video/beach"));
        assert!(!covers("administrator"));
        assert!(!covers("video/admin"));
        assert!(!covers(""));
    }

    #[test]
    fn test_authorize() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&headers, None).is_ok());
        assert!(matches!(
            authorize(&headers, Some("s3cret")),
            Err(ViewError::Unauthorized(_))
        ));

        headers.insert(
            hyper::header::AUTHORIZATION,
            hyper::header::HeaderValue::from_static("Bearer s3cret"),
        );
        assert!(authorize(&headers, Some("s3cret")).is_ok());
        assert!(authorize(&headers, Some("other")).is_err());
    }
}
