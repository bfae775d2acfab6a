//! Views module
//!
//! The handlers bound by the route table. Every endpoint is a method table
//! over the closed set of [`Action`]s; [`respond`] runs the chosen action.

mod annotation;
mod home;
mod video;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Response, StatusCode};
use maud::{html, Markup, DOCTYPE};
use thiserror::Error;

use crate::admin::{self, AdminAction};
use crate::catalog::CatalogError;
use crate::config::AppState;
use crate::http::{self, MethodTable};

/// Route table endpoint: an explicit method dispatch table
pub type Endpoint = MethodTable<Action>;

/// Every handler the application can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Home,
    Video,
    AnnotationGet,
    AnnotationPost,
    Admin(AdminAction),
}

/// `home`: function view
pub fn home_endpoint() -> Endpoint {
    MethodTable::get(Action::Home)
}

/// `video`: function view taking the video id
pub fn video_endpoint() -> Endpoint {
    MethodTable::get(Action::Video)
}

/// `AnnotationView`: reads and replaces the annotation of a video
pub fn annotation_endpoint() -> Endpoint {
    MethodTable::new()
        .on(Method::GET, Action::AnnotationGet)
        .on(Method::POST, Action::AnnotationPost)
}

/// Request as seen by a view
#[derive(Debug)]
pub struct ViewRequest {
    pub method: Method,
    pub path: String,
    /// Positional arguments captured by the route
    pub args: Vec<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ViewRequest {
    /// Positional argument `index`
    pub fn arg(&self, index: usize) -> Result<&str, ViewError> {
        self.args.get(index).map(String::as_str).ok_or_else(|| {
            ViewError::Internal(format!("route for {} captures no argument {index}", self.path))
        })
    }
}

/// Errors a view reports to the client
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl ViewError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let mut resp = http::build_text_response(status, &format!("{} {self}", status.as_u16()));
        if let Self::Unauthorized(_) = self {
            resp.headers_mut().insert(
                hyper::header::WWW_AUTHENTICATE,
                hyper::header::HeaderValue::from_static("Bearer"),
            );
        }
        resp
    }
}

impl From<CatalogError> for ViewError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownVideo(_) => Self::NotFound(err.to_string()),
            CatalogError::Duplicate(_) => Self::Conflict(err.to_string()),
            CatalogError::InvalidId(_) | CatalogError::InvalidAnnotation { .. } => {
                Self::BadRequest(err.to_string())
            }
            CatalogError::Read { .. } | CatalogError::Parse { .. } => Self::Internal(err.to_string()),
        }
    }
}

/// Run an action for a resolved request
pub async fn respond(
    action: Action,
    req: &ViewRequest,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ViewError> {
    match action {
        Action::Home => home::home(state).await,
        Action::Video => video::video(req.arg(0)?, state).await,
        Action::AnnotationGet => annotation::get(req.arg(0)?, state).await,
        Action::AnnotationPost => annotation::post(req.arg(0)?, &req.body, state).await,
        Action::Admin(action) => admin::respond(action, req, state).await,
    }
}

/// Full HTML document around a page body
pub fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                (body)
            }
        }
    }
}
