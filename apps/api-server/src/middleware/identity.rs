//! Viewer identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the signed-in user's
//! id in the `X-Viewer-Id` header. No header means an anonymous visitor.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use folio_core::domain::Viewer;
use uuid::Uuid;

use crate::middleware::error::AppError;

pub const VIEWER_HEADER: &str = "X-Viewer-Id";

/// The viewer making the request.
///
/// ```ignore
/// async fn feed(identity: ViewerIdentity) -> impl Responder {
///     format!("{:?}", identity.viewer())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerIdentity(pub Viewer);

impl ViewerIdentity {
    pub fn viewer(&self) -> &Viewer {
        &self.0
    }
}

fn parse_viewer(req: &HttpRequest) -> Result<Viewer, AppError> {
    let user_id = req
        .headers()
        .get(VIEWER_HEADER)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
                .ok_or_else(|| AppError::BadRequest(format!("{VIEWER_HEADER} must be a UUID")))
        })
        .transpose()?;
    Ok(Viewer::from(user_id))
}

impl FromRequest for ViewerIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_viewer(req).map(ViewerIdentity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_missing_header_is_anonymous() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(parse_viewer(&req).unwrap(), Viewer::Anonymous);
    }

    #[test]
    fn test_header_names_the_user() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((VIEWER_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(parse_viewer(&req).unwrap(), Viewer::User(id));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((VIEWER_HEADER, "alice"))
            .to_http_request();
        assert!(matches!(parse_viewer(&req), Err(AppError::BadRequest(_))));
    }
}
