use crate::domain::Requester;
use crate::infrastructure::jwt::JwtService;
use actix_web::dev::{Payload, ServiceRequest};
use actix_web::error::InternalError;
use actix_web::http::header::{self, Header};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::future::{ready, Ready};
use std::sync::Arc;

pub const LOGIN_URL: &str = "/auth/login/";

// Query-value escaping that leaves path separators readable.
const NEXT_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn login_url(next: &str) -> String {
    format!("{}?next={}", LOGIN_URL, utf8_percent_encode(next, NEXT_VALUE))
}

// Path plus query string of the request being diverted.
fn return_to(req: &ServiceRequest) -> String {
    match req.query_string() {
        "" => req.path().to_string(),
        query => format!("{}?{}", req.path(), query),
    }
}

/// Login gate for routes that need an author. Anonymous requests and bad
/// tokens are sent to the login page; the handler never runs for them.
pub async fn require_login(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
        Some(service) => service.get_ref().clone(),
        None => {
            return Err((
                actix_web::error::ErrorInternalServerError("JWT service not configured"),
                req,
            ));
        }
    };

    match credentials.map(|c| jwt_service.verify_token(c.token())) {
        Some(Ok(requester)) => {
            req.extensions_mut().insert(requester);
            Ok(req)
        }
        _ => {
            tracing::debug!("Anonymous request to {} sent to login", req.path());
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, login_url(&return_to(&req))))
                .finish();
            Err((
                InternalError::from_response("login required", response).into(),
                req,
            ))
        }
    }
}

/// Whoever is looking at a public page; anonymous when there is no valid token.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Requester>);

impl Viewer {
    pub fn requester(&self) -> Option<&Requester> {
        self.0.as_ref()
    }
}

fn resolve_viewer(req: &HttpRequest) -> Option<Requester> {
    if let Some(requester) = req.extensions().get::<Requester>() {
        return Some(requester.clone());
    }

    let jwt_service = req.app_data::<web::Data<Arc<JwtService>>>()?;
    let auth = Authorization::<Bearer>::parse(req).ok()?;
    jwt_service.verify_token(auth.as_ref().token()).ok()
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Viewer(resolve_viewer(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_keeps_the_path_and_escapes_the_query() {
        assert_eq!(login_url("/posts/create/"), "/auth/login/?next=/posts/create/");
        assert_eq!(
            login_url("/posts/3/edit/?page=2&x=a b"),
            "/auth/login/?next=/posts/3/edit/%3Fpage%3D2%26x%3Da%20b"
        );
    }
}
