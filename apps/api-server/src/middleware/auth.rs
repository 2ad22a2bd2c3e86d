//! Authentication middleware and extractors.
//!
//! [`TokenContext`] looks for an access token on every request and, when it
//! verifies, stores the [`TokenPayload`] in the request extensions. It never
//! rejects a request; route-level checks are done by the [`Guard`] extractor.

use std::future::{Future, Ready, ready};
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::PayloadError,
    http::header,
    web,
};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;

use scribe_core::domain::Role;
use scribe_core::policy;
use scribe_core::ports::{TokenKind, TokenPayload};

use super::error::AppError;
use super::validation::JSON_LIMIT;
use crate::state::AppState;

/// Header carrying the access token.
pub static ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Middleware that attaches the caller's token payload, if any, to the request.
pub struct TokenContext;

impl<S, B> Transform<S, ServiceRequest> for TokenContext
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TokenContextService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenContextService {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenContextService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if let Some(state) = req.app_data::<web::Data<AppState>>().cloned() {
                let mut token = header_token(&req).or_else(|| query_token(&req));
                if token.is_none() && is_json(&req) {
                    token = body_token(&mut req).await;
                }

                if let Some(token) = token {
                    match state.tokens.validate_token(TokenKind::Access, &token) {
                        Ok(claims) => {
                            tracing::debug!(user_id = %claims.payload.id, role = %claims.payload.role, "token accepted");
                            req.extensions_mut().insert(claims.payload);
                        }
                        Err(e) => tracing::debug!(error = %e, "ignoring unusable access token"),
                    }
                }
            }

            service.call(req).await
        })
    }
}

fn header_token(req: &ServiceRequest) -> Option<String> {
    let headers = req.headers();
    if let Some(value) = headers.get(ACCESS_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[derive(Deserialize)]
struct TokenField {
    token: Option<String>,
}

fn query_token(req: &ServiceRequest) -> Option<String> {
    web::Query::<TokenField>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().token)
}

fn is_json(req: &ServiceRequest) -> bool {
    req.content_type().eq_ignore_ascii_case("application/json")
}

/// Reads the body to look for `token`, then puts every byte read back for the handler.
///
/// Reading stops once the body outgrows [`JSON_LIMIT`]; the unread remainder
/// stays in the stream so the JSON extractor reports the overflow itself.
async fn body_token(req: &mut ServiceRequest) -> Option<String> {
    let mut payload = req.take_payload();
    let mut body = web::BytesMut::new();
    let mut failure: Option<PayloadError> = None;

    while body.len() <= JSON_LIMIT {
        match payload.next().await {
            Some(Ok(chunk)) => body.extend_from_slice(&chunk),
            Some(Err(e)) => {
                failure = Some(e);
                break;
            }
            None => break,
        }
    }

    let body = body.freeze();
    let token = match &failure {
        Some(e) => {
            tracing::debug!(error = %e, "body unreadable while looking for a token");
            None
        }
        None if body.len() > JSON_LIMIT => {
            tracing::debug!(size = body.len(), "body too large to look for a token");
            None
        }
        None => serde_json::from_slice::<TokenField>(&body)
            .ok()
            .and_then(|f| f.token),
    };

    let restored: Pin<Box<dyn Stream<Item = Result<web::Bytes, PayloadError>>>> = Box::pin(
        stream::once(ready(Ok(body)))
            .chain(stream::iter(failure.map(Err)))
            .chain(payload),
    );
    req.set_payload(Payload::Stream { payload: restored });
    token
}

/// Optional caller identity. Never fails.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<TokenPayload>);

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Caller(req.extensions().get::<TokenPayload>().cloned())))
    }
}

/// Role set a [`Guard`] admits. An empty set admits any authenticated caller.
pub trait RoleSet {
    const ROLES: &'static [Role];
}

/// Any authenticated caller.
pub struct AnyRole;

impl RoleSet for AnyRole {
    const ROLES: &'static [Role] = &[];
}

pub struct AdminOnly;

impl RoleSet for AdminOnly {
    const ROLES: &'static [Role] = &[Role::Admin];
}

/// ADMIN or MANAGER.
pub struct Staff;

impl RoleSet for Staff {
    const ROLES: &'static [Role] = &[Role::Admin, Role::Manager];
}

/// Role guard extractor.
///
/// Place it after any body extractor so payload validation runs first:
/// ```ignore
/// async fn create_tag(body: ValidatedJson<CreateTagRequest>, guard: Guard<AdminOnly>) -> ...
/// ```
pub struct Guard<R: RoleSet> {
    pub caller: TokenPayload,
    _roles: PhantomData<R>,
}

impl<R: RoleSet> FromRequest for Guard<R> {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = policy::authorize(extensions.get::<TokenPayload>(), R::ROLES)
            .map(|caller| Guard {
                caller: caller.clone(),
                _roles: PhantomData,
            })
            .map_err(AppError::from);

        if let Err(e) = &result {
            tracing::debug!(path = %req.path(), reason = %e, "request refused by role guard");
        }
        ready(result)
    }
}
