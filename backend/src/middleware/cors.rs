//! CORS middleware for the browser client and serverless-style callers.
//!
//! Every response carries the allow-origin, allow-headers and allow-methods
//! headers. `OPTIONS` preflight requests are answered with `200 OK` before
//! routing, so no handler or extractor runs for them.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::HttpResponse;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

/// Request headers browsers may send.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Methods exposed to cross-origin callers.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Origins allowed to call the API.
///
/// An empty list, or one containing `*`, allows any origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Build from configured origins; blank entries are ignored.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_origins = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_owned())
            .filter(|o| !o.is_empty())
            .collect();
        Self { allowed_origins }
    }

    fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Value for `Access-Control-Allow-Origin` given the request's `Origin`.
    ///
    /// A listed origin is echoed back. Unlisted origins receive the first
    /// configured origin, which the browser then rejects.
    pub fn allow_origin_for(&self, origin: Option<&str>) -> String {
        if self.allows_any() {
            return "*".to_owned();
        }
        origin
            .and_then(|o| self.allowed_origins.iter().find(|allowed| *allowed == o))
            .or_else(|| self.allowed_origins.first())
            .cloned()
            .unwrap_or_else(|| "*".to_owned())
    }

    fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        let allow_origin = self.allow_origin_for(origin);
        match HeaderValue::from_str(&allow_origin) {
            Ok(value) => {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
            Err(error) => warn!(%error, origin = allow_origin, "invalid CORS origin header"),
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        if !self.allows_any() {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// CORS middleware factory.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use tpc_backend::middleware::{Cors, CorsConfig};
///
/// let app = App::new().wrap(Cors::new(CorsConfig::new(["https://tpcglobal.io"])));
/// ```
#[derive(Clone)]
pub struct Cors {
    config: Rc<CorsConfig>,
}

impl Cors {
    /// Wrap a configuration.
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            config: Rc::clone(&self.config),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: S,
    config: Rc<CorsConfig>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let config = Rc::clone(&self.config);

        if req.method() == Method::OPTIONS {
            let mut res = req.into_response(HttpResponse::Ok().finish());
            config.apply(origin.as_deref(), res.headers_mut());
            return Box::pin(ready(Ok(res.map_into_right_body())));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            config.apply(origin.as_deref(), res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
