//! Per-request tracing.
//!
//! Every request gets a UUID that is attached to a `request` span, made
//! visible through `trace_ctx` for error rendering, and echoed back in
//! `x-request-id`. When the response is ready a single `request_completed`
//! event is emitted, leveled by status class.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::trace_ctx;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let trace_id = Uuid::new_v4().to_string();
        let method = req.method().to_string();
        // Route pattern when one matched, so ids in paths do not explode cardinality.
        let route = req
            .match_pattern()
            .unwrap_or_else(|| req.path().to_string());

        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %method,
            route = %route
        );

        // The task-local scope has to wrap the await, not the construction.
        let fut = self.service.call(req);
        let scoped_id = trace_id.clone();

        Box::pin(async move {
            let result = trace_ctx::with_trace_id(scoped_id, fut.instrument(span)).await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            log_completed(&method, &route, status, start, &trace_id);

            let mut res = result?;
            let value = HeaderValue::from_str(&trace_id)
                .unwrap_or_else(|_| HeaderValue::from_static("invalid-uuid"));
            res.headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            Ok(res)
        })
    }
}

fn log_completed(method: &str, route: &str, status: StatusCode, start: Instant, trace_id: &str) {
    let status_code = status.as_u16();
    let duration_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

    match status_code {
        500.. => error!(http.method = method, http.route = route, http.status_code = status_code, duration_us, trace_id, "request_completed"),
        400..=499 => warn!(http.method = method, http.route = route, http.status_code = status_code, duration_us, trace_id, "request_completed"),
        _ => info!(http.method = method, http.route = route, http.status_code = status_code, duration_us, trace_id, "request_completed"),
    }
}
