use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::info;
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

use crate::middleware::AuthenticatedUser;

/// Access log middleware.
///
/// Assigns a request id, logs method and path on entry, status and latency on exit. The user id
/// is included once the JWT gate has bound an identity. Errors raised by
/// inner middleware are logged with the status they will render as.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4().to_string();
        let method = req.method().to_string();
        let path = req.path().to_string();

        info!("[{}] Request started: {} {}", request_id, method, path);

        let service = self.service.clone();

        Box::pin(async move {
            let result = service.call(req).await;
            let elapsed = start_time.elapsed().as_millis();

            match &result {
                Ok(res) => {
                    let user_id = res
                        .request()
                        .extensions()
                        .get::<AuthenticatedUser>()
                        .map(|user| user.user_id.clone())
                        .unwrap_or_else(|| "-".to_string());

                    info!(
                        "[{}] Request completed: {} {} - Status: {} ({}ms) user={}",
                        request_id,
                        method,
                        path,
                        res.status().as_u16(),
                        elapsed,
                        user_id
                    );
                }
                Err(e) => {
                    info!(
                        "[{}] Request rejected: {} {} - Status: {} ({}ms)",
                        request_id,
                        method,
                        path,
                        e.as_response_error().status_code().as_u16(),
                        elapsed
                    );
                }
            }

            result
        })
    }
}
