/// Role guard
///
/// Second gate layer, composed inside `JwtMiddleware`: rejects with 403 when
/// the bound identity lacks the required role. A request that reaches it
/// without any bound identity is rejected with 401.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::Role;
use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;

pub struct RequireRole {
    required: Role,
}

impl RequireRole {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireRoleService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
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
        let identity = req.extensions().get::<AuthenticatedUser>().cloned();

        match identity {
            None => Box::pin(async { Err(AppError::Auth(AuthError::MissingToken).into()) }),
            Some(user) if !user.role.satisfies(self.required) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    role = %user.role,
                    required = %self.required,
                    path = %req.path(),
                    "Role check failed"
                );
                Box::pin(async { Err(AppError::Auth(AuthError::Forbidden).into()) })
            }
            Some(_) => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
        }
    }
}
