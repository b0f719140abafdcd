/// JWT Authentication Middleware
///
/// Validates the bearer access token on every request it wraps and binds
/// the caller's identity into request extensions. Handlers read it with
/// `web::ReqData<AuthenticatedUser>`. Requests without a valid token never
/// reach the handler.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{validate_access_token, Role};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Identity bound to a request by `JwtMiddleware`
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Owner of the resource, or an admin
    pub fn can_act_for(&self, user_id: &str) -> bool {
        self.role.is_admin() || self.user_id == user_id
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// JWT middleware for protecting routes
pub struct JwtMiddleware {
    jwt_config: JwtSettings,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        let token = match bearer_token(&req) {
            Some(token) => token,
            None => {
                tracing::debug!(path = %req.path(), "Missing or malformed Authorization header");
                return Box::pin(async { Err(AppError::Auth(AuthError::MissingToken).into()) });
            }
        };

        match validate_access_token(&token, &self.jwt_config) {
            Ok(claims) => {
                // Access tokens always carry a role; validate_access_token checks it
                let identity = AuthenticatedUser {
                    user_id: claims.user_id,
                    role: claims.role.unwrap_or_default(),
                };

                tracing::debug!(
                    user_id = %identity.user_id,
                    role = %identity.role,
                    "JWT validated successfully"
                );
                req.extensions_mut().insert(identity);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "JWT validation failed");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_extraction() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi".to_string()));

        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_srv_request();
        assert_eq!(bearer_token(&basic), None);

        let empty = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();
        assert_eq!(bearer_token(&empty), None);

        assert_eq!(bearer_token(&TestRequest::default().to_srv_request()), None);
    }

    #[test]
    fn test_can_act_for() {
        let ann = AuthenticatedUser {
            user_id: "ann".to_string(),
            role: Role::User,
        };
        let root = AuthenticatedUser {
            user_id: "root".to_string(),
            role: Role::Admin,
        };

        assert!(ann.can_act_for("ann"));
        assert!(!ann.can_act_for("bob"));
        assert!(root.can_act_for("ann"));
    }
}
