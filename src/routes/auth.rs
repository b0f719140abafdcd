/// Authentication Routes
///
/// Handles sign-up, sign-in, token refresh and logout. The refresh token
/// travels only in the `refresh_token` cookie; JSON bodies carry the access
/// token.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, Role, TokenPair};
use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::models::UserResponse;

pub const REFRESH_COOKIE: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/auth";

/// Cookie attributes that depend on deployment
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
}

/// User registration request
#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(alias = "displayName")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// User login request
#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Access token response; the refresh token is set as a cookie alongside it
#[derive(Serialize, Deserialize, Debug)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn refresh_cookie(token: String, max_age_seconds: i64, cookies: &CookieSettings) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token)
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cookies.secure)
        .max_age(CookieDuration::seconds(max_age_seconds))
        .finish()
}

fn removal_cookie(cookies: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE, "")
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cookies.secure)
        .finish();
    cookie.make_removal();
    cookie
}

fn token_response(tokens: TokenPair, service: &AuthService, cookies: &CookieSettings) -> HttpResponse {
    let jwt = service.jwt_settings();

    HttpResponse::Ok()
        .cookie(refresh_cookie(tokens.refresh_token, jwt.refresh_token_expiry, cookies))
        .json(AccessTokenResponse {
            access_token: tokens.access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt.access_token_expiry,
        })
}

/// POST /auth/signup
///
/// Register a new account. The response body is the public user view; the
/// first refresh token is set as a cookie.
///
/// # Errors
/// - 400: Validation errors, or the email is already registered
/// - 5xx: Store or hashing failure
pub async fn signup(
    form: web::Json<SignupRequest>,
    service: web::Data<AuthService>,
    cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let registration = service
        .register(&form.name, &form.email, &form.password, form.role)
        .await?;

    let max_age = service.jwt_settings().refresh_token_expiry;
    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(registration.refresh_token, max_age, &cookies))
        .json(UserResponse::from(registration.user)))
}

/// POST /auth/signin
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
pub async fn signin(
    form: web::Json<SigninRequest>,
    service: web::Data<AuthService>,
    cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens = service.authenticate(&form.email, &form.password).await?;
    Ok(token_response(tokens, &service, &cookies))
}

/// POST /auth/refresh
///
/// Rotates the session: the presented cookie is consumed and a new pair is
/// issued. A superseded or revoked refresh token gets 401.
pub async fn refresh(
    req: HttpRequest,
    service: web::Data<AuthService>,
    cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let presented = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let tokens = service.refresh(&presented).await?;
    Ok(token_response(tokens, &service, &cookies))
}

/// POST /auth/logout/{user_id}
///
/// Requires a valid access token belonging to `user_id` or to an admin.
pub async fn logout(
    path: web::Path<String>,
    caller: web::ReqData<AuthenticatedUser>,
    service: web::Data<AuthService>,
    cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    if !caller.can_act_for(&user_id) {
        tracing::warn!(
            caller = %caller.user_id,
            target = %user_id,
            "Logout for another user refused"
        );
        return Err(AuthError::Forbidden.into());
    }

    service.revoke(&user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&cookies))
        .json(serde_json::json!({ "message": "Logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = refresh_cookie("tok".to_string(), 60, &CookieSettings { secure: true });

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/auth"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(60)));
    }

    #[test]
    fn test_removal_cookie_is_empty_and_expired() {
        let cookie = removal_cookie(&CookieSettings { secure: false });

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[test]
    fn test_signup_accepts_display_name_alias() {
        let form: SignupRequest = serde_json::from_str(
            r#"{"displayName":"Ann","email":"ann@x.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(form.name, "Ann");
        assert_eq!(form.role, None);

        let admin: SignupRequest = serde_json::from_str(
            r#"{"name":"Root","email":"root@x.com","password":"secret1","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(admin.role, Some(Role::Admin));
    }
}
