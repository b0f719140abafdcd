/// User Routes
///
/// Read-only views over registered accounts. Both endpoints sit behind the
/// JWT gate; listing is admin-only.

use actix_web::{web, HttpResponse};

use crate::auth::AuthService;
use crate::error::AppError;
use crate::models::UserResponse;

/// GET /users/{id}
///
/// Any authenticated caller may read any account's public view.
///
/// # Errors
/// - 404: No such user
pub async fn get_user(
    path: web::Path<String>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = service.find_user(&path).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users (admin)
pub async fn list_users(service: web::Data<AuthService>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserResponse> = service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}
