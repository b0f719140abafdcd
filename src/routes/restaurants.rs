/// Restaurant Routes
///
/// CRUD over the restaurant catalogue. Every handler runs behind the JWT gate.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Restaurant, RestaurantInput};
use crate::store::RestaurantStore;
use crate::validators::{is_valid_email, is_valid_name};

fn not_found() -> AppError {
    AppError::NotFound("Restaurant".to_string())
}

/// Validate and normalise client input; `email` is optional
fn validated(input: RestaurantInput) -> Result<RestaurantInput, AppError> {
    let name = is_valid_name(&input.name)?;
    let email = if input.email.trim().is_empty() {
        String::new()
    } else {
        is_valid_email(&input.email)?
    };

    Ok(RestaurantInput {
        name,
        email,
        address: input.address.trim().to_string(),
        cuisine: input.cuisine.trim().to_string(),
    })
}

/// POST /restaurants
pub async fn create_restaurant(
    form: web::Json<RestaurantInput>,
    store: web::Data<dyn RestaurantStore>,
) -> Result<HttpResponse, AppError> {
    let restaurant = validated(form.into_inner())?.into_restaurant(Uuid::new_v4().to_string());
    store.insert(&restaurant).await?;

    tracing::info!(restaurant_id = %restaurant.restaurant_id, "Restaurant created");
    Ok(HttpResponse::Created().json(restaurant))
}

/// GET /restaurants
pub async fn list_restaurants(
    store: web::Data<dyn RestaurantStore>,
) -> Result<HttpResponse, AppError> {
    let restaurants: Vec<Restaurant> = store.list().await?;
    Ok(HttpResponse::Ok().json(restaurants))
}

/// GET /restaurants/{id}
pub async fn get_restaurant(
    path: web::Path<String>,
    store: web::Data<dyn RestaurantStore>,
) -> Result<HttpResponse, AppError> {
    let restaurant = store.find(&path).await?.ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(restaurant))
}

/// PUT /restaurants/{id}
///
/// Full replacement of the client-editable fields.
pub async fn update_restaurant(
    path: web::Path<String>,
    form: web::Json<RestaurantInput>,
    store: web::Data<dyn RestaurantStore>,
) -> Result<HttpResponse, AppError> {
    let restaurant = validated(form.into_inner())?.into_restaurant(path.into_inner());

    if store.update(&restaurant).await? == 0 {
        return Err(not_found());
    }

    tracing::info!(restaurant_id = %restaurant.restaurant_id, "Restaurant updated");
    Ok(HttpResponse::Ok().json(restaurant))
}

/// DELETE /restaurants/{id}
pub async fn delete_restaurant(
    path: web::Path<String>,
    store: web::Data<dyn RestaurantStore>,
) -> Result<HttpResponse, AppError> {
    if store.delete(&path).await? == 0 {
        return Err(not_found());
    }

    tracing::info!(restaurant_id = %path.as_str(), "Restaurant deleted");
    Ok(HttpResponse::NoContent().finish())
}
