mod auth;
mod health_check;
mod restaurants;
mod users;

pub use auth::{
    logout, refresh, signin, signup, AccessTokenResponse, CookieSettings, SigninRequest,
    SignupRequest, REFRESH_COOKIE,
};
pub use health_check::health_check;
pub use restaurants::{
    create_restaurant, delete_restaurant, get_restaurant, list_restaurants, update_restaurant,
};
pub use users::{get_user, list_users};
