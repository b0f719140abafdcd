use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::logger::LoggerMiddleware;
use crate::middleware::{JwtMiddleware, RequireRole};
use crate::routes::{
    create_restaurant, delete_restaurant, get_restaurant, get_user, health_check, list_restaurants,
    list_users, logout, refresh, signin, signup, update_restaurant, CookieSettings,
};
use crate::store::RestaurantStore;

pub fn run(
    listener: TcpListener,
    auth_service: AuthService,
    restaurants: Arc<dyn RestaurantStore>,
    cookies: CookieSettings,
) -> Result<Server, std::io::Error> {
    let jwt_config = auth_service.jwt_settings().clone();
    let auth_service = web::Data::new(auth_service);
    let restaurants: web::Data<dyn RestaurantStore> = web::Data::from(restaurants);
    let cookies = web::Data::new(cookies);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            // Shared state
            .app_data(auth_service.clone())
            .app_data(restaurants.clone())
            .app_data(cookies.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/signin", web::post().to(signin))
                    .route("/refresh", web::post().to(refresh))
                    .service(
                        web::resource("/logout/{user_id}")
                            .wrap(JwtMiddleware::new(jwt_config.clone()))
                            .route(web::post().to(logout)),
                    ),
            )
            // Protected routes (require JWT authentication)
            .service(
                web::scope("/users")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .service(
                        web::resource("")
                            .wrap(RequireRole::admin())
                            .route(web::get().to(list_users)),
                    )
                    .route("/{id}", web::get().to(get_user)),
            )
            .service(
                web::scope("/restaurants")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route("", web::post().to(create_restaurant))
                    .route("", web::get().to(list_restaurants))
                    .route("/{id}", web::get().to(get_restaurant))
                    .route("/{id}", web::put().to(update_restaurant))
                    .route("/{id}", web::delete().to(delete_restaurant)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
