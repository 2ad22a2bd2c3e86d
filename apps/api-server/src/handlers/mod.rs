//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod tags;
mod users;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::validation::{json_config, path_config, query_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
            web::scope("/api/v1")
                // Public routes
                .route("/healthcheck", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/confirm", web::get().to(auth::confirm))
                        .route("/reset-password", web::post().to(auth::reset_password))
                        .route("/restore-password", web::post().to(auth::restore_password))
                        .route("/logout", web::get().to(auth::logout))
                        .route("/token", web::get().to(auth::token)),
                )
                // Static segments before `{id}`
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        .route("/accessible", web::get().to(posts::accessible))
                        .route("/tag/{id}", web::get().to(posts::by_tag))
                        .route("/{id}", web::get().to(posts::get))
                        .route("/{id}", web::patch().to(posts::edit))
                        .route("/{id}", web::delete().to(posts::delete)),
                )
                .service(
                    web::scope("/tag")
                        .route("", web::get().to(tags::list))
                        .route("", web::post().to(tags::create))
                        .route("/{id}", web::get().to(tags::get))
                        .route("/{id}", web::delete().to(tags::delete)),
                )
                .service(
                    web::scope("/comment")
                        .route("", web::post().to(comments::create))
                        .route("/publish/{id}", web::patch().to(comments::publish))
                        .route("/published/{post_id}", web::get().to(comments::published))
                        .route("/unpublished/{post_id}", web::get().to(comments::unpublished))
                        .route("/{id}", web::delete().to(comments::delete)),
                )
                .service(
                    web::scope("/user")
                        .route("", web::get().to(users::list))
                        .route("/me", web::get().to(users::me))
                        .route("/{id}", web::patch().to(users::edit)),
                ),
        );
}
