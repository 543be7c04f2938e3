//! Route configuration
//!
//! Centralized route setup; each domain (videos, playlists, likes, ...)
//! manages its own routes.

use crate::handlers;
use crate::middleware::JwtAuthMiddleware;
use actix_web::web;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health::health_check))
            .configure(routes::videos::configure)
            .configure(routes::comments::configure)
            .configure(routes::tweets::configure)
            .configure(routes::playlists::configure)
            .configure(routes::likes::configure)
            .configure(routes::subscriptions::configure)
            .configure(routes::users::configure),
    );
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod videos {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/videos")
                    // Public read surface
                    .route("", web::get().to(handlers::videos::list_videos))
                    .route("/{id}", web::get().to(handlers::videos::get_video))
                    .route(
                        "/{video_id}/comments",
                        web::get().to(handlers::comments::get_video_comments),
                    )
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .route("", web::post().to(handlers::videos::publish_video))
                            .route("/{id}", web::patch().to(handlers::videos::update_video))
                            .route("/{id}", web::delete().to(handlers::videos::delete_video))
                            .route(
                                "/{id}/toggle-publish",
                                web::patch().to(handlers::videos::toggle_publish_status),
                            )
                            .route(
                                "/{video_id}/comments",
                                web::post().to(handlers::comments::add_comment),
                            ),
                    ),
            );
        }
    }

    pub mod comments {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/comments")
                    .wrap(JwtAuthMiddleware)
                    .route("/{id}", web::patch().to(handlers::comments::update_comment))
                    .route("/{id}", web::delete().to(handlers::comments::delete_comment)),
            );
        }
    }

    pub mod tweets {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/tweets")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::post().to(handlers::tweets::create_tweet))
                    .route("/{id}", web::patch().to(handlers::tweets::update_tweet))
                    .route("/{id}", web::delete().to(handlers::tweets::delete_tweet)),
            );
        }
    }

    pub mod playlists {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/playlists")
                    .route("/{id}", web::get().to(handlers::playlists::get_playlist))
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .route("", web::post().to(handlers::playlists::create_playlist))
                            .route("/{id}", web::patch().to(handlers::playlists::update_playlist))
                            .route(
                                "/{id}",
                                web::delete().to(handlers::playlists::delete_playlist),
                            )
                            .route(
                                "/{id}/videos/{video_id}",
                                web::post().to(handlers::playlists::add_video_to_playlist),
                            )
                            .route(
                                "/{id}/videos/{video_id}",
                                web::delete().to(handlers::playlists::remove_video_from_playlist),
                            ),
                    ),
            );
        }
    }

    pub mod likes {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/likes")
                    .wrap(JwtAuthMiddleware)
                    .route("/videos", web::get().to(handlers::likes::get_liked_videos))
                    .route(
                        "/videos/{id}",
                        web::post().to(handlers::likes::toggle_video_like),
                    )
                    .route(
                        "/comments/{id}",
                        web::post().to(handlers::likes::toggle_comment_like),
                    )
                    .route(
                        "/tweets/{id}",
                        web::post().to(handlers::likes::toggle_tweet_like),
                    ),
            );
        }
    }

    pub mod subscriptions {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/subscriptions").wrap(JwtAuthMiddleware).route(
                    "/channels/{channel_id}",
                    web::post().to(handlers::subscriptions::toggle_subscription),
                ),
            )
            .service(web::scope("/channels").route(
                "/{channel_id}/subscribers",
                web::get().to(handlers::subscriptions::get_channel_subscribers),
            ));
        }
    }

    pub mod users {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/users/me")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::get().to(handlers::users::get_current_user)),
            )
            .service(
                web::scope("/users")
                    .route(
                        "/{user_id}/tweets",
                        web::get().to(handlers::tweets::get_user_tweets),
                    )
                    .route(
                        "/{user_id}/playlists",
                        web::get().to(handlers::playlists::get_user_playlists),
                    )
                    .route(
                        "/{user_id}/subscriptions",
                        web::get().to(handlers::subscriptions::get_subscribed_channels),
                    ),
            );
        }
    }
}
