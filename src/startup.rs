use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthGate;
use crate::configuration::AuthSettings;
use crate::middleware::{AuthMiddleware, RequestLogger};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    polka_webhook, refresh, revoke, update_user,
};
use crate::store::{ChirpRepository, RefreshTokenRepository, UserRepository};

pub fn run(
    listener: TcpListener,
    auth_settings: AuthSettings,
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    chirps: Arc<dyn ChirpRepository>,
) -> Result<Server, std::io::Error> {
    let gate = web::Data::new(AuthGate::new(auth_settings, users, refresh_tokens));
    let chirps: web::Data<dyn ChirpRepository> = web::Data::from(chirps);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(gate.clone())
            .app_data(chirps.clone())
            .route("/api/healthz", web::get().to(health_check))
            // Session endpoints authenticate themselves from the refresh token
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user).wrap(AuthMiddleware)),
            )
            .service(
                web::resource("/api/chirps")
                    .route(web::get().to(list_chirps))
                    .route(web::post().to(create_chirp).wrap(AuthMiddleware)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp).wrap(AuthMiddleware)),
            )
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
