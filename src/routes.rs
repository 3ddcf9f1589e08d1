use crate::{
    api::{attendance, off_day, office, staff},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;
use tracing::warn;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish();

    match cfg {
        Some(cfg) => Governor::new(&cfg),
        None => {
            // only reachable with a zero period or burst, both clamped above
            warn!(requests_per_min, "Invalid limiter settings, using governor defaults");
            Governor::new(&GovernorConfig::default())
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .route("/me", web::get().to(handlers::me))
            .route("/logout", web::post().to(handlers::logout))
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::punch))
                            .route(web::get().to(attendance::list_own)),
                    )
                    .route("/user/{id}", web::get().to(attendance::list_for_user))
                    .route("/approve", web::put().to(attendance::approve))
                    .route("/unapprove", web::put().to(attendance::unapprove)),
            )
            .service(
                web::scope("/off-days")
                    // /off-days
                    .service(
                        web::resource("")
                            .route(web::post().to(off_day::create))
                            .route(web::get().to(off_day::list)),
                    )
                    // before /{id} so it is not parsed as an id
                    .route("/approve", web::put().to(off_day::approve))
                    .route("/{id}", web::get().to(off_day::get))
                    .route("/{id}/deny", web::put().to(off_day::deny)),
            )
            .service(
                web::scope("/offices")
                    .service(
                        web::resource("")
                            .route(web::post().to(office::create))
                            .route(web::get().to(office::list)),
                    )
                    .route("/assign-shifts", web::put().to(office::assign_shifts))
                    .route("/{id}", web::put().to(office::edit))
                    .route("/{id}/shifts", web::post().to(office::add_shift)),
            )
            .route("/staff", web::post().to(staff::create)),
    );
}
