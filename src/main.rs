use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use scoutpost::auth::allowlist::Allowlist;
use scoutpost::auth::role_cache::RoleCache;
use scoutpost::auth::{middleware::require_auth, password};
use scoutpost::guard::OpGuard;
use scoutpost::models::attendance::LeaderRollCall;
use scoutpost::offline::worker::{CacheWorker, FsOrigin};
use scoutpost::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Ensure data directory exists
    std::fs::create_dir_all("data").expect("Failed to create data directory");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/scoutpost.db".to_string());
    let pool = db::init_pool(&database_url)
        .await
        .expect("Failed to open database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Seed the first admin (invite + user + role) on an empty database
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_hash =
        password::hash_password(&admin_password).expect("Failed to hash admin password");
    db::seed_admin(&pool, &admin_email, &admin_hash)
        .await
        .expect("Failed to seed admin account");

    // Warm the offline shell cache at boot. A failed install leaves the
    // shell uncached but the server still comes up.
    let worker = CacheWorker::new(FsOrigin::new("static"));
    match worker.install() {
        Ok(count) => log::info!("Offline shell ready ({count} assets pre-cached)"),
        Err(e) => log::error!("Offline shell install failed: {e}"),
    }
    worker.activate();
    let worker = web::Data::new(worker);

    let allowlist = web::Data::new(Allowlist::from_env());
    let roles = web::Data::new(RoleCache::new());
    let guard = web::Data::new(OpGuard::new());
    let roll_call = web::Data::new(LeaderRollCall::new());

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://127.0.0.1:8080");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(allowlist.clone())
            .app_data(roles.clone())
            .app_data(guard.clone())
            .app_data(roll_call.clone())
            .app_data(worker.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            // Offline shell (public, cache-backed). The worker script is
            // served from the root so its scope covers the whole app.
            .route("/service-worker.js", web::get().to(handlers::shell_handlers::worker_script))
            .route("/shell/{tail:.*}", web::get().to(handlers::shell_handlers::serve))
            // Public routes
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            // Root redirect
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/dashboard", web::get().to(handlers::dashboard::index))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Scout CRUD — /scouts/new BEFORE /scouts/{id} to avoid routing conflict
                    .route("/scouts", web::get().to(handlers::scout_handlers::list))
                    .route("/scouts/new", web::get().to(handlers::scout_handlers::new_form))
                    .route("/scouts", web::post().to(handlers::scout_handlers::create))
                    .route("/scouts/{id}/edit", web::get().to(handlers::scout_handlers::edit_form))
                    .route("/scouts/{id}", web::post().to(handlers::scout_handlers::update))
                    .route("/scouts/{id}/delete", web::post().to(handlers::scout_handlers::delete))
                    // Leader CRUD — deactivate is a soft delete
                    .route("/leaders", web::get().to(handlers::leader_handlers::list))
                    .route("/leaders/new", web::get().to(handlers::leader_handlers::new_form))
                    .route("/leaders", web::post().to(handlers::leader_handlers::create))
                    .route("/leaders/{id}/edit", web::get().to(handlers::leader_handlers::edit_form))
                    .route("/leaders/{id}", web::post().to(handlers::leader_handlers::update))
                    .route("/leaders/{id}/deactivate", web::post().to(handlers::leader_handlers::deactivate))
                    .route("/leaders/{id}/link", web::post().to(handlers::leader_handlers::link_account))
                    // Meeting CRUD
                    .route("/meetings", web::get().to(handlers::meeting_handlers::list))
                    .route("/meetings/new", web::get().to(handlers::meeting_handlers::new_form))
                    .route("/meetings", web::post().to(handlers::meeting_handlers::create))
                    .route("/meetings/{id}/edit", web::get().to(handlers::meeting_handlers::edit_form))
                    .route("/meetings/{id}", web::post().to(handlers::meeting_handlers::update))
                    .route("/meetings/{id}/delete", web::post().to(handlers::meeting_handlers::delete))
                    // Attendance
                    .route("/meetings/{id}/attendance", web::get().to(handlers::attendance_handlers::roster))
                    .route("/meetings/{id}/attendance", web::post().to(handlers::attendance_handlers::mark))
                    .route("/meetings/{id}/attendance/leader", web::post().to(handlers::attendance_handlers::mark_leader))
                    .route("/points/recalculate", web::post().to(handlers::attendance_handlers::recalculate))
                    // Invite allowlist (Admin)
                    .route("/invites", web::get().to(handlers::invite_handlers::list))
                    .route("/invites", web::post().to(handlers::invite_handlers::add))
                    .route("/invites/{id}/delete", web::post().to(handlers::invite_handlers::remove))
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
