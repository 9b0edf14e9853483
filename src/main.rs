use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::{get, get_service},
    Router,
};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    SqliteConnection,
};
use std::sync::Arc;
use tera::{Context, Tera};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod data;
mod features;
mod handlers;
mod schema;
mod srs;
mod utils;

use data::repositories::SqliteCardStore;
use srs::SrsScheduler;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type Scheduler = Arc<SrsScheduler<SqliteCardStore>>;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    // Database configuration
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "hanxue.db".into());
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to create DB pool");

    {
        let mut conn = pool.get().expect("Failed to get DB connection");
        data::initialize_schema(&mut conn).expect("Failed to initialize schema");
    }

    // The scheduler gets its store here and nowhere else.
    let scheduler: Scheduler = Arc::new(SrsScheduler::new(SqliteCardStore::new(pool.clone())));

    // Templates configuration
    let templates = match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    let templates = Arc::new(templates);

    // Sessions configuration
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_secure(false);

    // Recommendation API router (reads stats through the scheduler)
    let recommend_api_router = Router::new()
        .route("/", get(handlers::recommend::recommendations))
        .with_state(scheduler.clone());

    // Grammar lookup API router (static data, no state)
    let grammar_api_router = Router::new().route("/", get(handlers::grammar::grammar_api));

    // Combined API router
    let api_router = Router::new()
        .nest("/srs", handlers::srs::api_router(scheduler.clone()))
        .nest("/grammar", grammar_api_router)
        .nest("/recommendations", recommend_api_router);

    // Auth router
    let auth_router = Router::new()
        .merge(handlers::auth::login::auth_router(
            pool.clone(),
            templates.clone(),
        ))
        .merge(handlers::auth::register::auth_router(
            pool.clone(),
            templates.clone(),
        ))
        .route("/logout", get(handlers::auth::handle_logout));

    // Main application router
    let app = Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/review", get(handlers::srs::review_page))
        .route("/grammar", get(handlers::grammar::grammar_page))
        .nest("/auth", auth_router)
        .nest("/api", api_router)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(Extension(templates))
        .layer(session_layer);

    // Start server
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    log::info!("Server running on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

// Handlers for the session-aware pages
async fn home(
    Extension(templates): Extension<Arc<Tera>>,
    session: tower_sessions::Session,
) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("logged_in", &utils::is_logged_in(&session).await);
    utils::render_template(&templates, "home.html", context)
}

async fn dashboard(
    Extension(templates): Extension<Arc<Tera>>,
    session: tower_sessions::Session,
) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("logged_in", &utils::is_logged_in(&session).await);
    context.insert("user_id", &utils::get_current_user_id(&session).await);
    utils::render_template(&templates, "dashboard.html", context)
}
