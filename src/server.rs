use crate::handlers;
use crate::storage::Storage;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Create the HTTP router with all routes and the CORS layer.
pub fn create_server(storage: Arc<dyn Storage>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/categories", get(handlers::list_categories))
        .route(
            "/categories/:category_id/questions",
            get(handlers::list_questions_by_category),
        )
        .route(
            "/questions",
            get(handlers::list_questions).post(handlers::add_question),
        )
        .route("/questions/:question_id", delete(handlers::delete_question))
        .route("/questions/search", post(handlers::search_questions))
        .route("/quizzes", post(handlers::next_quiz_question))
        .layer(Extension(storage))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    storage: Arc<dyn Storage>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(storage);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on {}", addr);
    println!("🚀 Trivia API running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
