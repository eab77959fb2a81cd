// rest/mod.rs — Public REST API server.
//
// Axum HTTP server exposing the task CRUD surface.
//
// Endpoints:
//   GET    /task/getAllTasks
//   POST   /task/addTask
//   GET    /task/{id}
//   PUT    /task/{id}
//   DELETE /task/{id}
//   GET    /health

pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Tasks
        .route("/task/getAllTasks", get(routes::tasks::get_all_tasks))
        .route("/task/addTask", post(routes::tasks::add_task))
        .route(
            "/task/{id}",
            get(routes::tasks::get_task_by_id)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task_by_id),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
