// rest/routes/tasks.rs — Task CRUD routes.
//
// Validation failures are 400 with a field→message map and are not logged as
// failures; a missing id is 404; a persistence failure is 500 with a fixed
// generic body, logged server-side with full detail.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::tasks::{Task, TaskPayload};
use crate::AppContext;

type ApiError = (StatusCode, Json<Value>);

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Task not found" })),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

pub async fn get_all_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let rows = ctx.storage.list_tasks_by_id().await.map_err(|e| {
        error!(err = %e, "error listing tasks");
        internal_error("Failed to load tasks")
    })?;
    if rows.is_empty() {
        info!("no tasks found");
        return Ok(Json(Vec::new()));
    }
    let tasks = rows
        .into_iter()
        .map(Task::from_row)
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(|e| {
            error!(err = %e, "error decoding task rows");
            internal_error("Failed to load tasks")
        })?;
    Ok(Json(tasks))
}

pub async fn add_task(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let valid = payload
        .validate()
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(json!(errors))))?;

    let created_date = payload.created_date.unwrap_or_else(Utc::now);

    let task = ctx
        .storage
        .save_task(
            0,
            &valid.title,
            valid.description.as_deref(),
            valid.status.as_str(),
            &valid.due_date.to_string(),
            &created_date.to_rfc3339(),
        )
        .await
        .and_then(Task::from_row)
        .map_err(|e| {
            error!(err = %e, "error saving task");
            internal_error("Failed to save task")
        })?;
    Ok(Json(task))
}

pub async fn get_task_by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    match ctx.storage.find_task_by_id(id).await {
        Ok(Some(row)) => Task::from_row(row).map(Json).map_err(|e| {
            error!(err = %e, "error decoding task row");
            internal_error("Failed to load task")
        }),
        Ok(None) => Err(not_found()),
        Err(e) => {
            error!(err = %e, "error loading task");
            Err(internal_error("Failed to load task"))
        }
    }
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let valid = payload
        .validate()
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(json!(errors))))?;

    let existing = ctx.storage.find_task_by_id(id).await.map_err(|e| {
        error!(err = %e, "error loading task for update");
        internal_error("Failed to update task")
    })?;
    let Some(existing) = existing else {
        return Err(not_found());
    };

    // title/description/status/dueDate are replaced wholesale; id and
    // created_date come from the stored row, never the payload.
    let task = ctx
        .storage
        .save_task(
            existing.id,
            &valid.title,
            valid.description.as_deref(),
            valid.status.as_str(),
            &valid.due_date.to_string(),
            &existing.created_date,
        )
        .await
        .and_then(Task::from_row)
        .map_err(|e| {
            error!(err = %e, "error updating task");
            internal_error("Failed to update task")
        })?;
    Ok(Json(task))
}

pub async fn delete_task_by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let exists = ctx.storage.task_exists(id).await.map_err(|e| {
        error!(err = %e, "error checking task existence");
        internal_error("Failed to delete task")
    })?;
    if !exists {
        return Err(not_found());
    }

    ctx.storage.delete_task(id).await.map_err(|e| {
        error!(err = %e, "error deleting task");
        internal_error("Failed to delete task")
    })?;
    Ok(StatusCode::NO_CONTENT)
}
