use anyhow::{Context as _, Result};
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the service indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Symbolic status name, e.g. `NOT_STARTED`.
    pub status: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: String,
    /// RFC 3339 timestamp, set once on insert.
    pub created_date: String,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Tasks ──────────────────────────────────────────────────────────────

    /// Fetch a task by id. A miss is `Ok(None)`, not an error.
    pub async fn find_task_by_id(&self, id: i64) -> Result<Option<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// All tasks ordered ascending by id. Empty vec when the store is empty.
    pub async fn list_tasks_by_id(&self) -> Result<Vec<TaskRow>> {
        with_timeout(async {
            Ok(sqlx::query_as("SELECT * FROM tasks ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?)
        })
        .await
    }

    pub async fn task_exists(&self, id: i64) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    /// Insert or update a task and return the persisted row.
    ///
    /// `id == 0` means unassigned: the row is inserted and SQLite assigns the
    /// next id. A non-zero `id` updates the matching row wholesale; callers
    /// preserve `created_date` by passing the stored value back in.
    pub async fn save_task(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
        status: &str,
        due_date: &str,
        created_date: &str,
    ) -> Result<TaskRow> {
        let id = if id == 0 {
            sqlx::query(
                "INSERT INTO tasks (title, description, status, due_date, created_date)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(title)
            .bind(description)
            .bind(status)
            .bind(due_date)
            .bind(created_date)
            .execute(&self.pool)
            .await?
            .last_insert_rowid()
        } else {
            sqlx::query(
                "UPDATE tasks SET title = ?, description = ?, status = ?, due_date = ?, created_date = ?
                 WHERE id = ?",
            )
            .bind(title)
            .bind(description)
            .bind(status)
            .bind(due_date)
            .bind(created_date)
            .bind(id)
            .execute(&self.pool)
            .await?;
            id
        };
        self.find_task_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after save"))
    }

    /// Remove a task. Callers check existence first; deleting an absent id is
    /// whatever SQLite does with it (zero rows affected).
    pub async fn delete_task(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_storage() -> (Storage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).await.unwrap();
        (storage, dir)
    }

    async fn save_new(storage: &Storage, title: &str) -> TaskRow {
        storage
            .save_task(
                0,
                title,
                Some("Test Description"),
                "NOT_STARTED",
                "2024-12-31",
                "2024-01-15T09:30:00+00:00",
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let (storage, _dir) = make_storage().await;
        let first = save_new(&storage, "first").await;
        let second = save_new(&storage, "second").await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn find_miss_is_none() {
        let (storage, _dir) = make_storage().await;
        assert!(storage.find_task_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_ordered_and_empty_when_no_rows() {
        let (storage, _dir) = make_storage().await;
        assert!(storage.list_tasks_by_id().await.unwrap().is_empty());

        save_new(&storage, "a").await;
        save_new(&storage, "b").await;
        save_new(&storage, "c").await;
        let rows = storage.list_tasks_by_id().await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn exists_tracks_inserts_and_deletes() {
        let (storage, _dir) = make_storage().await;
        assert!(!storage.task_exists(1).await.unwrap());
        save_new(&storage, "t").await;
        assert!(storage.task_exists(1).await.unwrap());
        storage.delete_task(1).await.unwrap();
        assert!(!storage.task_exists(1).await.unwrap());
        assert!(storage.find_task_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_fields_in_place() {
        let (storage, _dir) = make_storage().await;
        let row = save_new(&storage, "before").await;

        let updated = storage
            .save_task(
                row.id,
                "after",
                None,
                "COMPLETED",
                "2025-01-01",
                &row.created_date,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, row.id);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, "COMPLETED");
        assert_eq!(updated.due_date, "2025-01-01");
        assert_eq!(updated.created_date, row.created_date);
        assert_eq!(storage.list_tasks_by_id().await.unwrap().len(), 1);
    }
}
