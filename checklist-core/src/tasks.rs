use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::models::{Task, TaskId, UserId};

/// Operations over the `tasks` table. Every statement is filtered on the
/// owning user, so one user's ids never reach another user's rows.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks of `user_id` in insertion order.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT id, user_id, task_name, completed
             FROM tasks WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Returns `None` without touching the store when `task_name` is blank.
    pub async fn add(&self, user_id: UserId, task_name: &str) -> Result<Option<TaskId>> {
        if task_name.trim().is_empty() {
            debug!(%user_id, "ignoring blank task");
            return Ok(None);
        }

        let result =
            sqlx::query("INSERT INTO tasks (user_id, task_name, completed) VALUES (?, ?, 0)")
                .bind(user_id)
                .bind(task_name)
                .execute(&self.pool)
                .await?;

        let task_id = TaskId(result.last_insert_rowid());
        debug!(%user_id, %task_id, "task added");

        Ok(Some(task_id))
    }

    pub async fn set_completed(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE tasks SET completed = ? WHERE id = ? AND user_id = ?")
            .bind(completed)
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Blank names are discarded and the stored text is left as it was.
    pub async fn rename(&self, user_id: UserId, task_id: TaskId, task_name: &str) -> Result<bool> {
        if task_name.trim().is_empty() {
            debug!(%user_id, %task_id, "discarding blank rename");
            return Ok(false);
        }

        let result = sqlx::query("UPDATE tasks SET task_name = ? WHERE id = ? AND user_id = ?")
            .bind(task_name)
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deleting a task that does not exist is not an error.
    pub async fn remove(&self, user_id: UserId, task_id: TaskId) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
