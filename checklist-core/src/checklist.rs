use tracing::debug;

use crate::error::Result;
use crate::models::{Task, TaskId, UserId};
use crate::session::{EditState, PendingRename};
use crate::tasks::TaskStore;

/// In-memory task list of one user.
///
/// Every mutation goes to the store first and is followed by a full
/// re-fetch. When a store call fails the list keeps the last successful
/// fetch.
pub struct Checklist {
    user_id: UserId,
    store: TaskStore,
    tasks: Vec<Task>,
    edit: EditState,
}

impl Checklist {
    pub async fn load(store: TaskStore, user_id: UserId) -> Result<Self> {
        let tasks = store.list(user_id).await?;
        Ok(Self {
            user_id,
            store,
            tasks,
            edit: EditState::Viewing,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        self.edit.draft_mut()
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.tasks = self.store.list(self.user_id).await?;
        Ok(())
    }

    pub async fn add(&mut self, task_name: &str) -> Result<Option<TaskId>> {
        let task_id = self.store.add(self.user_id, task_name).await?;
        if task_id.is_some() {
            self.refresh().await?;
        }
        Ok(task_id)
    }

    pub async fn toggle(&mut self, task_id: TaskId) -> Result<()> {
        let Some(task) = self.task(task_id) else {
            return Ok(());
        };
        let completed = !task.completed;
        self.store
            .set_completed(self.user_id, task_id, completed)
            .await?;
        self.refresh().await
    }

    pub async fn remove(&mut self, task_id: TaskId) -> Result<()> {
        if self.edit.editing() == Some(task_id) {
            self.edit.discard();
        }
        self.store.remove(self.user_id, task_id).await?;
        self.refresh().await
    }

    /// Switches `task_id` into editing, committing any other pending edit.
    pub async fn begin_edit(&mut self, task_id: TaskId) -> Result<()> {
        let Some(task) = self.task(task_id) else {
            return Ok(());
        };
        let current_text = task.task_name.clone();
        match self.edit.begin(task_id, &current_text) {
            Some(prior) => self.commit(prior).await,
            None => Ok(()),
        }
    }

    /// The edit field lost focus.
    pub async fn finish_edit(&mut self) -> Result<()> {
        match self.edit.finish() {
            Some(pending) => self.commit(pending).await,
            None => {
                debug!(user_id = %self.user_id, "edit closed without changes");
                Ok(())
            }
        }
    }

    pub fn discard_edit(&mut self) {
        self.edit.discard();
    }

    fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    async fn commit(&mut self, pending: PendingRename) -> Result<()> {
        self.store
            .rename(self.user_id, pending.task_id, &pending.task_name)
            .await?;
        self.refresh().await
    }
}
