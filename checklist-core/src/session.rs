//! Who is logged in, where the user is, and what is being edited.
//!
//! The current user travels inside [`Route`] values instead of living in
//! process-wide state, so several sessions can coexist.

use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::models::{LoginRequest, TaskId, User, UserId};

#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<UserId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only a successful login establishes the session. Any failure leaves
    /// the previous state untouched.
    pub async fn login(
        &mut self,
        credentials: &CredentialStore,
        request: &LoginRequest,
    ) -> Result<User> {
        let user = credentials.login(request).await?;
        self.current_user = Some(user.id);
        Ok(user)
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.current_user
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn logout(&mut self) -> Option<UserId> {
        self.current_user.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Profile { user_id: UserId },
    Checklist { user_id: UserId },
}

impl Route {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Route::Login | Route::Signup => None,
            Route::Profile { user_id } | Route::Checklist { user_id } => Some(*user_id),
        }
    }
}

/// A rename the edit machine has decided to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    pub task_id: TaskId,
    pub task_name: String,
}

/// Inline edit state of one task list. At most one row is edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing { task_id: TaskId, draft: String },
}

impl EditState {
    /// Starts editing `task_id` with its current text as the draft.
    ///
    /// A different row that was already being edited is resolved first and
    /// its outcome returned. Beginning the row that is already being edited
    /// keeps the draft.
    pub fn begin(&mut self, task_id: TaskId, current_text: &str) -> Option<PendingRename> {
        if self.editing() == Some(task_id) {
            return None;
        }
        let prior = self.finish();
        *self = EditState::Editing {
            task_id,
            draft: current_text.to_owned(),
        };
        prior
    }

    /// The edit field lost focus. Returns the rename to persist, or `None`
    /// when the draft is blank and must be thrown away.
    pub fn finish(&mut self) -> Option<PendingRename> {
        match std::mem::take(self) {
            EditState::Editing { task_id, draft } if !draft.trim().is_empty() => {
                Some(PendingRename {
                    task_id,
                    task_name: draft,
                })
            }
            _ => None,
        }
    }

    pub fn discard(&mut self) {
        *self = EditState::Viewing;
    }

    pub fn editing(&self) -> Option<TaskId> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { task_id, .. } => Some(*task_id),
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { draft, .. } => Some(draft.as_str()),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { draft, .. } => Some(draft),
        }
    }
}
