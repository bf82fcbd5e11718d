use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{AuthFailure, Error, Result};
use crate::models::{LoginRequest, NewUser, User, UserId};
use crate::password;

/// Operations over the `users` table.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, date_of_birth, username, email, password
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, date_of_birth, username, email, password
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Returns the user only if the username exists and the password matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .find_by_username(username)
            .await?
            .filter(|user| password::verify(password, &user.password_hash));

        Ok(user)
    }

    /// Like [`authenticate`](Self::authenticate), but reports why a login was
    /// refused.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        request.validate()?;

        let Some(user) = self.find_by_username(&request.username).await? else {
            debug!(username = %request.username, "login for unknown username");
            return Err(AuthFailure::UnknownUsername.into());
        };

        if !password::verify(&request.password, &user.password_hash) {
            debug!(username = %request.username, "login with wrong password");
            return Err(AuthFailure::WrongPassword.into());
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    pub async fn register(&self, new_user: &NewUser) -> Result<UserId> {
        if self.find_by_username(&new_user.username).await?.is_some() {
            return Err(Error::DuplicateUsername(new_user.username.clone()));
        }

        let password_hash = password::hash(&new_user.password)?;

        let result = sqlx::query(
            "INSERT INTO users (name, date_of_birth, username, email, password)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.name)
        .bind(&new_user.date_of_birth)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_insert_error(e, new_user))?;

        let user_id = UserId(result.last_insert_rowid());
        info!(%user_id, username = %new_user.username, "user registered");

        Ok(user_id)
    }

    /// Removes the account and, through the foreign key, all of its tasks.
    pub async fn delete(&self, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn classify_insert_error(err: sqlx::Error, new_user: &NewUser) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if db_err.message().contains("users.email") {
                return Error::DuplicateEmail(new_user.email.clone());
            }
            return Error::DuplicateUsername(new_user.username.clone());
        }
    }
    Error::Store(err)
}
