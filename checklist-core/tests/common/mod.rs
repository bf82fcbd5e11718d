use checklist_core::{Database, NewUser, UserId};
use tempfile::TempDir;

pub async fn open_temp() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::open(&dir.path().join("checklist.db"))
        .await
        .expect("open database");
    (dir, db)
}

#[allow(dead_code)]
pub fn new_user(username: &str) -> NewUser {
    NewUser {
        name: format!("{username} name"),
        date_of_birth: "1990-05-17".into(),
        username: username.into(),
        email: format!("{username}@example.com"),
        password: format!("{username}-secret"),
    }
}

#[allow(dead_code)]
pub async fn register(db: &Database, username: &str) -> UserId {
    db.credentials()
        .register(&new_user(username))
        .await
        .expect("register")
}
