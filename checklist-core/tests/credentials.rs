mod common;

use checklist_core::{AuthFailure, Database, Error, LoginRequest, NewUser, ValidationError};
use common::{new_user, open_temp, register};

#[tokio::test]
async fn register_then_find_returns_the_same_fields() {
    let (_dir, db) = open_temp().await;
    let credentials = db.credentials();
    let input = new_user("ann");

    let user_id = credentials.register(&input).await.unwrap();
    let user = credentials.find_by_username("ann").await.unwrap().unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.name, input.name);
    assert_eq!(user.date_of_birth, input.date_of_birth);
    assert_eq!(user.username, input.username);
    assert_eq!(user.email, input.email);

    let by_id = credentials.find_by_id(user_id).await.unwrap();
    assert_eq!(by_id, Some(user));
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let (_dir, db) = open_temp().await;
    register(&db, "ann").await;

    let user = db.credentials().find_by_username("ann").await.unwrap().unwrap();
    assert_ne!(user.password_hash(), "ann-secret");
    assert!(!user.password_hash().contains("ann-secret"));
    assert!(user.password_hash().starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_username_is_rejected_and_leaves_one_row() {
    let (_dir, db) = open_temp().await;
    let credentials = db.credentials();
    register(&db, "ann").await;

    let mut again = new_user("ann");
    again.email = "other@example.com".into();
    let err = credentials.register(&again).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateUsername(ref name) if name == "ann"));

    let user = credentials.find_by_username("ann").await.unwrap().unwrap();
    assert_eq!(user.email, "ann@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (_dir, db) = open_temp().await;
    let credentials = db.credentials();
    register(&db, "ann").await;

    let mut other = new_user("bob");
    other.email = "ann@example.com".into();
    let err = credentials.register(&other).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateEmail(ref email) if email == "ann@example.com"));
    assert!(credentials.find_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn authenticate_requires_the_registered_pair() {
    let (_dir, db) = open_temp().await;
    let credentials = db.credentials();
    let ann = register(&db, "ann").await;
    register(&db, "bob").await;

    let user = credentials.authenticate("ann", "ann-secret").await.unwrap();
    assert_eq!(user.map(|u| u.id), Some(ann));

    assert!(credentials.authenticate("ann", "bob-secret").await.unwrap().is_none());
    assert!(credentials.authenticate("ann", "").await.unwrap().is_none());
    assert!(credentials.authenticate("carol", "ann-secret").await.unwrap().is_none());
}

#[tokio::test]
async fn login_distinguishes_unknown_username_from_wrong_password() {
    let (_dir, db) = open_temp().await;
    let credentials = db.credentials();
    register(&db, "ann").await;

    let err = credentials
        .login(&LoginRequest::new("nobody", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(AuthFailure::UnknownUsername)));

    let err = credentials
        .login(&LoginRequest::new("ann", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(AuthFailure::WrongPassword)));

    let err = credentials
        .login(&LoginRequest::new("ann", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingCredentials)
    ));

    let user = credentials
        .login(&LoginRequest::new("ann", "ann-secret"))
        .await
        .unwrap();
    assert_eq!(user.username, "ann");
}

#[tokio::test]
async fn schema_initialization_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("checklist.db");

    let db = Database::open(&path).await.unwrap();
    let ann = register(&db, "ann").await;
    db.close().await;

    let db = Database::open(&path).await.unwrap();
    let user = db.credentials().find_by_id(ann).await.unwrap().unwrap();
    assert_eq!(user.username, "ann");
}

#[tokio::test]
async fn database_runs_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checklist.db");
    let db = Database::open(&path).await.unwrap();
    register(&db, "ann").await;

    assert!(dir.path().join("checklist.db-wal").exists());
}

#[tokio::test]
async fn store_does_not_validate_form_fields() {
    let (_dir, db) = open_temp().await;
    let blank = NewUser {
        username: "ann".into(),
        ..NewUser::default()
    };
    assert!(blank.validate().is_err());

    // NOT NULL is the only store-side rule, and empty strings satisfy it.
    db.credentials().register(&blank).await.unwrap();
}
