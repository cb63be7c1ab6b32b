//! Integration tests for the customer directory, the access gate and login.

mod common;

use ibank_core::access::Visibility;
use ibank_core::auth::Principal;
use ibank_db::{AuthError, AuthRepository, UserError, UserRepository};
use ibank_shared::types::{ManagerId, PhoneNumber, UserId};

use common::{PASSWORD, customer, new_user, setup};

#[tokio::test]
async fn test_create_user_stores_hash_and_normalized_phone() {
    let db = setup().await;
    let repo = UserRepository::new(db.clone());

    let user = repo
        .create_user(new_user("alice", "+7 900 000-00-01"))
        .await
        .unwrap();

    assert_eq!(user.phone_number, "+79000000001");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, PASSWORD);
    assert_eq!(Visibility::from(user.visibility), Visibility::Visible);
    assert_eq!(repo.find_by_login("alice").await.unwrap().unwrap().id, user.id);
}

#[tokio::test]
async fn test_duplicates_rejected() {
    let db = setup().await;
    let repo = UserRepository::new(db.clone());
    repo.create_user(new_user("alice", "900000001")).await.unwrap();

    let err = repo
        .create_user(new_user("alice", "900000002"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::DuplicateLogin(ref login) if login == "alice"));

    let mut same_passport = new_user("alice2", "900000002");
    same_passport.passport_series = "PS-alice".to_string();
    let err = repo.create_user(same_passport).await.unwrap_err();
    assert!(matches!(err, UserError::DuplicatePassport(_)));

    let err = repo.create_user(new_user("carol", "12")).await.unwrap_err();
    assert!(matches!(err, UserError::InvalidPhone(_)));

    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_phone_is_not_unique() {
    let db = setup().await;
    let first = customer(&db, "first", "900000009").await;
    let second = customer(&db, "second", "900000009").await;
    let repo = UserRepository::new(db.clone());
    let phone = PhoneNumber::parse("900000009").unwrap();

    let all: Vec<i64> = repo
        .search_by_phone(&phone)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(all, vec![first.get(), second.get()]);
    assert_eq!(repo.find_by_phone(&phone).await.unwrap().unwrap().id, first.get());
}

#[tokio::test]
async fn test_login_user() {
    let db = setup().await;
    let alice = customer(&db, "alice", "900000001").await;
    let auth = AuthRepository::new(db.clone());

    let session = auth.login_user("alice", PASSWORD).await.unwrap();
    assert_eq!(session.principal, Principal::Customer(alice));
    assert_eq!(session.user_id(), Some(alice));

    let err = auth.login_user("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidPassword));

    let err = auth.login_user("nobody", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownLogin(_)));
}

#[tokio::test]
async fn test_hidden_user_is_refused_regardless_of_password() {
    let db = setup().await;
    let alice = customer(&db, "alice", "900000001").await;
    let users = UserRepository::new(db.clone());
    let auth = AuthRepository::new(db.clone());

    users.set_visibility(alice, Visibility::Hidden).await.unwrap();

    for password in [PASSWORD, "wrong"] {
        let err = auth.login_user("alice", password).await.unwrap_err();
        assert!(matches!(err, AuthError::Suspended(ref login) if login == "alice"));
    }

    let hidden = users.list_by_visibility(Visibility::Hidden).await.unwrap();
    assert_eq!(hidden.len(), 1);
    assert!(users.list_by_visibility(Visibility::Visible).await.unwrap().is_empty());

    assert_eq!(users.toggle_visibility(alice).await.unwrap(), Visibility::Visible);
    assert!(auth.login_user("alice", PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_set_visibility_unknown_user() {
    let db = setup().await;
    let err = UserRepository::new(db.clone())
        .set_visibility(UserId::new(5), Visibility::Hidden)
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::NotFound(id) if id == UserId::new(5)));
}

#[tokio::test]
async fn test_manager_login() {
    let db = setup().await;
    let auth = AuthRepository::new(db.clone());
    let manager = auth.create_manager("IBank", "admin", "boss").await.unwrap();

    let session = auth.login_manager("admin", "boss").await.unwrap();
    assert_eq!(session.principal, Principal::Manager(ManagerId::new(manager.id)));
    assert!(session.is_manager());

    assert!(matches!(
        auth.login_manager("admin", "nope").await.unwrap_err(),
        AuthError::InvalidPassword
    ));
    assert!(matches!(
        auth.create_manager("Other", "admin", "x").await.unwrap_err(),
        AuthError::DuplicateLogin(_)
    ));
    // Customers and managers live in separate directories.
    assert!(matches!(
        auth.login_user("admin", "boss").await.unwrap_err(),
        AuthError::UnknownLogin(_)
    ));
}
