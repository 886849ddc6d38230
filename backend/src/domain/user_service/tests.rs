//! Behavioural tests for the store-backed user service.

use super::*;
use crate::domain::ListFilter;
use crate::domain::ports::ItemListService;
use crate::domain::service_test_helpers::{Harness, harness};
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn create_assigns_id_key_and_timestamps(harness: Harness) {
    let user = harness
        .users
        .create_user(NewUser::new("alice").with_email("alice@example.com"))
        .await
        .expect("create user");
    assert!(user.id.is_assigned());
    assert_eq!(user.api_key.expose().len(), crate::domain::API_KEY_LEN);
    assert_eq!(user.created_at, harness.clock.utc());
    assert_eq!(user.created_at, user.updated_at);
}

#[rstest]
#[case("alice")]
#[case("ALICE")]
#[case("Alice")]
#[tokio::test]
async fn duplicate_names_conflict_in_any_case(harness: Harness, #[case] second: &str) {
    harness.user("alice").await;
    let err = harness
        .users
        .create_user(NewUser::new(second))
        .await
        .expect_err("name is taken");
    assert!(err.is(ErrorCode::Conflict));
    assert_eq!(err.code(), "CONFLICT_NAME_TAKEN");
    assert_eq!(harness.tally.rollbacks(), 1);
    assert_eq!(harness.tally.commits(), 1);
}

#[rstest]
#[tokio::test]
async fn create_requires_a_name(harness: Harness) {
    let err = harness
        .users
        .create_user(NewUser::default())
        .await
        .expect_err("missing name");
    assert!(err.is(ErrorCode::Invalid));
    assert_eq!(harness.store.row_counts().await, (0, 0, 0));
}

#[rstest]
#[tokio::test]
async fn register_creates_the_default_list(harness: Harness) {
    let user = harness
        .users
        .register_user(NewUser::new("alice"))
        .await
        .expect("register");
    let lists = harness
        .lists
        .find_lists(Some(&user), ListFilter::by_owner(user.id))
        .await
        .expect("lists");
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, DEFAULT_LIST_NAME);
    assert!(lists[0].items.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_registration_leaves_no_rows(harness: Harness) {
    harness.user("alice").await;
    harness
        .users
        .register_user(NewUser::new("Alice"))
        .await
        .expect_err("duplicate");
    assert_eq!(harness.store.row_counts().await, (1, 0, 0));
}

#[rstest]
#[tokio::test]
async fn login_accepts_the_stored_key(harness: Harness) {
    let alice = harness.user("alice").await;
    let credentials =
        LoginCredentials::try_from_parts("ALICE", alice.api_key.expose()).expect("credentials");
    let logged_in = harness.users.login(&credentials).await.expect("login");
    assert_eq!(logged_in.id, alice.id);
}

#[rstest]
#[case("alice", "wrong-key")]
#[case("nobody", "wrong-key")]
#[tokio::test]
async fn login_failures_are_uniform(
    harness: Harness,
    #[case] name: &str,
    #[case] api_key: &str,
) {
    harness.user("alice").await;
    let credentials = LoginCredentials::try_from_parts(name, api_key).expect("credentials");
    let err = harness
        .users
        .login(&credentials)
        .await
        .expect_err("login fails");
    assert!(err.is(ErrorCode::Unauthorized));
    assert_eq!(err.message(), "invalid credentials");
}

#[rstest]
#[tokio::test]
async fn update_applies_present_fields_and_stamps_time(harness: Harness) {
    let alice = harness.user("alice").await;
    harness.clock.advance_seconds(60);
    let updated = harness
        .users
        .update_user(
            alice.id,
            UserUpdate {
                name: None,
                email: Some("alice@example.com".into()),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.name, "alice");
    assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
    assert_eq!(updated.updated_at, harness.clock.utc());
    assert_eq!(updated.created_at, alice.created_at);

    let stored = harness
        .users
        .find_user_by_id(alice.id)
        .await
        .expect("stored");
    assert_eq!(stored.email, updated.email);
}

#[rstest]
#[tokio::test]
async fn update_of_missing_user_is_not_found(harness: Harness) {
    let err = harness
        .users
        .update_user(
            UserId::new(42),
            UserUpdate {
                name: Some("bob".into()),
                email: None,
            },
        )
        .await
        .expect_err("missing user");
    assert!(err.is(ErrorCode::NotFound));
}

#[rstest]
#[tokio::test]
async fn update_cannot_take_another_users_name(harness: Harness) {
    harness.user("alice").await;
    let bob = harness.user("bob").await;
    let err = harness
        .users
        .update_user(
            bob.id,
            UserUpdate {
                name: Some("Alice".into()),
                email: None,
            },
        )
        .await
        .expect_err("name taken");
    assert!(err.is(ErrorCode::Conflict));
    assert_eq!(harness.tally.rollbacks(), 1);
}

#[rstest]
#[tokio::test]
async fn renaming_to_own_name_in_other_case_is_allowed(harness: Harness) {
    let alice = harness.user("alice").await;
    let updated = harness
        .users
        .update_user(
            alice.id,
            UserUpdate {
                name: Some("Alice".into()),
                email: None,
            },
        )
        .await
        .expect("rename");
    assert_eq!(updated.name, "Alice");
}

#[rstest]
#[tokio::test]
async fn empty_update_is_invalid(harness: Harness) {
    let alice = harness.user("alice").await;
    let err = harness
        .users
        .update_user(alice.id, UserUpdate::default())
        .await
        .expect_err("empty update");
    assert!(err.is(ErrorCode::Invalid));
}

#[rstest]
#[tokio::test]
async fn delete_removes_once(harness: Harness) {
    let alice = harness.user("alice").await;
    harness.list(&alice, "Groceries").await;
    harness.users.delete_user(alice.id).await.expect("delete");
    let err = harness
        .users
        .delete_user(alice.id)
        .await
        .expect_err("already gone");
    assert!(err.is(ErrorCode::NotFound));
    assert_eq!(harness.store.row_counts().await, (0, 0, 0));
}

#[rstest]
#[tokio::test]
async fn lookups_by_name_and_key(harness: Harness) {
    let alice = harness.user("alice").await;
    let by_name = harness
        .users
        .find_user_by_name("ALICE")
        .await
        .expect("by name");
    assert_eq!(by_name.id, alice.id);
    let by_key = harness
        .users
        .find_user_by_api_key(alice.api_key.expose())
        .await
        .expect("by key");
    assert_eq!(by_key.id, alice.id);

    let err = harness
        .users
        .find_user_by_api_key("nope")
        .await
        .expect_err("unknown key");
    assert!(err.is(ErrorCode::NotFound));
    let err = harness
        .users
        .find_user_by_id(UserId::new(99))
        .await
        .expect_err("unknown id");
    assert_eq!(err.message(), "could not find user with id 99");
}

#[rstest]
#[tokio::test]
async fn find_users_orders_by_id(harness: Harness) {
    for name in ["carol", "alice", "bob"] {
        harness.user(name).await;
    }
    let names: Vec<String> = harness
        .users
        .find_users(UserFilter::default())
        .await
        .expect("users")
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, ["carol", "alice", "bob"]);
}
