//! Diesel adapters against a live PostgreSQL database.
//!
//! Set `TODO_TEST_DATABASE_URL` to a disposable database to run these
//! tests; migrations are applied on first use. Without it every test prints
//! a skip marker and passes.

use std::sync::Arc;

use mockable::DefaultClock;
use todo_backend::domain::ports::{ItemListService, StoreStats, UserService};
use todo_backend::domain::{
    ErrorCode, ListFilter, NewItem, NewList, NewUser, SessionService, StoreContext,
    StoreItemListService, StoreUserService,
};
use todo_backend::outbound::persistence::{
    DbPool, DieselSessionStore, DieselStoreStats, DieselTodoStore, PoolConfig, run_migrations,
};

const DATABASE_URL_ENV: &str = "TODO_TEST_DATABASE_URL";

async fn pool() -> Option<DbPool> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-DATABASE: set {DATABASE_URL_ENV} to run");
        return None;
    };
    run_migrations(&url).await.expect("migrations apply");
    Some(
        DbPool::new(PoolConfig::new(url).with_max_size(2))
            .await
            .expect("pool builds"),
    )
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

fn services(pool: &DbPool) -> (StoreUserService, StoreItemListService) {
    let context = StoreContext::new(
        Arc::new(DieselTodoStore::new(pool.clone())),
        Arc::new(DefaultClock),
    );
    (
        StoreUserService::new(context.clone()),
        StoreItemListService::new(context),
    )
}

#[tokio::test]
async fn registration_persists_the_user_and_their_first_list() {
    let Some(pool) = pool().await else { return };
    let (users, lists) = services(&pool);
    let name = unique("Alice");

    let alice = users
        .register_user(NewUser::new(name.clone()))
        .await
        .expect("register");
    let found = users
        .find_user_by_name(&name.to_uppercase())
        .await
        .expect("case-insensitive lookup");
    assert_eq!(found.id, alice.id);
    let by_key = users
        .find_user_by_api_key(alice.api_key.expose())
        .await
        .expect("lookup by key");
    assert_eq!(by_key.id, alice.id);

    let owned = lists
        .find_lists(Some(&alice), ListFilter::by_owner(alice.id))
        .await
        .expect("own lists");
    assert_eq!(owned.len(), 1);

    let duplicate = users
        .create_user(NewUser::new(name.to_lowercase()))
        .await
        .expect_err("duplicate name");
    assert_eq!(duplicate.kind(), ErrorCode::Conflict);

    users.delete_user(alice.id).await.expect("delete");
}

#[tokio::test]
async fn items_are_owned_and_cascade_with_their_list() {
    let Some(pool) = pool().await else { return };
    let (users, lists) = services(&pool);
    let alice = users
        .create_user(NewUser::new(unique("alice")))
        .await
        .expect("alice");
    let bob = users
        .create_user(NewUser::new(unique("bob")))
        .await
        .expect("bob");

    let list = lists
        .create_list(Some(&alice), NewList::new("Groceries"))
        .await
        .expect("list");
    let item = lists
        .create_item(Some(&alice), list.id, NewItem::new("Milk"))
        .await
        .expect("item");
    assert_eq!(item.user_id, alice.id);

    let foreign = lists
        .find_item_by_id(Some(&bob), item.id)
        .await
        .expect_err("foreign item");
    assert_eq!(foreign.kind(), ErrorCode::Unauthorized);

    lists
        .delete_list(Some(&alice), list.id)
        .await
        .expect("delete list");
    let gone = lists
        .find_item_by_id(Some(&alice), item.id)
        .await
        .expect_err("item deleted with list");
    assert_eq!(gone.kind(), ErrorCode::NotFound);

    users.delete_user(alice.id).await.expect("delete alice");
    users.delete_user(bob.id).await.expect("delete bob");
}

#[tokio::test]
async fn sessions_survive_a_round_trip_and_statistics_count_them() {
    let Some(pool) = pool().await else { return };
    let (users, _lists) = services(&pool);
    let sessions = SessionService::new(
        Arc::new(DieselSessionStore::new(pool.clone())),
        Arc::new(DefaultClock),
    );
    let alice = users
        .create_user(NewUser::new(unique("alice")))
        .await
        .expect("alice");

    let token = sessions.create(&alice).await.expect("session");
    let loaded = sessions.load(&token).await.expect("load");
    assert_eq!(loaded.map(|user| user.id), Some(alice.id));

    let counts = DieselStoreStats::new(pool.clone())
        .counts()
        .await
        .expect("counts");
    assert!(counts.users >= 1);
    assert!(counts.sessions >= 1);

    sessions.destroy(&token).await.expect("destroy");
    assert!(sessions.load(&token).await.expect("load").is_none());
    users.delete_user(alice.id).await.expect("delete");
}
