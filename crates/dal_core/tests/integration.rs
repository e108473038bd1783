use dal_core::{
    Order, OrderRepository, RepoError, SqliteUserRepository, Store, StoreConfig, User,
    UserRepository,
};
use rust_decimal::Decimal;
use std::sync::{mpsc, Barrier};
use std::thread;
use std::time::Duration;

fn memory_store() -> Store {
    Store::open(StoreConfig::in_memory()).unwrap()
}

#[test]
fn user_add_persists_user() {
    let store = memory_store();
    let session = store.session().unwrap();
    let users = session.users();

    users
        .add(&User::with_id(10, "Integration", "Test", "integration@test.com"))
        .unwrap();

    let result = users.get_by_id(10).unwrap().unwrap();
    assert_eq!(result.first_name, "Integration");
}

#[test]
fn order_get_by_user_id_returns_user_orders() {
    let store = memory_store();
    let session = store.session().unwrap();

    session
        .users()
        .add(&User::with_id(100, "Test", "User", "test@user.com"))
        .unwrap();
    let orders = session.orders();
    orders
        .add(&Order::with_id(100, 100, "Test Product", 1, Decimal::new(1000, 2)))
        .unwrap();
    orders
        .add(&Order::with_id(101, 100, "Another Product", 2, Decimal::new(2000, 2)))
        .unwrap();

    let result = orders.get_by_user_id(100, true).unwrap();
    assert_eq!(result.len(), 2);
    assert!(result
        .iter()
        .all(|order| order.user.as_ref().and_then(|u| u.id) == Some(100)));
}

#[test]
fn order_delete_removes_order() {
    let store = memory_store();
    let session = store.session().unwrap();

    session
        .users()
        .add(&User::with_id(200, "Delete", "Test", "delete@test.com"))
        .unwrap();
    let orders = session.orders();
    orders
        .add(&Order::with_id(200, 200, "To Delete", 1, Decimal::new(1500, 2)))
        .unwrap();

    orders.delete(200).unwrap();

    assert!(orders.get_by_id(200, true).unwrap().is_none());
}

#[test]
fn deleting_user_cascades_to_orders() {
    let store = memory_store();
    let session = store.session().unwrap();
    let users = session.users();
    let orders = session.orders();

    assert_eq!(orders.get_by_user_id(1, false).unwrap().len(), 2);
    assert!(users.delete(1).unwrap());

    assert!(orders.get_by_user_id(1, false).unwrap().is_empty());
    assert!(!orders.exists(1).unwrap());
    assert!(!orders.exists(2).unwrap());
    assert!(orders.exists(3).unwrap());
}

#[test]
fn delete_then_get_is_empty_for_any_id() {
    let store = memory_store();
    let session = store.session().unwrap();
    let users = session.users();
    let orders = session.orders();

    for id in [1, 2, 3, 50, -4] {
        orders.delete(id).unwrap();
        assert!(orders.get_by_id(id, false).unwrap().is_none());
    }
    for id in [2, 1, 77] {
        users.delete(id).unwrap();
        assert!(users.get_by_id(id).unwrap().is_none());
    }
}

#[test]
fn sessions_of_one_memory_store_share_data() {
    let store = memory_store();

    {
        let writer = store.session().unwrap();
        writer
            .users()
            .add(&User::with_id(30, "Shared", "Session", "shared@example.com"))
            .unwrap();
    }

    let reader = store.session().unwrap();
    assert!(reader.users().exists(30).unwrap());
}

#[test]
fn separate_memory_stores_are_isolated() {
    let first = memory_store();
    let second = memory_store();

    first
        .session()
        .unwrap()
        .users()
        .add(&User::with_id(31, "Only", "First", "first@example.com"))
        .unwrap();

    assert!(!second.session().unwrap().users().exists(31).unwrap());
}

#[test]
fn unit_of_work_commits_on_ok() {
    let store = memory_store();
    let mut session = store.session().unwrap();

    let order_id = session
        .unit_of_work(|tx| -> Result<_, RepoError> {
            let users = SqliteUserRepository::try_new(tx)?;
            let orders = dal_core::SqliteOrderRepository::try_new(tx)?;
            let user_id = users.add(&User::new("Unit", "Work", "uow@example.com"))?;
            orders.add(&Order::new(user_id, "Bundle", 1, Decimal::new(500, 2)))
        })
        .unwrap();

    let order = session.orders().get_by_id(order_id, true).unwrap().unwrap();
    assert_eq!(order.user.unwrap().first_name, "Unit");
}

#[test]
fn unit_of_work_rolls_back_on_error() {
    let store = memory_store();
    let mut session = store.session().unwrap();

    let err = session
        .unit_of_work(|tx| -> Result<(), RepoError> {
            let users = SqliteUserRepository::try_new(tx)?;
            let orders = dal_core::SqliteOrderRepository::try_new(tx)?;
            users.add(&User::with_id(40, "Roll", "Back", "rollback@example.com"))?;
            assert!(orders.delete(1)?);
            orders.add(&Order::with_id(41, 404, "Orphan", 1, Decimal::ONE))?;
            Ok(())
        })
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(!session.users().exists(40).unwrap());
    assert!(session.orders().exists(1).unwrap());
}

#[test]
fn file_store_from_connection_string_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let connection_string = format!("Data Source={};Busy Timeout=1", path.display());

    {
        let store = Store::from_connection_string(&connection_string).unwrap();
        store
            .with_session(|session| {
                session
                    .users()
                    .add(&User::with_id(60, "Disk", "Backed", "disk@example.com"))
                    .map(|_| ())
            })
            .unwrap();
    }

    let store = Store::from_connection_string(&connection_string).unwrap();
    let users = store
        .with_session(|session| session.users().get_all())
        .unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().any(|user| user.email == "disk@example.com"));
}

/// Writer A holds an open transaction while writer B, on its own session,
/// inserts; B must wait for A instead of failing.
fn overlapping_writers_both_commit(store: &Store) {
    let barrier = &Barrier::new(2);
    let (held_tx, held_rx) = mpsc::channel();

    thread::scope(|scope| {
        let holder = scope.spawn(move || {
            let mut session = store.session().unwrap();
            barrier.wait();
            session.unit_of_work(|tx| -> Result<(), RepoError> {
                let users = SqliteUserRepository::try_new(tx)?;
                users.add(&User::with_id(70, "Held", "Writer", "held@example.com"))?;
                held_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(300));
                Ok(())
            })
        });

        let waiter = scope.spawn(move || {
            let session = store.session().unwrap();
            barrier.wait();
            held_rx.recv().unwrap();
            session
                .users()
                .add(&User::with_id(71, "Waiting", "Writer", "waiting@example.com"))
        });

        holder.join().unwrap().unwrap();
        assert_eq!(waiter.join().unwrap().unwrap(), 71);
    });

    let session = store.session().unwrap();
    assert!(session.users().exists(70).unwrap());
    assert!(session.users().exists(71).unwrap());
}

#[test]
fn concurrent_sessions_on_memory_store_wait_for_each_other() {
    overlapping_writers_both_commit(&memory_store());
}

#[test]
fn concurrent_sessions_on_file_store_wait_for_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(StoreConfig::file(dir.path().join("concurrent.db"))).unwrap();
    overlapping_writers_both_commit(&store);
}

#[cfg(unix)]
#[test]
fn file_store_keeps_non_utf8_path_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"orders-\xff.db"));

    let store = Store::open(StoreConfig::file(&path)).unwrap();
    assert!(store.session().unwrap().users().exists(1).unwrap());
    assert!(path.exists());
}

#[cfg(unix)]
#[test]
fn file_store_treats_file_prefix_as_plain_name() {
    let name = format!("file:dal-plain-{}.db", std::process::id());
    let literal = std::path::PathBuf::from(&name);
    let uri_target = std::path::PathBuf::from(name.trim_start_matches("file:"));

    let store = Store::open(StoreConfig::file(&literal)).unwrap();
    let seeded = store.session().unwrap().users().get_all().unwrap().len();
    drop(store);

    let literal_exists = literal.exists();
    let uri_target_exists = uri_target.exists();
    let _ = std::fs::remove_file(&literal);
    let _ = std::fs::remove_file(&uri_target);

    assert_eq!(seeded, 2);
    assert!(literal_exists);
    assert!(!uri_target_exists);
}
