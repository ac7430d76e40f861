//! Document store integration tests.

use nimbus_core::{CoreError, Filters, Key, LocalBackend};
use nimbus_storage::{EncryptedDriver, EncryptionKey, InMemoryDriver, PersistenceDriver};
use nimbus_testkit::prelude::*;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn malformed() -> Vec<(Key, Option<Key>)> {
    vec![
        (Key::new("", "1"), None),
        (Key::new("users", ""), None),
        (Key::new("users", "1"), Some(Key::new("", "1"))),
        (Key::new("users", "1"), Some(Key::new("users", ""))),
    ]
}

#[test]
fn malformed_keys_are_validation_errors() {
    with_backend(|backend| {
        let documents = backend.documents();
        for (key, sub_key) in malformed() {
            let sub_key = sub_key.as_ref();
            assert!(documents.get(&key, sub_key).unwrap_err().is_validation());
            assert!(documents
                .set(&key, sub_key, json!({"a": "b"}))
                .unwrap_err()
                .is_validation());
            assert!(documents.delete(&key, sub_key).unwrap_err().is_validation());
        }
    });
}

#[test]
fn unknown_collection_is_rejected_everywhere() {
    with_backend(|backend| {
        let documents = backend.documents();
        let key = Key::new("unknown", "1");
        assert!(documents.get(&key, None).unwrap_err().is_unknown_collection());
        assert!(documents
            .set(&key, None, json!({}))
            .unwrap_err()
            .is_unknown_collection());
        assert!(documents.delete(&key, None).unwrap_err().is_unknown_collection());
    });
}

#[test]
fn null_content_is_rejected() {
    with_backend(|backend| {
        let err = backend
            .documents()
            .set(&data::user_key(1), None, serde_json::Value::Null)
            .unwrap_err();
        assert!(err.is_validation());
    });
}

#[test]
fn set_overwrites() {
    with_backend(|backend| {
        let documents = backend.documents();
        let users = data::users();
        let key = data::user_key(1);

        documents.set(&key, None, users[0].1.clone()).unwrap();
        documents.set(&key, None, users[1].1.clone()).unwrap();

        let doc = documents.get(&key, None).unwrap();
        assert_eq!(doc.field("email"), Some(&json!("j.smithers@yahoo.com")));
    });
}

#[test]
fn sub_collection_get() {
    with_seeded_backend(|backend| {
        let customer = &data::customers()[0];
        let (order_key, order) = &customer.orders[0];

        let doc = backend
            .documents()
            .get(&customer.key, Some(order_key))
            .unwrap();
        assert_eq!(serde_json::Value::Object(doc.content), *order);
        assert_eq!(doc.parent.as_ref(), Some(&customer.key));
    });
}

#[test]
fn delete_then_get_is_not_found() {
    with_seeded_backend(|backend| {
        let documents = backend.documents();
        let key = data::user_key(2);

        documents.delete(&key, None).unwrap();
        assert!(matches!(
            documents.get(&key, None),
            Err(CoreError::NotFound { .. })
        ));
        documents.delete(&key, None).unwrap();
    });
}

#[test]
fn sub_collection_delete() {
    with_seeded_backend(|backend| {
        let documents = backend.documents();
        let customer = &data::customers()[0];
        let order_key = &customer.orders[1].0;

        documents.delete(&customer.key, Some(order_key)).unwrap();
        assert!(documents
            .get(&customer.key, Some(order_key))
            .unwrap_err()
            .is_not_found());

        let left = documents
            .query(&customer.key, data::ORDERS, Filters::all(), 0, None)
            .unwrap();
        assert_eq!(left.documents.len(), 2);
    });
}

#[test]
fn parent_delete_cascades() {
    with_seeded_backend(|backend| {
        let documents = backend.documents();
        let customers = data::customers();
        let doomed = &customers[0];

        documents.delete(&doomed.key, None).unwrap();

        for (order_key, _) in &doomed.orders {
            assert!(documents
                .get(&doomed.key, Some(order_key))
                .unwrap_err()
                .is_not_found());
        }
        let remaining = documents
            .query(&Key::collection(data::CUSTOMERS), data::ORDERS, Filters::all(), 0, None)
            .unwrap();
        let ids: Vec<&str> = remaining.documents.iter().map(|d| d.key.id.as_str()).collect();
        assert_eq!(ids, vec!["504", "505"]);
    });
}

#[test]
fn parent_delete_cascades_on_disk() {
    let test = TestBackend::seeded_file();
    let key = data::parent_items_key();
    test.documents().delete(&key, None).unwrap();

    let test = test.reopen();
    let left = test
        .documents()
        .query(&key, data::ITEMS, Filters::all(), 0, None)
        .unwrap();
    assert!(left.documents.is_empty());
    assert_eq!(
        test.driver().list("/nitric/index/parentItems/").unwrap(),
        Vec::<String>::new()
    );
}

#[test]
fn ids_with_separators_stay_top_level() {
    with_backend(|backend| {
        let documents = backend.documents();
        let sneaky = Key::new(data::CUSTOMERS, "1000/orders/501");
        documents.set(&sneaky, None, json!({"sneaky": true})).unwrap();

        let children = documents
            .query(&Key::new(data::CUSTOMERS, "1000"), data::ORDERS, Filters::all(), 0, None)
            .unwrap();
        assert!(children.documents.is_empty());
        assert_eq!(documents.get(&sneaky, None).unwrap().key, sneaky);
    });
}

#[test]
fn documents_are_encrypted_at_rest() {
    let key = EncryptionKey::derive_from_passphrase(b"local dev secret", b"nimbus").unwrap();
    let driver = Arc::new(EncryptedDriver::new(InMemoryDriver::new(), key));
    let backend = LocalBackend::open(driver.clone(), data::config()).unwrap();

    let user = data::user_key(1);
    backend
        .documents()
        .set(&user, None, json!({"email": "jsmith@server.com"}))
        .unwrap();
    let doc = backend.documents().get(&user, None).unwrap();
    assert_eq!(doc.field("email"), Some(&json!("jsmith@server.com")));

    let raw = driver
        .inner()
        .get("/nitric/documents/users/jsmith@server.com")
        .unwrap()
        .unwrap();
    assert!(!raw.windows(6).any(|w| w == b"server"));
}

#[test]
fn ids_with_file_suffixes_coexist_on_disk() {
    let dir = tempdir().unwrap();
    let backend = LocalBackend::open_dir(dir.path(), data::config()).unwrap();
    let documents = backend.documents();
    let order = Key::new(data::ORDERS, "1");

    let plain = Key::new(data::CUSTOMERS, "x");
    let suffixed = Key::new(data::CUSTOMERS, "x.blob");
    let child_first = Key::new(data::CUSTOMERS, "y.blob");
    let parent_after = Key::new(data::CUSTOMERS, "y");

    documents.set(&plain, None, json!({"n": "x"})).unwrap();
    documents.set(&suffixed, Some(&order), json!({"n": "x.blob/1"})).unwrap();
    documents.set(&child_first, Some(&order), json!({"n": "y.blob/1"})).unwrap();
    documents.set(&parent_after, None, json!({"n": "y"})).unwrap();

    assert_eq!(documents.get(&plain, None).unwrap().field("n"), Some(&json!("x")));
    assert_eq!(
        documents.get(&suffixed, Some(&order)).unwrap().field("n"),
        Some(&json!("x.blob/1"))
    );

    documents.delete(&suffixed, None).unwrap();
    assert!(documents.get(&suffixed, Some(&order)).unwrap_err().is_not_found());
    assert!(documents.get(&plain, None).is_ok());
    assert!(documents.get(&child_first, Some(&order)).is_ok());
}

#[test]
fn cascade_leaves_no_empty_directories() {
    let dir = tempdir().unwrap();
    let backend = LocalBackend::open_dir(dir.path(), data::config()).unwrap();
    data::seed(&backend).unwrap();

    backend.documents().delete(&data::parent_items_key(), None).unwrap();

    let parent_items_dir = dir
        .path()
        .join("nitric.d/documents.d")
        .join(format!("{}.d", data::PARENT_ITEMS));
    assert!(!parent_items_dir.exists());
    assert!(dir.path().join("nitric.d/documents.d/items.d").is_dir());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn set_then_get_returns_content(key in key_strategy("users"), content in content_strategy()) {
        let test = TestBackend::memory();
        test.documents().set(&key, None, content.clone()).unwrap();
        let doc = test.documents().get(&key, None).unwrap();
        prop_assert_eq!(serde_json::Value::Object(doc.content), content);
        prop_assert_eq!(doc.key, key);
    }
}
