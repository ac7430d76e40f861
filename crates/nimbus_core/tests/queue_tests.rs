//! Queue store integration tests.

use nimbus_core::{LocalBackend, ReceiveOptions, StoreConfig, Task};
use nimbus_storage::InMemoryDriver;
use nimbus_testkit::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const QUEUE_PATH: &str = "/nitric/queues/test";

fn test_task() -> Task {
    let Value::Object(payload) = json!({"Test": "Test"}) else {
        unreachable!()
    };
    Task::new("1234", "test-payload").with_payload(payload)
}

fn over(driver: &Arc<InMemoryDriver>) -> LocalBackend {
    LocalBackend::open(driver.clone(), StoreConfig::default()).unwrap()
}

fn batch(n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| Task::new(format!("{i:02}"), "test").with_payload(Map::new()))
        .collect()
}

#[test]
fn send_then_receive_single_task() {
    let driver = Arc::new(InMemoryDriver::new());
    let backend = over(&driver);

    let response = backend.queues().send_batch("test", vec![test_task()]).unwrap();
    assert!(response.failed_tasks.is_empty());
    assert_eq!(
        driver.stored_items()[QUEUE_PATH],
        br#"[{"ID":"1234","PayloadType":"test-payload","Payload":{"Test":"Test"}}]"#.to_vec()
    );

    let received = backend
        .queues()
        .receive(ReceiveOptions::new("test").depth(10))
        .unwrap();
    assert_eq!(received, vec![test_task()]);
    assert_eq!(driver.stored_items()[QUEUE_PATH], b"[]".to_vec());
}

#[test]
fn fifteen_items_drain_in_two_receives() {
    let driver = Arc::new(InMemoryDriver::new());
    let backend = over(&driver);
    backend.queues().send_batch("test", batch(15)).unwrap();

    let stored_len = || -> usize {
        let bytes = driver.stored_items().remove(QUEUE_PATH).unwrap();
        serde_json::from_slice::<Vec<Value>>(&bytes).unwrap().len()
    };

    let first = backend
        .queues()
        .receive(ReceiveOptions::new("test").depth(10))
        .unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(stored_len(), 5);

    let second = backend
        .queues()
        .receive(ReceiveOptions::new("test").depth(10))
        .unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(stored_len(), 0);

    let order: Vec<String> = first.into_iter().chain(second).map(|t| t.id).collect();
    let expected: Vec<String> = batch(15).into_iter().map(|t| t.id).collect();
    assert_eq!(order, expected);
}

#[test]
fn queues_are_independent() {
    with_backend(|backend| {
        let queues = backend.queues();
        queues.send_batch("a", batch(3)).unwrap();
        queues.send_batch("b", batch(1)).unwrap();

        assert_eq!(queues.receive(ReceiveOptions::new("a")).unwrap().len(), 3);
        assert_eq!(queues.receive(ReceiveOptions::new("b")).unwrap().len(), 1);
    });
}

#[test]
fn queue_names_with_slashes_do_not_nest() {
    with_backend(|backend| {
        let queues = backend.queues();
        queues.send_batch("a/b", batch(2)).unwrap();
        queues.send_batch("a", batch(1)).unwrap();

        assert_eq!(queues.receive(ReceiveOptions::new("a/b")).unwrap().len(), 2);
        assert_eq!(queues.receive(ReceiveOptions::new("a")).unwrap().len(), 1);
    });
}

#[test]
fn partial_batch_failure_commits_the_rest() {
    with_backend(|backend| {
        let queues = backend.queues();
        let mut tasks = batch(3);
        tasks[1].id.clear();

        let response = queues.send_batch("test", tasks).unwrap();
        assert_eq!(response.failed_tasks.len(), 1);
        assert!(response.failed_tasks[0].message.contains("blank"));

        let ids: Vec<String> = queues
            .receive(ReceiveOptions::new("test"))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["00", "02"]);
    });
}

#[test]
fn complete_is_a_no_op() {
    with_backend(|backend| {
        let queues = backend.queues();
        queues.send_batch("test", batch(2)).unwrap();
        let received = queues.receive(ReceiveOptions::new("test").depth(1)).unwrap();

        queues.complete("test", &received[0].id);
        assert_eq!(queues.receive(ReceiveOptions::new("test")).unwrap().len(), 1);
    });
}

#[test]
fn queue_survives_reopen() {
    let test = TestBackend::file();
    test.queues().send_batch("jobs", batch(4)).unwrap();
    test.queues()
        .receive(ReceiveOptions::new("jobs").depth(1))
        .unwrap();

    let test = test.reopen();
    let rest = test.queues().receive(ReceiveOptions::new("jobs")).unwrap();
    let ids: Vec<&str> = rest.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["01", "02", "03"]);
}
