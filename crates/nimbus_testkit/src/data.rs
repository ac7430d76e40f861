//! Seed data sets.
//!
//! Three shapes cover most document-store behavior:
//! - `users`: three flat top-level documents with numeric-string ages
//! - `customers`: two parents, each with an `orders` sub-collection
//! - `items`: twelve lettered documents, mirrored as the `items`
//!   sub-collection of `parentItems/1`, for pagination

use nimbus_core::{CoreResult, Key, LocalBackend, StoreConfig};
use serde_json::{json, Value};

/// Flat user documents.
pub const USERS: &str = "users";
/// Parent documents with orders.
pub const CUSTOMERS: &str = "customers";
/// Sub-collection of customers.
pub const ORDERS: &str = "orders";
/// Lettered documents.
pub const ITEMS: &str = "items";
/// Parent of the mirrored `items` sub-collection.
pub const PARENT_ITEMS: &str = "parentItems";

/// Configuration declaring every seeded collection.
pub fn config() -> StoreConfig {
    StoreConfig::new().collections([USERS, CUSTOMERS, ITEMS, PARENT_ITEMS])
}

/// Key of user 1, 2 or 3.
pub fn user_key(n: usize) -> Key {
    let id = match n {
        1 => "jsmith@server.com",
        2 => "j.smithers@yahoo.com",
        _ => "pdavis@server.com",
    };
    Key::new(USERS, id)
}

/// The user documents.
pub fn users() -> Vec<(Key, Value)> {
    vec![
        (
            user_key(1),
            json!({
                "firstName": "John",
                "lastName": "Smith",
                "email": "jsmith@server.com",
                "country": "US",
                "age": "30"
            }),
        ),
        (
            user_key(2),
            json!({
                "firstName": "Johnson",
                "lastName": "Smithers",
                "email": "j.smithers@yahoo.com",
                "country": "AU",
                "age": "40"
            }),
        ),
        (
            user_key(3),
            json!({
                "firstName": "Paul",
                "lastName": "Davis",
                "email": "pdavis@server.com",
                "country": "US",
                "age": "50"
            }),
        ),
    ]
}

/// A customer and its orders.
#[derive(Debug, Clone)]
pub struct Customer {
    /// Customer key.
    pub key: Key,
    /// Customer content.
    pub content: Value,
    /// `(order key, order content)` pairs in the `orders` sub-collection.
    pub orders: Vec<(Key, Value)>,
}

fn order(id: &str, number: &str, kind: &str, price: &str, n: usize) -> (Key, Value) {
    (
        Key::new(ORDERS, id),
        json!({
            "testName": format!("OrderItem{n}"),
            "sku": format!("ABC-{id}"),
            "type": kind,
            "number": number,
            "price": price
        }),
    )
}

/// Customers 1000 (orders 501-503) and 2000 (orders 504-505).
pub fn customers() -> Vec<Customer> {
    vec![
        Customer {
            key: Key::new(CUSTOMERS, "1000"),
            content: json!({
                "testName": "CustomerItem1",
                "firstName": "John",
                "lastName": "Smith",
                "email": "jsmith@server.com",
                "country": "AU",
                "age": "40"
            }),
            orders: vec![
                order("501", "1", "bike/mountain", "14.95", 1),
                order("502", "2", "bike/road", "19.95", 2),
                order("503", "3", "scooter/electric", "124.95", 3),
            ],
        },
        Customer {
            key: Key::new(CUSTOMERS, "2000"),
            content: json!({
                "testName": "CustomerItem2",
                "firstName": "David",
                "lastName": "Adams",
                "email": "dadams@server.com",
                "country": "US",
                "age": "20"
            }),
            orders: vec![
                order("504", "1", "bike/hybrid", "229.95", 4),
                order("505", "2", "scooter/manual", "9.95", 5),
            ],
        },
    ]
}

/// Items `01`..`12` with letters `A`..`L`.
pub fn items() -> Vec<(Key, Value)> {
    ('A'..='L')
        .enumerate()
        .map(|(i, letter)| {
            (
                Key::new(ITEMS, format!("{:02}", i + 1)),
                json!({ "letter": letter.to_string() }),
            )
        })
        .collect()
}

/// Parent of the mirrored `items` sub-collection.
pub fn parent_items_key() -> Key {
    Key::new(PARENT_ITEMS, "1")
}

/// Writes every data set into `backend`.
///
/// # Errors
///
/// Returns the first failed write.
pub fn seed(backend: &LocalBackend) -> CoreResult<()> {
    let documents = backend.documents();

    for (key, content) in users() {
        documents.set(&key, None, content)?;
    }

    for customer in customers() {
        documents.set(&customer.key, None, customer.content)?;
        for (order_key, content) in customer.orders {
            documents.set(&customer.key, Some(&order_key), content)?;
        }
    }

    let parent = parent_items_key();
    for (key, content) in items() {
        documents.set(&key, None, content.clone())?;
        documents.set(&parent, Some(&key), content)?;
    }

    Ok(())
}
