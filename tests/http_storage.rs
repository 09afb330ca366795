//! HTTP tests against PostgreSQL.
//!
//! These tests require a reachable database in `DATABASE_URL`; tables are created if missing.
//!
//! Run with: DATABASE_URL=postgres://localhost/ecommerce_test cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{db_app, send, unique};
use serde_json::{json, Value};

async fn create_customer(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/customers",
        Some(json!({"name": "Ann Lee", "email": "ann@example.com", "phone": "123-456-7890"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "New Customer successfully added!");
    body["customer_id"].as_i64().expect("customer_id")
}

async fn create_product(app: &Router, name: &str, price: f64) -> i64 {
    let (status, body) = send(app, "POST", "/products", Some(json!({"name": name, "price": price}))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["product_id"].as_i64().expect("product_id")
}

async fn create_order(app: &Router, customer_id: i64, products: Value) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/orders",
        Some(json!({"customer_id": customer_id, "date": "2024-03-01", "product_id": products})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["order_id"].as_i64().expect("order_id")
}

/// An id guaranteed not to exist.
const MISSING_ID: i64 = i64::MAX;

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn customer_create_then_read_round_trips() {
    let app = db_app().await;
    let id = create_customer(&app).await;
    let (status, body) = send(&app, "GET", &format!("/customers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"customer_id": id, "name": "Ann Lee", "email": "ann@example.com", "phone": "123-456-7890"})
    );

    let (status, list) = send(&app, "GET", "/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().iter().any(|c| c["customer_id"] == id));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn customer_partial_update_keeps_omitted_fields() {
    let app = db_app().await;
    let id = create_customer(&app).await;
    let uri = format!("/customers/{}", id);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"name": "Ann Park"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customer details updated successfully");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"email": "broken"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("email").is_some());

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["name"], "Ann Park");
    assert_eq!(body["email"], "ann@example.com");
    assert_eq!(body["phone"], "123-456-7890");
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn customer_delete_cascades_to_account_orders_and_links() {
    let app = db_app().await;
    let customer = create_customer(&app).await;
    let product = create_product(&app, "Tea", 4.5).await;
    let first = create_order(&app, customer, json!([product])).await;
    let second = create_order(&app, customer, json!([])).await;
    let (status, body) = send(
        &app,
        "POST",
        "/customeraccounts",
        Some(json!({"username": unique("ann"), "password": "secret1", "customer_id": customer})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let account = body["account_id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/customers/{}", customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customer and all associated data removed successfully!");

    for order in [first, second] {
        let (status, _) = send(&app, "GET", &format!("/orders/{}", order), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = send(&app, "GET", &format!("/customeraccounts/{}", account), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/customers/{}", customer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No link left behind, so the product is deletable again.
    let (status, _) = send(&app, "DELETE", &format!("/products/{}", product), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn order_create_skips_unknown_products_but_update_fails() {
    let app = db_app().await;
    let customer = create_customer(&app).await;
    let product = create_product(&app, "Coffee", 9.0).await;
    let order = create_order(&app, customer, json!([product, MISSING_ID])).await;
    let uri = format!("/orders/{}", order);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"], json!([product]));
    assert_eq!(body["date"], "2024-03-01");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"date": "2024-04-01", "products": [MISSING_ID]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Product with ID {} not found", MISSING_ID));

    // Rolled back: date and links unchanged.
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["date"], "2024-03-01");
    assert_eq!(body["products"], json!([product]));

    let (status, _) = send(&app, "PUT", &uri, Some(json!({"products": []}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app, "GET", "/orders", None).await;
    let listed = list
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["order_id"] == order)
        .expect("order listed");
    assert_eq!(listed["products"], json!([]));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn order_delete_removes_links_then_order() {
    let app = db_app().await;
    let customer = create_customer(&app).await;
    let product = create_product(&app, "Jam", 3.25).await;
    let order = create_order(&app, customer, json!([product])).await;

    let (status, _) = send(&app, "DELETE", &format!("/products/{}", product), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "DELETE", &format!("/orders/{}", order), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully!");

    let (status, _) = send(&app, "DELETE", &format!("/orders/{}", order), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/products/{}", product), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn duplicate_username_conflicts() {
    let app = db_app().await;
    let username = unique("dup");
    let first = create_customer(&app).await;
    let second = create_customer(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/customeraccounts",
        Some(json!({"username": username, "password": "abc123", "customer_id": first})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/customeraccounts",
        Some(json!({"username": username, "password": "abc123", "customer_id": second})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn missing_rows_are_404() {
    let app = db_app().await;
    for uri in ["/customers", "/customeraccounts", "/products", "/orders"] {
        let (status, body) = send(&app, "DELETE", &format!("{}/{}", uri, MISSING_ID), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["message"].is_string());
    }
    let (status, body) = send(&app, "DELETE", &format!("/products/{}", MISSING_ID), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Product with ID {} doesn't exist!", MISSING_ID));

    let (status, _) = send(&app, "PUT", &format!("/products/{}", MISSING_ID), Some(json!({"price": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn account_update_round_trips() {
    let app = db_app().await;
    let customer = create_customer(&app).await;
    let (status, body) = send(
        &app,
        "POST",
        "/customeraccounts",
        Some(json!({"username": unique("acct"), "password": "abc123", "customer_id": customer})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let uri = format!("/customeraccounts/{}", body["account_id"].as_i64().unwrap());

    let username = unique("renamed");
    let (status, body) = send(&app, "PUT", &uri, Some(json!({"username": username, "password": "xyz789"}))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Customer Account details updated successfully");

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["password"], "xyz789");
    assert_eq!(body["customer_id"], customer);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn product_update_round_trips() {
    let app = db_app().await;
    let product = create_product(&app, "Honey", 6.0).await;
    let uri = format!("/products/{}", product);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"price": "7.25"}))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], format!("Product with ID {} updated successfully", product));

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"product_id": product, "name": "Honey", "price": 7.25}));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn order_update_round_trips_and_missing_is_404() {
    let app = db_app().await;
    let customer = create_customer(&app).await;
    let first = create_product(&app, "Bread", 2.0).await;
    let second = create_product(&app, "Butter", 3.0).await;
    let order = create_order(&app, customer, json!([first])).await;
    let uri = format!("/orders/{}", order);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"date": "2024-05-06", "products": [second, first, second]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Order was successfully updated!");

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["date"], "2024-05-06");
    assert_eq!(body["customer_id"], customer);
    let mut products: Vec<i64> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_i64)
        .collect();
    products.sort_unstable();
    let mut expected = vec![first, second];
    expected.sort_unstable();
    assert_eq!(products, expected);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/orders/{}", MISSING_ID),
        Some(json!({"date": "2024-05-06"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order Not Found");
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn ready_reports_database() {
    let app = db_app().await;
    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": "ok"}));
}
