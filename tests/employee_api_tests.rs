mod common;

use axum::http::Method;
use chrono::{Duration, Utc};
use regex::Regex;
use serde_json::json;

use common::{response_json, TestApp};

fn employee_body(email: &str, cafe_id: &str) -> serde_json::Value {
    json!({
        "name": "Ada Lovelace",
        "email_address": email,
        "phone_number": "91234567",
        "gender": "Female",
        "cafe_id": cafe_id,
    })
}

#[tokio::test]
async fn create_employee_returns_generated_id_and_cafe_name() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Morning Grind", "New York").await;

    let response = app
        .request(
            Method::POST,
            "/employee",
            Some(employee_body("ada@example.com", &cafe_id)),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created = response_json(response).await;

    let id_shape = Regex::new(r"^UI[A-Z0-9]{7}$").expect("regex");
    assert!(id_shape.is_match(created["id"].as_str().expect("id")));
    assert_eq!(created["cafe_id"], cafe_id.as_str());
    assert_eq!(created["cafe"], "Morning Grind");
    assert_eq!(created["days_worked"], 0);
    assert_eq!(
        created["start_date"],
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );

    let cafe = response_json(
        app.request(Method::GET, &format!("/cafe/{cafe_id}"), None)
            .await,
    )
    .await;
    assert_eq!(cafe["employees_count"], 1);
}

#[tokio::test]
async fn days_worked_counts_whole_days_since_start() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Counter", "Chicago").await;
    let start = (Utc::now().date_naive() - Duration::days(10))
        .format("%Y-%m-%d")
        .to_string();

    let id = app
        .create_employee("Ten Days", "ten@example.com", &cafe_id, &start)
        .await;

    let fetched = response_json(
        app.request(Method::GET, &format!("/employee/{id}"), None)
            .await,
    )
    .await;
    assert_eq!(fetched["days_worked"], 10);
    assert_eq!(fetched["start_date"], start.as_str());
}

#[tokio::test]
async fn create_employee_validates_in_order() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Strict", "Miami").await;

    let mut body = employee_body("not-an-email", &cafe_id);
    body["phone_number"] = json!("123");
    let response = app.request(Method::POST, "/employee", Some(body)).await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["message"], "Invalid email format");

    let mut body = employee_body("ok@example.com", &cafe_id);
    body["phone_number"] = json!("71234567");
    let response = app.request(Method::POST, "/employee", Some(body)).await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Invalid phone number format"
    );

    let response = app
        .request(
            Method::POST,
            "/employee",
            Some(json!({ "name": "Half", "email_address": "half@example.com" })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Missing required fields"
    );

    let listed = response_json(app.request(Method::GET, "/employees", None).await).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn create_employee_for_unknown_cafe_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/employee",
            Some(employee_body(
                "lost@example.com",
                &uuid::Uuid::new_v4().to_string(),
            )),
        )
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(response_json(response).await["message"], "Cafe not found");

    let listed = response_json(app.request(Method::GET, "/employees", None).await).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Popular", "Chicago").await;

    let first = app
        .request(
            Method::POST,
            "/employee",
            Some(employee_body("dup@example.com", &cafe_id)),
        )
        .await;
    assert_eq!(first.status(), 201);

    let second = app
        .request(
            Method::POST,
            "/employee",
            Some(employee_body("dup@example.com", &cafe_id)),
        )
        .await;
    assert_eq!(second.status(), 400);
    assert_eq!(
        response_json(second).await["message"],
        "Email address already in use"
    );
}

#[tokio::test]
async fn list_employees_orders_by_start_date_and_filters_by_cafe_name() {
    let app = TestApp::new().await;
    let grind = app.create_cafe("Grind", "New York").await;
    let brew = app.create_cafe("Brew", "New York").await;

    let late = app
        .create_employee("Late", "late@example.com", &grind, "2024-06-01")
        .await;
    let early = app
        .create_employee("Early", "early@example.com", &grind, "2023-01-15")
        .await;
    let other = app
        .create_employee("Other", "other@example.com", &brew, "2022-05-05")
        .await;

    let all = response_json(app.request(Method::GET, "/employees", None).await).await;
    let ids: Vec<&str> = all
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec![other.as_str(), early.as_str(), late.as_str()]);

    let response = app.request(Method::GET, "/employees?cafe=Grind", None).await;
    assert_eq!(response.status(), 200);
    let grind_staff = response_json(response).await;
    let ids: Vec<&str> = grind_staff
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec![early.as_str(), late.as_str()]);
    assert!(grind_staff
        .as_array()
        .expect("array")
        .iter()
        .all(|e| e["cafe"] == "Grind"));
}

#[tokio::test]
async fn list_employees_for_unknown_cafe_is_404_with_empty_list() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/employees?cafe=Nowhere", None)
        .await;
    assert_eq!(response.status(), 404);
    let body = response_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn update_employee_keeps_prior_values_for_invalid_fields() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Home", "Miami").await;
    let id = app
        .create_employee("Before", "before@example.com", &cafe_id, "2024-01-01")
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/employee/{id}"),
            Some(json!({
                "name": "After",
                "phone_number": "123",
                "email_address": "broken",
                "cafe_id": uuid::Uuid::new_v4().to_string(),
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["name"], "After");
    assert_eq!(updated["phone_number"], "91234567");
    assert_eq!(updated["email_address"], "before@example.com");
    assert_eq!(updated["cafe_id"], cafe_id.as_str());
}

#[tokio::test]
async fn update_employee_moves_between_cafes() {
    let app = TestApp::new().await;
    let from = app.create_cafe("From", "Chicago").await;
    let to = app.create_cafe("To", "Chicago").await;
    let id = app
        .create_employee("Mover", "mover@example.com", &from, "2024-01-01")
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/employee/{id}"),
            Some(json!({ "cafe_id": to, "phone_number": "88887777" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["cafe_id"], to.as_str());
    assert_eq!(updated["cafe"], "To");
    assert_eq!(updated["phone_number"], "88887777");

    let from_cafe =
        response_json(app.request(Method::GET, &format!("/cafe/{from}"), None).await).await;
    assert_eq!(from_cafe["employees_count"], 0);
    let to_cafe =
        response_json(app.request(Method::GET, &format!("/cafe/{to}"), None).await).await;
    assert_eq!(to_cafe["employees_count"], 1);
}

#[tokio::test]
async fn update_to_taken_email_fails_without_partial_write() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Shared", "Chicago").await;
    app.create_employee("One", "one@example.com", &cafe_id, "2024-01-01")
        .await;
    let two = app
        .create_employee("Two", "two@example.com", &cafe_id, "2024-01-01")
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/employee/{two}"),
            Some(json!({ "name": "Renamed", "email_address": "one@example.com" })),
        )
        .await;
    assert_eq!(response.status(), 500);

    let fetched =
        response_json(app.request(Method::GET, &format!("/employee/{two}"), None).await).await;
    assert_eq!(fetched["name"], "Two");
    assert_eq!(fetched["email_address"], "two@example.com");
}

#[tokio::test]
async fn unknown_employee_is_not_found() {
    let app = TestApp::new().await;

    for method in [Method::GET, Method::DELETE] {
        let response = app.request(method, "/employee/UI0000000", None).await;
        assert_eq!(response.status(), 404);
        assert_eq!(response_json(response).await["message"], "Employee not found");
    }

    let response = app
        .request(
            Method::PUT,
            "/employee/UI0000000",
            Some(json!({ "name": "Nobody" })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn delete_employee_removes_row() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Short Stay", "Chicago").await;
    let id = app
        .create_employee("Leaver", "leaver@example.com", &cafe_id, "2024-01-01")
        .await;

    let response = app
        .request(Method::DELETE, &format!("/employee/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["message"], "Employee deleted");

    let response = app.request(Method::GET, &format!("/employee/{id}"), None).await;
    assert_eq!(response.status(), 404);

    let cafe =
        response_json(app.request(Method::GET, &format!("/cafe/{cafe_id}"), None).await).await;
    assert_eq!(cafe["employees_count"], 0);
}

#[tokio::test]
async fn overlong_fields_are_rejected_before_insert() {
    let app = TestApp::new().await;
    let cafe_id = app.create_cafe("Roomy", "Chicago").await;

    let mut body = employee_body("long@example.com", &cafe_id);
    body["gender"] = json!("Genderqueer person");
    let response = app.request(Method::POST, "/employee", Some(body)).await;
    assert_eq!(response.status(), 400);
    let message = response_json(response).await["message"]
        .as_str()
        .expect("message")
        .to_string();
    assert!(message.contains("Gender must be at most 10 characters"), "{message}");

    let mut body = employee_body("longer@example.com", &cafe_id);
    body["name"] = json!("n".repeat(101));
    let response = app.request(Method::POST, "/employee", Some(body)).await;
    assert_eq!(response.status(), 400);

    let listed = response_json(app.request(Method::GET, "/employees", None).await).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}
