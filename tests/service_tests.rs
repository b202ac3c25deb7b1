mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

use cafe_api::{
    entities::{cafe, employee},
    errors::ServiceError,
    identifiers::{generate_employee_id, IdGenerator},
    services::{
        CafeService, CreateCafeInput, CreateEmployeeInput, EmployeeService, UpdateCafeInput,
        UpdateEmployeeInput,
    },
};
use common::TestApp;

fn cafe_input(name: &str, location: &str) -> CreateCafeInput {
    CreateCafeInput {
        name: name.to_string(),
        description: format!("{name} description"),
        location: location.to_string(),
        logo: None,
    }
}

fn employee_input(email: &str, cafe_id: &str) -> CreateEmployeeInput {
    CreateEmployeeInput {
        name: "Grace Hopper".to_string(),
        email_address: email.to_string(),
        phone_number: "81234567".to_string(),
        gender: "Female".to_string(),
        cafe_id: cafe_id.to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    }
}

/// Yields `fixed` for the first `repeats` calls, then fresh ids.
fn sticky_generator(fixed: &'static str, repeats: usize, fresh: fn() -> String) -> IdGenerator {
    let calls = Arc::new(AtomicUsize::new(0));
    Arc::new(move || {
        if calls.fetch_add(1, Ordering::SeqCst) < repeats {
            fixed.to_string()
        } else {
            fresh()
        }
    })
}

#[tokio::test]
async fn employee_id_collision_is_retried_with_a_fresh_id() {
    let app = TestApp::new().await;
    let db = app.state.db.clone();
    let cafes = CafeService::new(db.clone(), app.settings());
    let cafe = cafes.create(cafe_input("Retry", "Chicago")).await.unwrap();

    // First create takes UIAAAAAAA, the second collides once then moves on.
    let employees = EmployeeService::new(db.clone(), app.settings())
        .with_id_generator(sticky_generator("UIAAAAAAA", 2, generate_employee_id));

    let first = employees
        .create(employee_input("first@example.com", &cafe.id))
        .await
        .unwrap();
    assert_eq!(first.id, "UIAAAAAAA");

    let second = employees
        .create(employee_input("second@example.com", &cafe.id))
        .await
        .unwrap();
    assert_ne!(second.id, "UIAAAAAAA");
    assert_eq!(employee::Entity::find().count(&*db).await.unwrap(), 2);
}

#[tokio::test]
async fn exhausted_id_attempts_surface_a_storage_error() {
    let app = TestApp::with_config(|cfg| cfg.id_generation_attempts = 3).await;
    let db = app.state.db.clone();
    let cafes = CafeService::new(db.clone(), app.settings());
    let cafe = cafes.create(cafe_input("Stuck", "Miami")).await.unwrap();

    let employees = EmployeeService::new(db.clone(), app.settings())
        .with_id_generator(Arc::new(|| "UIBBBBBBB".to_string()));

    employees
        .create(employee_input("one@example.com", &cafe.id))
        .await
        .unwrap();
    let err = employees
        .create(employee_input("two@example.com", &cafe.id))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DatabaseError(_));
    assert_eq!(employee::Entity::find().count(&*db).await.unwrap(), 1);
}

#[tokio::test]
async fn cafe_id_collision_is_retried() {
    let app = TestApp::new().await;
    let fixed = "0b5f4c1e-2d3a-4b6c-8d9e-0f1a2b3c4d5e";
    let cafes = CafeService::new(app.state.db.clone(), app.settings()).with_id_generator(
        sticky_generator(fixed, 2, cafe_api::identifiers::generate_cafe_id),
    );

    let first = cafes.create(cafe_input("First", "Chicago")).await.unwrap();
    let second = cafes.create(cafe_input("Second", "Chicago")).await.unwrap();
    assert_eq!(first.id, fixed);
    assert_ne!(second.id, fixed);
}

#[tokio::test]
async fn duplicate_email_is_a_validation_error() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let cafe = services
        .cafes
        .create(cafe_input("Unique", "Chicago"))
        .await
        .unwrap();

    services
        .employees
        .create(employee_input("same@example.com", &cafe.id))
        .await
        .unwrap();
    let err = services
        .employees
        .create(employee_input("same@example.com", &cafe.id))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg == "Email address already in use");
}

#[tokio::test]
async fn employee_for_missing_cafe_is_not_persisted() {
    let app = TestApp::new().await;
    let err = app
        .state
        .services
        .employees
        .create(employee_input(
            "orphan@example.com",
            "6f1c0c8e-5a4b-4e0f-9d7e-2b3c4d5e6f70",
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(
        employee::Entity::find()
            .count(app.state.db.as_ref())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn cafe_delete_reports_removed_employees() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let cafe = services
        .cafes
        .create(cafe_input("Gone", "Chicago"))
        .await
        .unwrap();
    for email in ["g1@example.com", "g2@example.com", "g3@example.com"] {
        services
            .employees
            .create(employee_input(email, &cafe.id))
            .await
            .unwrap();
    }

    let removed = services.cafes.delete(&cafe.id).await.unwrap();
    assert_eq!(removed, 3);
    assert_eq!(
        cafe::Entity::find()
            .count(app.state.db.as_ref())
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        employee::Entity::find()
            .count(app.state.db.as_ref())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn equal_counts_fall_back_to_creation_order() {
    let app = TestApp::new().await;
    let cafes = &app.state.services.cafes;
    let a = cafes.create(cafe_input("A", "Chicago")).await.unwrap();
    let b = cafes.create(cafe_input("B", "Chicago")).await.unwrap();
    let c = cafes.create(cafe_input("C", "Chicago")).await.unwrap();

    let listed: Vec<String> = cafes
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|cafe| cafe.id)
        .collect();
    assert_eq!(listed, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn cafe_update_and_logo_clear() {
    let app = TestApp::new().await;
    let cafes = &app.state.services.cafes;
    let mut input = cafe_input("Logo", "Chicago");
    input.logo = Some(vec![1, 2, 3]);
    let cafe = cafes.create(input).await.unwrap();
    assert_eq!(cafes.logo(&cafe.id).await.unwrap(), vec![1, 2, 3]);

    let updated = cafes
        .update(
            &cafe.id,
            UpdateCafeInput {
                description: Some("Fresh paint".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Fresh paint");
    assert_eq!(updated.name, "Logo");
    assert!(updated.logo.is_some());

    let cleared = cafes.set_logo(&cafe.id, Vec::new()).await.unwrap();
    assert_eq!(cleared.logo, None);
    assert_matches!(cafes.logo(&cafe.id).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn cafe_create_rejects_overlong_name() {
    let app = TestApp::new().await;
    let err = app
        .state
        .services
        .cafes
        .create(cafe_input(&"x".repeat(101), "Chicago"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn employee_update_with_bad_phone_keeps_old_number() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let cafe = services
        .cafes
        .create(cafe_input("Phones", "Chicago"))
        .await
        .unwrap();
    let employee = services
        .employees
        .create(employee_input("phone@example.com", &cafe.id))
        .await
        .unwrap();

    let updated = services
        .employees
        .update(
            &employee.id,
            UpdateEmployeeInput {
                phone_number: Some("123".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone_number, "81234567");
}

#[tokio::test]
async fn employees_list_is_none_for_unknown_cafe_name() {
    let app = TestApp::new().await;
    let listing = app
        .state
        .services
        .employees
        .list(Some("Nobody's Cafe"))
        .await
        .unwrap();
    assert!(listing.is_none());

    let listing = app.state.services.employees.list(None).await.unwrap();
    assert_eq!(listing.map(|e| e.len()), Some(0));
}

#[tokio::test]
async fn failed_cafe_delete_keeps_cafe_and_employees() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let cafe = services
        .cafes
        .create(cafe_input("Sturdy", "Chicago"))
        .await
        .unwrap();
    for email in ["s1@example.com", "s2@example.com"] {
        services
            .employees
            .create(employee_input(email, &cafe.id))
            .await
            .unwrap();
    }

    // Employees go first, so this fails after they are already gone inside the transaction.
    app.state
        .db
        .execute_unprepared(
            "CREATE TRIGGER block_cafe_delete BEFORE DELETE ON cafes \
             BEGIN SELECT RAISE(ABORT, 'cafe deletes blocked'); END;",
        )
        .await
        .unwrap();

    let err = services.cafes.delete(&cafe.id).await.unwrap_err();
    assert_matches!(err, ServiceError::DatabaseError(_));

    let still_there = services.cafes.get(&cafe.id).await.unwrap();
    assert_eq!(still_there.employees_count, 2);
    assert_eq!(
        employee::Entity::find()
            .count(app.state.db.as_ref())
            .await
            .unwrap(),
        2
    );
}
