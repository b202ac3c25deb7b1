//! Seed data script - populates the database with demo cafes and staff
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 10 cafes across five cities
//! - 10 employees spread over those cafes

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::info;

use cafe_api::{
    config, db,
    services::{
        CafeResponse, CafeService, CreateCafeInput, CreateEmployeeInput, EmployeeService,
        ServiceSettings,
    },
};

const CAFES: [(&str, &str, &str); 10] = [
    ("Morning Grind", "Third-wave espresso bar with house roasts", "New York"),
    ("Bean There", "Neighbourhood cafe with a quiet reading corner", "New York"),
    ("Fog City Brew", "Pour-overs and sourdough by the bay", "San Francisco"),
    ("Mission Roasters", "Small-batch roastery and tasting room", "San Francisco"),
    ("Sunset Sips", "Cold brew and smoothies near the beach", "Los Angeles"),
    ("Silver Lake Coffee", "Laptop friendly cafe with long hours", "Los Angeles"),
    ("Windy City Java", "Classic diner coffee and pastries", "Chicago"),
    ("Loop Latte", "Commuter cafe next to the L station", "Chicago"),
    ("Cafecito Corner", "Cuban coffee and croquetas", "Miami"),
    ("Ocean Drive Espresso", "Espresso and gelato on the boardwalk", "Miami"),
];

/// (name, email, phone, gender, cafe index, days since start)
const EMPLOYEES: [(&str, &str, &str, &str, usize, i64); 10] = [
    ("Alice Tan", "alice.tan@example.com", "91234567", "Female", 0, 720),
    ("Ben Lim", "ben.lim@example.com", "81234567", "Male", 0, 400),
    ("Chloe Ng", "chloe.ng@example.com", "92345678", "Female", 0, 90),
    ("Daniel Koh", "daniel.koh@example.com", "82345678", "Male", 2, 365),
    ("Elena Cruz", "elena.cruz@example.com", "93456789", "Female", 2, 30),
    ("Farid Rahman", "farid.rahman@example.com", "83456789", "Male", 4, 210),
    ("Grace Ho", "grace.ho@example.com", "94567890", "Female", 6, 15),
    ("Hector Diaz", "hector.diaz@example.com", "84567890", "Male", 8, 540),
    ("Isabel Reyes", "isabel.reyes@example.com", "95678901", "Female", 8, 120),
    ("Jun Park", "jun.park@example.com", "85678901", "Male", 9, 5),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Cafe API Seed Data ===");

    let cfg = config::load_config().context("failed to load configuration")?;
    info!("Connecting to database: {}", cfg.database_url());
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    let pool = Arc::new(pool);
    let settings = ServiceSettings::from(&cfg);
    let cafe_service = CafeService::new(pool.clone(), settings);
    let employee_service = EmployeeService::new(pool, settings);

    info!("Creating cafes...");
    let cafes = create_cafes(&cafe_service).await?;
    info!("  Created {} cafes", cafes.len());

    info!("Creating employees...");
    let employee_count = create_employees(&employee_service, &cafes).await?;
    info!("  Created {} employees", employee_count);

    info!("=== Seed Data Complete ===");
    info!("Try these API calls:");
    info!("  curl http://localhost:{}/cafes", cfg.port);
    info!("  curl 'http://localhost:{}/cafes?location=Miami'", cfg.port);
    info!("  curl http://localhost:{}/employees", cfg.port);
    info!("Or explore interactively at: http://localhost:{}/swagger-ui", cfg.port);

    Ok(())
}

async fn create_cafes(service: &CafeService) -> anyhow::Result<Vec<CafeResponse>> {
    let mut created = Vec::with_capacity(CAFES.len());
    for (name, description, location) in CAFES {
        let cafe = service
            .create(CreateCafeInput {
                name: name.to_string(),
                description: description.to_string(),
                location: location.to_string(),
                logo: None,
            })
            .await
            .with_context(|| format!("failed to create cafe {name}"))?;
        info!("  {} ({}) -> {}", cafe.name, cafe.location, cafe.id);
        created.push(cafe);
    }
    Ok(created)
}

async fn create_employees(
    service: &EmployeeService,
    cafes: &[CafeResponse],
) -> anyhow::Result<usize> {
    let today = Utc::now().date_naive();
    let mut count = 0;
    for (name, email, phone, gender, cafe_index, days_ago) in EMPLOYEES {
        let cafe = cafes
            .get(cafe_index)
            .with_context(|| format!("no seeded cafe at index {cafe_index}"))?;
        let employee = service
            .create(CreateEmployeeInput {
                name: name.to_string(),
                email_address: email.to_string(),
                phone_number: phone.to_string(),
                gender: gender.to_string(),
                cafe_id: cafe.id.clone(),
                start_date: Some(today - Duration::days(days_ago)),
            })
            .await
            .with_context(|| format!("failed to create employee {email}"))?;
        info!("  {} at {} -> {}", employee.name, cafe.name, employee.id);
        count += 1;
    }
    Ok(count)
}
