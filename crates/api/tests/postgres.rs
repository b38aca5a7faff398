use std::sync::Arc;

use api::fleet::{listing, status, VehicleFilter};
use api::schema::{build_schema, AppSchema};
use api::seed::seed_fleet_demo;
use api::auth::AuthConfig;
use async_graphql::Request;
use entity::vehicle;
use migration::MigratorTrait;
use sea_orm::Database;

#[tokio::test]
async fn migrations_and_seed_run_on_postgres() {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping Postgres fleet tests: TEST_DATABASE_URL not set");
            return;
        }
    };
    let db = Arc::new(Database::connect(&url).await.unwrap());
    migration::Migrator::reset(db.as_ref()).await.unwrap();
    migration::Migrator::up(db.as_ref(), None).await.unwrap();

    let seeded = seed_fleet_demo(db.as_ref()).await.unwrap();
    assert_eq!(seeded.vehicles.len(), 4);
    assert!(seed_fleet_demo(db.as_ref()).await.is_err());

    let rows = listing::list_vehicles(
        db.as_ref(),
        VehicleFilter {
            plate: Some("ghi".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state.status(), vehicle::Status::InMaintenance);

    let parked = seeded.vehicle_with_prefix("V04").unwrap();
    let err = status::start_maintenance(
        db.as_ref(),
        parked.id,
        api::fleet::MaintenanceDetails {
            services: "Revisão".into(),
            workshop_name: "Oficina".into(),
            workshop_city: "Campinas".into(),
            entry_date: None,
            expected_exit_date: None,
            work_order_number: "OS-9".into(),
            work_order_status: entity::maintenance::WorkOrderStatus::Warranty,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");

    let auth = Arc::new(AuthConfig {
        jwt_secret: "test".into(),
        session_ttl_minutes: 5,
    });
    let AppSchema(schema) = build_schema(db.clone(), auth);
    let resp = schema
        .execute(Request::new("{ fleet { vehicles { prefix status } lastUpdatedAt } }"))
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);

    migration::Migrator::reset(db.as_ref()).await.unwrap();
}
