mod common;

use api::fleet::reference::{self, CodedInput, ReferenceOrder};
use api::FleetError;
use common::{Fixture, TestEnv};

#[tokio::test]
async fn department_codes_are_normalized() {
    let env = TestEnv::sqlite().await;
    let dept = reference::create_department(env.conn(), CodedInput::new(" Administração ", " adm "))
        .await
        .unwrap();
    assert_eq!(dept.code, "ADM");
    assert_eq!(dept.name, "Administração");

    let fetched = reference::get_department(env.conn(), dept.id).await.unwrap();
    assert_eq!(fetched.code, "ADM");
}

#[tokio::test]
async fn duplicate_codes_are_validation_failures() {
    let env = TestEnv::sqlite().await;
    reference::create_department(env.conn(), CodedInput::new("Administração", "ADM"))
        .await
        .unwrap();
    let err = reference::create_department(env.conn(), CodedInput::new("Outro", "adm"))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation(_)), "got {err:?}");

    let region = reference::create_region(env.conn(), CodedInput::new("Rio", "rj"))
        .await
        .unwrap();
    let err = reference::create_region(env.conn(), CodedInput::new("Rio 2", "RJ"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");

    // Saving a row with its own current code is fine.
    let renamed = reference::update_region(env.conn(), region.id, CodedInput::new("Rio de Janeiro", "rj"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Rio de Janeiro");
}

#[tokio::test]
async fn update_to_another_rows_code_is_refused() {
    let env = TestEnv::sqlite().await;
    reference::create_department(env.conn(), CodedInput::new("Administração", "ADM"))
        .await
        .unwrap();
    let ope = reference::create_department(env.conn(), CodedInput::new("Operação", "OPE"))
        .await
        .unwrap();
    let err = reference::update_department(env.conn(), ope.id, CodedInput::new("Operação", "adm"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "department code ADM is already in use");
}

#[tokio::test]
async fn oversized_and_blank_fields_are_rejected() {
    let env = TestEnv::sqlite().await;
    let err = reference::create_department(env.conn(), CodedInput::new("", "ADM"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "name is required");

    let err = reference::create_region(env.conn(), CodedInput::new("Longa", "ABCDEFGHIJK"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "code must be at most 10 characters");

    let long_name = "x".repeat(51);
    let err = reference::create_vehicle_model(env.conn(), &long_name)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() {
    let env = TestEnv::sqlite().await;
    let fixture = Fixture::load(env.conn()).await;
    fixture.vehicle(env.conn(), "V01", "ABC1234").await;

    let err = reference::delete_department(env.conn(), fixture.department.id)
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::ReferenceInUse(_)), "got {err:?}");
    assert_eq!(
        err.to_string(),
        "department ADM still has 1 vehicle(s) assigned"
    );

    let err = reference::delete_region(env.conn(), fixture.region.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_IN_USE");

    let err = reference::delete_vehicle_model(env.conn(), fixture.model.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFERENCE_IN_USE");

    // Unreferenced rows go away.
    reference::delete_department(env.conn(), fixture.other_department.id)
        .await
        .unwrap();
    reference::delete_region(env.conn(), fixture.other_region.id)
        .await
        .unwrap();
    let departments = reference::list_departments(env.conn(), None, ReferenceOrder::Code)
        .await
        .unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].code, "ADM");
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let env = TestEnv::sqlite().await;
    let err = reference::delete_region(env.conn(), uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound("region")));
}

#[tokio::test]
async fn listings_sort_and_search() {
    let env = TestEnv::sqlite().await;
    for (name, code) in [
        ("Operação", "OPE"),
        ("Administração", "ZAD"),
        ("Manutenção", "MAN"),
    ] {
        reference::create_department(env.conn(), CodedInput::new(name, code))
            .await
            .unwrap();
    }

    let by_code: Vec<String> = reference::list_departments(env.conn(), None, ReferenceOrder::Code)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(by_code, vec!["MAN", "OPE", "ZAD"]);

    let by_name: Vec<String> = reference::list_departments(env.conn(), None, ReferenceOrder::Name)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(by_name, vec!["ZAD", "MAN", "OPE"]);

    let hits = reference::list_departments(env.conn(), Some("ope".into()), ReferenceOrder::Name)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "OPE");

    let hits = reference::list_departments(env.conn(), Some("zad".into()), ReferenceOrder::Name)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let all = reference::list_departments(env.conn(), Some("   ".into()), ReferenceOrder::Code)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn vehicle_models_are_unique_and_sorted() {
    let env = TestEnv::sqlite().await;
    let hilux = reference::create_vehicle_model(env.conn(), "Toyota Hilux")
        .await
        .unwrap();
    reference::create_vehicle_model(env.conn(), " Fiat Strada ")
        .await
        .unwrap();
    let err = reference::create_vehicle_model(env.conn(), "Fiat Strada")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "vehicle model Fiat Strada already exists");

    let updated = reference::update_vehicle_model(env.conn(), hilux.id, "Toyota Hilux")
        .await
        .unwrap();
    assert_eq!(updated.name, "Toyota Hilux");

    let names: Vec<String> = reference::list_vehicle_models(env.conn())
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Fiat Strada", "Toyota Hilux"]);
}

#[tokio::test]
async fn search_matches_wildcards_literally() {
    let env = TestEnv::sqlite().await;
    for (name, code) in [("Frota 100%", "F_1"), ("Frota geral", "FG1")] {
        reference::create_region(env.conn(), CodedInput::new(name, code))
            .await
            .unwrap();
    }

    let codes = |rows: Vec<entity::region::Model>| -> Vec<String> {
        rows.into_iter().map(|r| r.code).collect()
    };
    let hits = reference::list_regions(env.conn(), Some("_".into()), ReferenceOrder::Code)
        .await
        .unwrap();
    assert_eq!(codes(hits), vec!["F_1"]);
    let hits = reference::list_regions(env.conn(), Some("%".into()), ReferenceOrder::Code)
        .await
        .unwrap();
    assert_eq!(codes(hits), vec!["F_1"]);
    let hits = reference::list_regions(env.conn(), Some("f_".into()), ReferenceOrder::Code)
        .await
        .unwrap();
    assert_eq!(codes(hits), vec!["F_1"]);
}
