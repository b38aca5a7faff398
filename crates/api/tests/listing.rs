mod common;

use api::fleet::{listing, status, vehicles, VehicleFilter, VehicleInput};
use api::FleetError;
use common::{Fixture, TestEnv};
use entity::vehicle;

async fn plates(env: &TestEnv, filter: VehicleFilter) -> Vec<String> {
    listing::list_vehicles(env.conn(), filter)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.vehicle.plate)
        .collect()
}

async fn populated() -> (TestEnv, Fixture) {
    let env = TestEnv::sqlite().await;
    let fixture = Fixture::load(env.conn()).await;
    fixture.vehicle(env.conn(), "V03", "ABC1234").await;
    fixture.vehicle(env.conn(), "V01", "XYZ0001").await;
    let moved = VehicleInput {
        department_id: fixture.other_department.id,
        region_id: fixture.other_region.id,
        ..fixture.vehicle_input("V02", "QAB9C77")
    };
    let moved = vehicles::create_vehicle(env.conn(), moved).await.unwrap();
    status::start_unavailability(env.conn(), moved.id, "Sinistro")
        .await
        .unwrap();
    (env, fixture)
}

#[tokio::test]
async fn unfiltered_listing_is_ordered_by_prefix() {
    let (env, fixture) = populated().await;
    let rows = listing::list_vehicles(env.conn(), VehicleFilter::default())
        .await
        .unwrap();
    let prefixes: Vec<&str> = rows.iter().map(|r| r.vehicle.prefix.as_str()).collect();
    assert_eq!(prefixes, vec!["V01", "V02", "V03"]);

    let first = &rows[0];
    assert_eq!(first.department.code, fixture.department.code);
    assert_eq!(first.region.code, "RJ");
    assert_eq!(first.model.name, "Fiat Strada");
    assert_eq!(rows[1].state.status(), vehicle::Status::Unavailable);
    assert_eq!(rows[1].state.unavailability().map(|u| u.reason.as_str()), Some("Sinistro"));
}

#[tokio::test]
async fn plate_filter_is_a_case_insensitive_substring() {
    let (env, _) = populated().await;
    let hits = plates(
        &env,
        VehicleFilter {
            plate: Some("ab".into()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(hits, vec!["QAB9C77", "ABC1234"]);

    let hits = plates(
        &env,
        VehicleFilter {
            plate: Some("abc".into()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(hits, vec!["ABC1234"]);
}

#[tokio::test]
async fn plate_filter_treats_like_wildcards_literally() {
    let (env, _) = populated().await;
    for term in ["A_C", "%", "_", "\\"] {
        let hits = plates(
            &env,
            VehicleFilter {
                plate: Some(term.into()),
                ..Default::default()
            },
        )
        .await;
        assert!(hits.is_empty(), "{term:?} matched {hits:?}");
    }
}

#[tokio::test]
async fn filters_combine_with_and() {
    let (env, fixture) = populated().await;
    let hits = plates(
        &env,
        VehicleFilter {
            department_id: Some(fixture.department.id),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(hits, vec!["XYZ0001", "ABC1234"]);

    let hits = plates(
        &env,
        VehicleFilter {
            region_id: Some(fixture.other_region.id),
            status: Some(vehicle::Status::Unavailable),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(hits, vec!["QAB9C77"]);

    let hits = plates(
        &env,
        VehicleFilter {
            plate: Some("xyz".into()),
            region_id: Some(fixture.other_region.id),
            ..Default::default()
        },
    )
    .await;
    assert!(hits.is_empty());

    let hits = plates(
        &env,
        VehicleFilter {
            status: Some(vehicle::Status::InMaintenance),
            ..Default::default()
        },
    )
    .await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn blank_plate_filter_is_ignored() {
    let (env, _) = populated().await;
    let hits = plates(
        &env,
        VehicleFilter {
            plate: Some("   ".into()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn vehicle_identity_is_unique() {
    let (env, fixture) = populated().await;
    let err = vehicles::create_vehicle(env.conn(), fixture.vehicle_input("V09", " abc1234 "))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "plate ABC1234 is already registered");

    let err = vehicles::create_vehicle(env.conn(), fixture.vehicle_input("V01", "NEW0001"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "prefix V01 is already in use");

    let err = vehicles::create_vehicle(env.conn(), fixture.vehicle_input("V1234567", "NEW0001"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
}

#[tokio::test]
async fn vehicle_references_must_exist() {
    let env = TestEnv::sqlite().await;
    let fixture = Fixture::load(env.conn()).await;
    let input = VehicleInput {
        region_id: uuid::Uuid::new_v4(),
        ..fixture.vehicle_input("V01", "ABC1234")
    };
    let err = vehicles::create_vehicle(env.conn(), input).await.unwrap_err();
    assert!(matches!(err, FleetError::Validation(ref msg) if msg == "region does not exist"));
}

#[tokio::test]
async fn updates_keep_status_and_allow_own_identity() {
    let env = TestEnv::sqlite().await;
    let fixture = Fixture::load(env.conn()).await;
    let car = fixture.vehicle(env.conn(), "V01", "ABC1234").await;
    status::start_unavailability(env.conn(), car.id, "Sinistro")
        .await
        .unwrap();

    let input = VehicleInput {
        vehicle_type: vehicle::VehicleType::Heavy,
        department_id: fixture.other_department.id,
        ..fixture.vehicle_input("V01", "ABC1234")
    };
    let updated = vehicles::update_vehicle(env.conn(), car.id, input)
        .await
        .unwrap();
    assert_eq!(updated.status, vehicle::Status::Unavailable);
    assert_eq!(updated.vehicle_type, vehicle::VehicleType::Heavy);
    assert_eq!(updated.department_id, fixture.other_department.id);

    let row = listing::load_vehicle(env.conn(), car.id).await.unwrap();
    assert_eq!(row.department.code, "OPE");
}
