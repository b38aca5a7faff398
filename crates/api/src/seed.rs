//! Demo data for local development (`fleet-server seed`).

use chrono::{Duration, Utc};
use entity::{department, maintenance::WorkOrderStatus, region, vehicle, vehicle_model};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::{info, instrument};

use crate::error::{FleetError, FleetResult};
use crate::fleet::reference::{self, CodedInput};
use crate::fleet::{status, vehicles, MaintenanceDetails, VehicleInput};

#[derive(Debug, Clone)]
pub struct SeededFleet {
    pub departments: Vec<department::Model>,
    pub regions: Vec<region::Model>,
    pub models: Vec<vehicle_model::Model>,
    pub vehicles: Vec<vehicle::Model>,
}

impl SeededFleet {
    pub fn vehicle_with_prefix(&self, prefix: &str) -> Option<&vehicle::Model> {
        self.vehicles.iter().find(|v| v.prefix == prefix)
    }
}

/// Loads a small fleet: three departments, two regions, three models and four vehicles,
/// one of them in maintenance and one unavailable. Refuses to run against a non-empty
/// vehicle table.
#[instrument(name = "fleet.seed", skip(db))]
pub async fn seed_fleet_demo(db: &DatabaseConnection) -> FleetResult<SeededFleet> {
    if vehicle::Entity::find().count(db).await? > 0 {
        return Err(FleetError::validation(
            "vehicles already exist; demo data is only loaded into an empty fleet",
        ));
    }

    let mut departments = Vec::new();
    for (name, code) in [
        ("Administração", "adm"),
        ("Manutenção de Linhas", "mnl"),
        ("Operação de Subestações", "ose"),
    ] {
        departments.push(reference::create_department(db, CodedInput::new(name, code)).await?);
    }
    let mut regions = Vec::new();
    for (name, code) in [("Rio de Janeiro", "rj"), ("São Paulo", "sp")] {
        regions.push(reference::create_region(db, CodedInput::new(name, code)).await?);
    }
    let mut models = Vec::new();
    for name in ["Fiat Strada", "Toyota Hilux", "VW Constellation Munck"] {
        models.push(reference::create_vehicle_model(db, name).await?);
    }

    let plan = [
        ("V01", "ABC1234", 0, 0, 0, vehicle::VehicleType::Light, vehicle::Segment::NotApplicable),
        ("V02", "DEF5678", 1, 1, 0, vehicle::VehicleType::Medium, vehicle::Segment::TransmissionLine),
        ("V03", "GHI9012", 2, 2, 1, vehicle::VehicleType::Heavy, vehicle::Segment::Substation),
        ("V04", "JKL3456", 1, 1, 1, vehicle::VehicleType::Medium, vehicle::Segment::TransmissionLine),
    ];
    let mut created = Vec::new();
    for (prefix, plate, model, department, region, vehicle_type, segment) in plan {
        let input = VehicleInput {
            prefix: prefix.to_string(),
            plate: plate.to_string(),
            model_id: models[model].id,
            department_id: departments[department].id,
            region_id: regions[region].id,
            vehicle_type,
            segment,
        };
        created.push(vehicles::create_vehicle(db, input).await?);
    }

    let today = Utc::now().date_naive();
    let (in_shop, _) = status::start_maintenance(
        db,
        created[2].id,
        MaintenanceDetails {
            services: "Revisão do guindaste e troca de pneus".into(),
            workshop_name: "Oficina Pesados Ltda".into(),
            workshop_city: "Campinas".into(),
            entry_date: Some(today - Duration::days(3)),
            expected_exit_date: Some(today + Duration::days(4)),
            work_order_number: "OS-2031".into(),
            work_order_status: WorkOrderStatus::AwaitingApproval,
        },
    )
    .await?;
    let (parked, _) =
        status::start_unavailability(db, created[3].id, "Aguardando documentação do DETRAN")
            .await?;

    let vehicles = created
        .into_iter()
        .map(|v| {
            if v.id == in_shop.id {
                in_shop.clone()
            } else if v.id == parked.id {
                parked.clone()
            } else {
                v
            }
        })
        .collect::<Vec<_>>();
    info!(vehicles = vehicles.len(), "demo fleet seeded");
    Ok(SeededFleet {
        departments,
        regions,
        models,
        vehicles,
    })
}
