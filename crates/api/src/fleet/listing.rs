//! The public vehicle listing: filtered, ordered by prefix, joined with reference data.

use std::collections::HashMap;

use entity::{department, maintenance, region, unavailability, vehicle, vehicle_model};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{contains_pattern, sanitize_optional_filter};
use super::status::VehicleState;
use super::vehicles::get_vehicle;
use crate::error::{FleetError, FleetResult};

#[derive(Clone, Debug, Default)]
pub struct VehicleFilter {
    /// Case-insensitive substring of the plate.
    pub plate: Option<String>,
    pub department_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub status: Option<vehicle::Status>,
}

#[derive(Clone, Debug)]
pub struct VehicleListing {
    pub vehicle: vehicle::Model,
    pub model: vehicle_model::Model,
    pub department: department::Model,
    pub region: region::Model,
    pub state: VehicleState,
}

#[instrument(name = "fleet.vehicles.list", skip(conn))]
pub async fn list_vehicles<C>(conn: &C, filter: VehicleFilter) -> FleetResult<Vec<VehicleListing>>
where
    C: ConnectionTrait,
{
    let mut query = vehicle::Entity::find();
    if let Some(plate) = sanitize_optional_filter(filter.plate) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(vehicle::Column::Plate)))
                .like(contains_pattern(&plate)),
        );
    }
    if let Some(department_id) = filter.department_id {
        query = query.filter(vehicle::Column::DepartmentId.eq(department_id));
    }
    if let Some(region_id) = filter.region_id {
        query = query.filter(vehicle::Column::RegionId.eq(region_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(vehicle::Column::Status.eq(status));
    }
    let vehicles = query
        .order_by_asc(vehicle::Column::Prefix)
        .all(conn)
        .await?;
    let mut listings = Vec::with_capacity(vehicles.len());
    for row in assemble(conn, vehicles).await? {
        match row {
            Ok(listing) => listings.push(listing),
            Err(FleetError::CorruptState(vehicle_id)) => {
                warn!(%vehicle_id, "skipping vehicle with inconsistent status from listing");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(listings)
}

/// Loads one vehicle with the same joins as the listing.
///
/// Unlike [`list_vehicles`], an inconsistent status is returned as an error.
pub async fn load_vehicle<C>(conn: &C, id: Uuid) -> FleetResult<VehicleListing>
where
    C: ConnectionTrait,
{
    let vehicle = get_vehicle(conn, id).await?;
    assemble(conn, vec![vehicle])
        .await?
        .pop()
        .ok_or(FleetError::NotFound("vehicle"))?
}

/// Joins each vehicle with its reference rows and status records, one result per vehicle.
async fn assemble<C>(
    conn: &C,
    vehicles: Vec<vehicle::Model>,
) -> FleetResult<Vec<FleetResult<VehicleListing>>>
where
    C: ConnectionTrait,
{
    if vehicles.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = vehicles.iter().map(|v| v.id).collect();
    let model_ids: Vec<Uuid> = vehicles.iter().map(|v| v.model_id).collect();
    let department_ids: Vec<Uuid> = vehicles.iter().map(|v| v.department_id).collect();
    let region_ids: Vec<Uuid> = vehicles.iter().map(|v| v.region_id).collect();

    let models: HashMap<Uuid, vehicle_model::Model> = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::Id.is_in(model_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let departments: HashMap<Uuid, department::Model> = department::Entity::find()
        .filter(department::Column::Id.is_in(department_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let regions: HashMap<Uuid, region::Model> = region::Entity::find()
        .filter(region::Column::Id.is_in(region_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let mut maintenances: HashMap<Uuid, maintenance::Model> = maintenance::Entity::find()
        .filter(maintenance::Column::VehicleId.is_in(ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.vehicle_id, m))
        .collect();
    let mut unavailabilities: HashMap<Uuid, unavailability::Model> =
        unavailability::Entity::find()
            .filter(unavailability::Column::VehicleId.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.vehicle_id, u))
            .collect();

    Ok(vehicles
        .into_iter()
        .map(|vehicle| {
            let state = VehicleState::resolve(
                &vehicle,
                maintenances.remove(&vehicle.id),
                unavailabilities.remove(&vehicle.id),
            )?;
            // Foreign keys make these lookups total; a miss means the rows changed underneath us.
            let model = models
                .get(&vehicle.model_id)
                .cloned()
                .ok_or(FleetError::NotFound("vehicle model"))?;
            let department = departments
                .get(&vehicle.department_id)
                .cloned()
                .ok_or(FleetError::NotFound("department"))?;
            let region = regions
                .get(&vehicle.region_id)
                .cloned()
                .ok_or(FleetError::NotFound("region"))?;
            Ok(VehicleListing {
                vehicle,
                model,
                department,
                region,
                state,
            })
        })
        .collect())
}
