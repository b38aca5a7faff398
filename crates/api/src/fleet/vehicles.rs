//! Vehicle registry writes. Status changes live in [`super::status`].

use chrono::Utc;
use entity::{department, maintenance, region, unavailability, vehicle, vehicle_model};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{last_update, normalize_code, required_text};
use crate::error::{FleetError, FleetResult};

const PREFIX_MAX: usize = 6;
const PLATE_MAX: usize = 10;

#[derive(Clone, Debug)]
pub struct VehicleInput {
    pub prefix: String,
    pub plate: String,
    pub model_id: Uuid,
    pub department_id: Uuid,
    pub region_id: Uuid,
    pub vehicle_type: vehicle::VehicleType,
    pub segment: vehicle::Segment,
}

struct NormalizedVehicle {
    prefix: String,
    plate: String,
}

impl VehicleInput {
    fn normalized(&self) -> FleetResult<NormalizedVehicle> {
        Ok(NormalizedVehicle {
            prefix: required_text("prefix", &self.prefix, PREFIX_MAX)?,
            plate: normalize_code("plate", &self.plate, PLATE_MAX)?,
        })
    }
}

pub async fn get_vehicle<C>(conn: &C, id: Uuid) -> FleetResult<vehicle::Model>
where
    C: ConnectionTrait,
{
    vehicle::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(FleetError::NotFound("vehicle"))
}

/// Registers a vehicle. New vehicles always start out available.
#[instrument(name = "fleet.vehicles.create", skip(db, input), fields(prefix = %input.prefix))]
pub async fn create_vehicle(
    db: &DatabaseConnection,
    input: VehicleInput,
) -> FleetResult<vehicle::Model> {
    let normalized = input.normalized()?;
    let txn = db.begin().await?;
    ensure_references_exist(&txn, &input).await?;
    ensure_identity_free(&txn, &normalized, None).await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        prefix: Set(normalized.prefix),
        plate: Set(normalized.plate),
        model_id: Set(input.model_id),
        department_id: Set(input.department_id),
        region_id: Set(input.region_id),
        vehicle_type: Set(input.vehicle_type),
        segment: Set(input.segment),
        status: Set(vehicle::Status::Available),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %model.id, plate = %model.plate, "vehicle registered");
    Ok(model)
}

/// Replaces the editable fields of a vehicle. The status is left untouched.
#[instrument(name = "fleet.vehicles.update", skip(db, input))]
pub async fn update_vehicle(
    db: &DatabaseConnection,
    id: Uuid,
    input: VehicleInput,
) -> FleetResult<vehicle::Model> {
    let normalized = input.normalized()?;
    let txn = db.begin().await?;
    let existing = get_vehicle(&txn, id).await?;
    ensure_references_exist(&txn, &input).await?;
    ensure_identity_free(&txn, &normalized, Some(id)).await?;

    let mut active: vehicle::ActiveModel = existing.into();
    active.prefix = Set(normalized.prefix);
    active.plate = Set(normalized.plate);
    active.model_id = Set(input.model_id);
    active.department_id = Set(input.department_id);
    active.region_id = Set(input.region_id);
    active.vehicle_type = Set(input.vehicle_type);
    active.segment = Set(input.segment);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Removes a vehicle together with any maintenance or unavailability record it owns.
#[instrument(name = "fleet.vehicles.delete", skip(db))]
pub async fn delete_vehicle(db: &DatabaseConnection, id: Uuid) -> FleetResult<()> {
    let txn = db.begin().await?;
    let existing = get_vehicle(&txn, id).await?;
    maintenance::Entity::delete_many()
        .filter(maintenance::Column::VehicleId.eq(id))
        .exec(&txn)
        .await?;
    unavailability::Entity::delete_many()
        .filter(unavailability::Column::VehicleId.eq(id))
        .exec(&txn)
        .await?;
    vehicle::Entity::delete_by_id(id).exec(&txn).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %id, plate = %existing.plate, "vehicle deleted");
    Ok(())
}

async fn ensure_references_exist<C>(conn: &C, input: &VehicleInput) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    if vehicle_model::Entity::find_by_id(input.model_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(FleetError::validation("vehicle model does not exist"));
    }
    if department::Entity::find_by_id(input.department_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(FleetError::validation("department does not exist"));
    }
    if region::Entity::find_by_id(input.region_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(FleetError::validation("region does not exist"));
    }
    Ok(())
}

async fn ensure_identity_free<C>(
    conn: &C,
    normalized: &NormalizedVehicle,
    except: Option<Uuid>,
) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    let mut prefix_query =
        vehicle::Entity::find().filter(vehicle::Column::Prefix.eq(normalized.prefix.as_str()));
    let mut plate_query =
        vehicle::Entity::find().filter(vehicle::Column::Plate.eq(normalized.plate.as_str()));
    if let Some(id) = except {
        prefix_query = prefix_query.filter(vehicle::Column::Id.ne(id));
        plate_query = plate_query.filter(vehicle::Column::Id.ne(id));
    }
    if prefix_query.count(conn).await? > 0 {
        return Err(FleetError::validation(format!(
            "prefix {} is already in use",
            normalized.prefix
        )));
    }
    if plate_query.count(conn).await? > 0 {
        return Err(FleetError::validation(format!(
            "plate {} is already registered",
            normalized.plate
        )));
    }
    Ok(())
}
