//! Maintenance and unavailability transitions.
//!
//! A vehicle is in exactly one of three states. The `status` column and the presence of
//! the two extension records must agree; [`VehicleState::resolve`] refuses to guess when
//! they do not.

use chrono::{NaiveDate, Utc};
use entity::maintenance::{self, WorkOrderStatus};
use entity::{unavailability, vehicle};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, ModelTrait,
    TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::vehicles::get_vehicle;
use super::{last_update, required_text};
use crate::error::{FleetError, FleetResult};

const WORKSHOP_MAX: usize = 100;
const WORK_ORDER_MAX: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VehicleState {
    Available,
    InMaintenance(maintenance::Model),
    Unavailable(unavailability::Model),
}

impl VehicleState {
    pub fn resolve(
        vehicle: &vehicle::Model,
        maintenance: Option<maintenance::Model>,
        unavailability: Option<unavailability::Model>,
    ) -> FleetResult<Self> {
        match (vehicle.status, maintenance, unavailability) {
            (vehicle::Status::Available, None, None) => Ok(Self::Available),
            (vehicle::Status::InMaintenance, Some(record), None) => {
                Ok(Self::InMaintenance(record))
            }
            (vehicle::Status::Unavailable, None, Some(record)) => Ok(Self::Unavailable(record)),
            _ => {
                warn!(vehicle_id = %vehicle.id, status = ?vehicle.status, "status records disagree with vehicle status");
                Err(FleetError::CorruptState(vehicle.id))
            }
        }
    }

    pub fn status(&self) -> vehicle::Status {
        match self {
            Self::Available => vehicle::Status::Available,
            Self::InMaintenance(_) => vehicle::Status::InMaintenance,
            Self::Unavailable(_) => vehicle::Status::Unavailable,
        }
    }

    pub fn maintenance(&self) -> Option<&maintenance::Model> {
        match self {
            Self::InMaintenance(record) => Some(record),
            _ => None,
        }
    }

    pub fn unavailability(&self) -> Option<&unavailability::Model> {
        match self {
            Self::Unavailable(record) => Some(record),
            _ => None,
        }
    }
}

/// Reads the vehicle's records and resolves its current state.
pub async fn load_state<C>(conn: &C, vehicle: &vehicle::Model) -> FleetResult<VehicleState>
where
    C: ConnectionTrait,
{
    let maintenance = vehicle
        .find_related(maintenance::Entity)
        .one(conn)
        .await?;
    let unavailability = vehicle
        .find_related(unavailability::Entity)
        .one(conn)
        .await?;
    VehicleState::resolve(vehicle, maintenance, unavailability)
}

#[derive(Clone, Debug)]
pub struct MaintenanceDetails {
    pub services: String,
    pub workshop_name: String,
    pub workshop_city: String,
    /// Defaults to today when omitted.
    pub entry_date: Option<NaiveDate>,
    pub expected_exit_date: Option<NaiveDate>,
    pub work_order_number: String,
    pub work_order_status: WorkOrderStatus,
}

#[derive(Debug)]
struct ValidMaintenance {
    services: String,
    workshop_name: String,
    workshop_city: String,
    entry_date: NaiveDate,
    expected_exit_date: Option<NaiveDate>,
    work_order_number: String,
    work_order_status: WorkOrderStatus,
}

impl MaintenanceDetails {
    fn validate(self, today: NaiveDate) -> FleetResult<ValidMaintenance> {
        let services = self.services.trim();
        if services.is_empty() {
            return Err(FleetError::validation("services is required"));
        }
        let entry_date = self.entry_date.unwrap_or(today);
        if let Some(exit) = self.expected_exit_date {
            if exit < entry_date {
                return Err(FleetError::validation(
                    "expected exit date cannot be before the entry date",
                ));
            }
        }
        Ok(ValidMaintenance {
            services: services.to_string(),
            workshop_name: required_text("workshop name", &self.workshop_name, WORKSHOP_MAX)?,
            workshop_city: required_text("workshop city", &self.workshop_city, WORKSHOP_MAX)?,
            entry_date,
            expected_exit_date: self.expected_exit_date,
            work_order_number: required_text(
                "work order number",
                &self.work_order_number,
                WORK_ORDER_MAX,
            )?,
            work_order_status: self.work_order_status,
        })
    }
}

/// Puts a vehicle into maintenance, or rewrites the open maintenance record.
#[instrument(name = "fleet.status.start_maintenance", skip(db, details))]
pub async fn start_maintenance(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
    details: MaintenanceDetails,
) -> FleetResult<(vehicle::Model, maintenance::Model)> {
    let valid = details.validate(Utc::now().date_naive())?;
    let txn = db.begin().await?;
    let vehicle = get_vehicle(&txn, vehicle_id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let record = match load_state(&txn, &vehicle).await? {
        VehicleState::Unavailable(_) => {
            return Err(FleetError::InvalidTransition(
                "vehicle is unavailable; finish the unavailability first".to_string(),
            ));
        }
        VehicleState::InMaintenance(existing) => {
            let mut active: maintenance::ActiveModel = existing.into();
            apply_details(&mut active, valid);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        VehicleState::Available => {
            let mut active = maintenance::ActiveModel {
                id: Set(Uuid::new_v4()),
                vehicle_id: Set(vehicle.id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            apply_details(&mut active, valid);
            active.insert(&txn).await?
        }
    };

    let vehicle = set_status(&txn, vehicle, vehicle::Status::InMaintenance, now).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %vehicle.id, work_order = %record.work_order_number, "vehicle in maintenance");
    Ok((vehicle, record))
}

#[instrument(name = "fleet.status.complete_maintenance", skip(db))]
pub async fn complete_maintenance(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
) -> FleetResult<vehicle::Model> {
    let txn = db.begin().await?;
    let vehicle = get_vehicle(&txn, vehicle_id).await?;
    let record = match load_state(&txn, &vehicle).await? {
        VehicleState::InMaintenance(record) => record,
        _ => {
            return Err(FleetError::InvalidTransition(
                "vehicle has no open maintenance".to_string(),
            ));
        }
    };
    record.delete(&txn).await?;
    let vehicle = set_status(&txn, vehicle, vehicle::Status::Available, Utc::now().into()).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %vehicle.id, "maintenance completed");
    Ok(vehicle)
}

/// Marks a vehicle unavailable, or rewrites the reason of an open unavailability.
#[instrument(name = "fleet.status.start_unavailability", skip(db, reason))]
pub async fn start_unavailability(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
    reason: &str,
) -> FleetResult<(vehicle::Model, unavailability::Model)> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(FleetError::validation("reason is required"));
    }
    let txn = db.begin().await?;
    let vehicle = get_vehicle(&txn, vehicle_id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let record = match load_state(&txn, &vehicle).await? {
        VehicleState::InMaintenance(_) => {
            return Err(FleetError::InvalidTransition(
                "vehicle is in maintenance; finish the maintenance first".to_string(),
            ));
        }
        VehicleState::Unavailable(existing) => {
            let mut active: unavailability::ActiveModel = existing.into();
            active.reason = Set(reason.to_string());
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        VehicleState::Available => {
            unavailability::ActiveModel {
                id: Set(Uuid::new_v4()),
                vehicle_id: Set(vehicle.id),
                reason: Set(reason.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    let vehicle = set_status(&txn, vehicle, vehicle::Status::Unavailable, now).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %vehicle.id, "vehicle unavailable");
    Ok((vehicle, record))
}

#[instrument(name = "fleet.status.complete_unavailability", skip(db))]
pub async fn complete_unavailability(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
) -> FleetResult<vehicle::Model> {
    let txn = db.begin().await?;
    let vehicle = get_vehicle(&txn, vehicle_id).await?;
    let record = match load_state(&txn, &vehicle).await? {
        VehicleState::Unavailable(record) => record,
        _ => {
            return Err(FleetError::InvalidTransition(
                "vehicle has no open unavailability".to_string(),
            ));
        }
    };
    record.delete(&txn).await?;
    let vehicle = set_status(&txn, vehicle, vehicle::Status::Available, Utc::now().into()).await?;
    last_update::touch(&txn).await?;
    txn.commit().await?;
    info!(vehicle_id = %vehicle.id, "unavailability completed");
    Ok(vehicle)
}

fn apply_details(active: &mut maintenance::ActiveModel, valid: ValidMaintenance) {
    active.services = Set(valid.services);
    active.workshop_name = Set(valid.workshop_name);
    active.workshop_city = Set(valid.workshop_city);
    active.entry_date = Set(valid.entry_date);
    active.expected_exit_date = Set(valid.expected_exit_date);
    active.work_order_number = Set(valid.work_order_number);
    active.work_order_status = Set(valid.work_order_status);
}

async fn set_status<C>(
    conn: &C,
    vehicle: vehicle::Model,
    status: vehicle::Status,
    now: DateTimeWithTimeZone,
) -> FleetResult<vehicle::Model>
where
    C: ConnectionTrait,
{
    let mut active: vehicle::ActiveModel = vehicle.into();
    active.status = Set(status);
    active.updated_at = Set(now);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vehicle_with(status: vehicle::Status) -> vehicle::Model {
        let at: DateTimeWithTimeZone = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().into();
        vehicle::Model {
            id: Uuid::new_v4(),
            prefix: "V01".into(),
            plate: "ABC1234".into(),
            model_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            region_id: Uuid::new_v4(),
            vehicle_type: vehicle::VehicleType::Light,
            segment: vehicle::Segment::NotApplicable,
            status,
            created_at: at,
            updated_at: at,
        }
    }

    fn unavailability_for(vehicle: &vehicle::Model) -> unavailability::Model {
        unavailability::Model {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            reason: "sinistro".into(),
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }

    fn details() -> MaintenanceDetails {
        MaintenanceDetails {
            services: "troca de óleo".into(),
            workshop_name: "Oficina Central".into(),
            workshop_city: "Niterói".into(),
            entry_date: None,
            expected_exit_date: None,
            work_order_number: "OS-1".into(),
            work_order_status: WorkOrderStatus::AwaitingQuote,
        }
    }

    #[test]
    fn resolves_consistent_rows() {
        let available = vehicle_with(vehicle::Status::Available);
        assert_eq!(
            VehicleState::resolve(&available, None, None).unwrap(),
            VehicleState::Available
        );

        let unavailable = vehicle_with(vehicle::Status::Unavailable);
        let record = unavailability_for(&unavailable);
        let state = VehicleState::resolve(&unavailable, None, Some(record.clone())).unwrap();
        assert_eq!(state.status(), vehicle::Status::Unavailable);
        assert_eq!(state.unavailability(), Some(&record));
        assert!(state.maintenance().is_none());
    }

    #[test]
    fn disagreeing_rows_are_corrupt() {
        let vehicle = vehicle_with(vehicle::Status::Available);
        let record = unavailability_for(&vehicle);
        let err = VehicleState::resolve(&vehicle, None, Some(record)).unwrap_err();
        assert!(matches!(err, FleetError::CorruptState(id) if id == vehicle.id));

        let vehicle = vehicle_with(vehicle::Status::InMaintenance);
        let err = VehicleState::resolve(&vehicle, None, None).unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn entry_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let valid = details().validate(today).unwrap();
        assert_eq!(valid.entry_date, today);
        assert_eq!(valid.work_order_number, "OS-1");
    }

    #[test]
    fn exit_before_entry_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut input = details();
        input.entry_date = NaiveDate::from_ymd_opt(2025, 3, 5);
        input.expected_exit_date = NaiveDate::from_ymd_opt(2025, 3, 4);
        let err = input.validate(today).unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn blank_work_order_is_rejected() {
        let mut input = details();
        input.work_order_number = "  ".into();
        let err = input.validate(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "work order number is required");
    }
}
