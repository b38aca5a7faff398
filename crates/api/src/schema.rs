use crate::auth::{
    check_credentials, issue_token, AuthConfig, CurrentAdmin, LoginOutcome, SESSION_COOKIE,
};
use crate::error::FleetError;
use crate::fleet::{
    last_update, listing, reference, status, vehicles, MaintenanceDetails, VehicleFilter,
    VehicleInput, VehicleListing, VehicleState,
};
use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Enum, Error, ErrorExtensions, InputObject, Object, OutputType,
    Schema, SimpleObject, ID,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{admin_user, department, maintenance, region, unavailability, vehicle, vehicle_model};
use sea_orm::{DatabaseConnection, Iterable};
use uuid::Uuid;

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(db: Arc<DatabaseConnection>, auth: Arc<AuthConfig>) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .data(auth)
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;
pub struct MutationRoot;

#[Object]
impl QueryRoot {
    async fn fleet(&self) -> FleetQuery {
        FleetQuery
    }
}

#[Object]
impl MutationRoot {
    async fn fleet(&self) -> FleetMutation {
        FleetMutation
    }
}

#[derive(Default)]
pub struct FleetQuery;

#[derive(Default)]
pub struct FleetMutation;

#[Object]
impl FleetQuery {
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<AdminNode> {
        let admin = require_admin(ctx)?;
        Ok(AdminNode {
            id: ID::from(admin.user_id.to_string()),
            username: admin.username,
        })
    }

    /// Vehicles ordered by prefix. Every filter is optional; blank strings are ignored.
    async fn vehicles(
        &self,
        ctx: &Context<'_>,
        filter: Option<VehicleFilterInput>,
    ) -> async_graphql::Result<Vec<VehicleNode>> {
        let db = database(ctx)?;
        let filter = filter.unwrap_or_default().into_filter()?;
        let rows = listing::list_vehicles(db.as_ref(), filter)
            .await
            .map_err(fleet_error)?;
        Ok(rows.into_iter().map(VehicleNode::from).collect())
    }

    async fn vehicle(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<VehicleNode>> {
        let db = database(ctx)?;
        let id = parse_uuid(&id)?;
        match listing::load_vehicle(db.as_ref(), id).await {
            Ok(row) => Ok(Some(row.into())),
            Err(FleetError::NotFound(_)) => Ok(None),
            Err(err) => Err(fleet_error(err)),
        }
    }

    /// Everything the public listing page needs in one round trip.
    async fn board(
        &self,
        ctx: &Context<'_>,
        filter: Option<VehicleFilterInput>,
    ) -> async_graphql::Result<FleetBoard> {
        let db = database(ctx)?;
        let filter = filter.unwrap_or_default().into_filter()?;
        let conn = db.as_ref();
        let vehicles = listing::list_vehicles(conn, filter)
            .await
            .map_err(fleet_error)?;
        let departments = reference::list_departments(conn, None, reference::ReferenceOrder::Code)
            .await
            .map_err(fleet_error)?;
        let regions = reference::list_regions(conn, None, reference::ReferenceOrder::Code)
            .await
            .map_err(fleet_error)?;
        let last_updated_at = last_update::current(conn).await.map_err(fleet_error)?;
        Ok(FleetBoard {
            vehicles: vehicles.into_iter().map(VehicleNode::from).collect(),
            departments: departments.into_iter().map(DepartmentNode::from).collect(),
            regions: regions.into_iter().map(RegionNode::from).collect(),
            last_updated_at: last_updated_at.map(Into::into),
        })
    }

    async fn departments(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        order_by: Option<ReferenceOrderBy>,
    ) -> async_graphql::Result<Vec<DepartmentNode>> {
        let db = database(ctx)?;
        let rows = reference::list_departments(
            db.as_ref(),
            search,
            order_by.unwrap_or_default().into(),
        )
        .await
        .map_err(fleet_error)?;
        Ok(rows.into_iter().map(DepartmentNode::from).collect())
    }

    async fn department(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<DepartmentNode> {
        let db = database(ctx)?;
        let row = reference::get_department(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn regions(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        order_by: Option<ReferenceOrderBy>,
    ) -> async_graphql::Result<Vec<RegionNode>> {
        let db = database(ctx)?;
        let rows =
            reference::list_regions(db.as_ref(), search, order_by.unwrap_or_default().into())
                .await
                .map_err(fleet_error)?;
        Ok(rows.into_iter().map(RegionNode::from).collect())
    }

    async fn region(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<RegionNode> {
        let db = database(ctx)?;
        let row = reference::get_region(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn vehicle_models(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<VehicleModelNode>> {
        let db = database(ctx)?;
        let rows = reference::list_vehicle_models(db.as_ref())
            .await
            .map_err(fleet_error)?;
        Ok(rows.into_iter().map(VehicleModelNode::from).collect())
    }

    async fn statuses(&self) -> Vec<Choice<VehicleStatus>> {
        vehicle::Status::iter()
            .map(|status| Choice {
                value: status.into(),
                label: status.label().to_string(),
            })
            .collect()
    }

    async fn vehicle_types(&self) -> Vec<Choice<VehicleKind>> {
        vehicle::VehicleType::iter()
            .map(|kind| Choice {
                value: kind.into(),
                label: kind.label().to_string(),
            })
            .collect()
    }

    async fn segments(&self) -> Vec<Choice<VehicleSegment>> {
        vehicle::Segment::iter()
            .map(|segment| Choice {
                value: segment.into(),
                label: segment.label().to_string(),
            })
            .collect()
    }

    async fn work_order_statuses(&self) -> Vec<Choice<WorkOrderState>> {
        maintenance::WorkOrderStatus::iter()
            .map(|status| Choice {
                value: status.into(),
                label: status.label().to_string(),
            })
            .collect()
    }

    async fn last_updated_at(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<DateTime<Utc>>> {
        let db = database(ctx)?;
        let stamp = last_update::current(db.as_ref()).await.map_err(fleet_error)?;
        Ok(stamp.map(Into::into))
    }
}

#[Object]
impl FleetMutation {
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let auth = auth_config(ctx)?;
        let db = database(ctx)?;
        let admin = match check_credentials(db.as_ref(), &username, &password)
            .await
            .map_err(fleet_error)?
        {
            LoginOutcome::Granted(admin) => admin,
            LoginOutcome::InvalidCredentials => {
                return Ok(AuthPayload {
                    ok: false,
                    token: None,
                    admin: None,
                    error: Some("Invalid credentials".into()),
                });
            }
            LoginOutcome::Disabled => {
                return Err(error_with_code("FORBIDDEN", "Account disabled"));
            }
        };
        let token = issue_token(&admin, &auth)
            .map_err(|_| error_with_code("INTERNAL", "Failed to issue session token"))?;
        append_session_cookie(ctx, &token, auth.session_ttl_minutes);
        Ok(AuthPayload {
            ok: true,
            token: Some(token),
            admin: Some(admin.into()),
            error: None,
        })
    }

    async fn logout(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        append_session_cookie(ctx, "", -1);
        Ok(true)
    }

    async fn create_department(
        &self,
        ctx: &Context<'_>,
        input: CodedEntityInput,
    ) -> async_graphql::Result<DepartmentNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::create_department(db.as_ref(), input.into())
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn update_department(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CodedEntityInput,
    ) -> async_graphql::Result<DepartmentNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::update_department(db.as_ref(), parse_uuid(&id)?, input.into())
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn delete_department(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        reference::delete_department(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(true)
    }

    async fn create_region(
        &self,
        ctx: &Context<'_>,
        input: CodedEntityInput,
    ) -> async_graphql::Result<RegionNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::create_region(db.as_ref(), input.into())
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn update_region(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CodedEntityInput,
    ) -> async_graphql::Result<RegionNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::update_region(db.as_ref(), parse_uuid(&id)?, input.into())
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn delete_region(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        reference::delete_region(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(true)
    }

    async fn create_vehicle_model(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> async_graphql::Result<VehicleModelNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::create_vehicle_model(db.as_ref(), &name)
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn update_vehicle_model(
        &self,
        ctx: &Context<'_>,
        id: ID,
        name: String,
    ) -> async_graphql::Result<VehicleModelNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let row = reference::update_vehicle_model(db.as_ref(), parse_uuid(&id)?, &name)
            .await
            .map_err(fleet_error)?;
        Ok(row.into())
    }

    async fn delete_vehicle_model(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        reference::delete_vehicle_model(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(true)
    }

    async fn create_vehicle(
        &self,
        ctx: &Context<'_>,
        input: VehicleFields,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let created = vehicles::create_vehicle(db.as_ref(), input.into_input()?)
            .await
            .map_err(fleet_error)?;
        reload(db.as_ref(), created.id).await
    }

    async fn update_vehicle(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: VehicleFields,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let updated = vehicles::update_vehicle(db.as_ref(), parse_uuid(&id)?, input.into_input()?)
            .await
            .map_err(fleet_error)?;
        reload(db.as_ref(), updated.id).await
    }

    async fn delete_vehicle(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        vehicles::delete_vehicle(db.as_ref(), parse_uuid(&id)?)
            .await
            .map_err(fleet_error)?;
        Ok(true)
    }

    async fn start_maintenance(
        &self,
        ctx: &Context<'_>,
        vehicle_id: ID,
        input: MaintenanceInput,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let (vehicle, _) =
            status::start_maintenance(db.as_ref(), parse_uuid(&vehicle_id)?, input.into())
                .await
                .map_err(fleet_error)?;
        reload(db.as_ref(), vehicle.id).await
    }

    async fn complete_maintenance(
        &self,
        ctx: &Context<'_>,
        vehicle_id: ID,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let vehicle = status::complete_maintenance(db.as_ref(), parse_uuid(&vehicle_id)?)
            .await
            .map_err(fleet_error)?;
        reload(db.as_ref(), vehicle.id).await
    }

    async fn start_unavailability(
        &self,
        ctx: &Context<'_>,
        vehicle_id: ID,
        reason: String,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let (vehicle, _) =
            status::start_unavailability(db.as_ref(), parse_uuid(&vehicle_id)?, &reason)
                .await
                .map_err(fleet_error)?;
        reload(db.as_ref(), vehicle.id).await
    }

    async fn complete_unavailability(
        &self,
        ctx: &Context<'_>,
        vehicle_id: ID,
    ) -> async_graphql::Result<VehicleNode> {
        require_admin(ctx)?;
        let db = database(ctx)?;
        let vehicle = status::complete_unavailability(db.as_ref(), parse_uuid(&vehicle_id)?)
            .await
            .map_err(fleet_error)?;
        reload(db.as_ref(), vehicle.id).await
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum VehicleStatus {
    Available,
    InMaintenance,
    Unavailable,
}

impl From<vehicle::Status> for VehicleStatus {
    fn from(value: vehicle::Status) -> Self {
        match value {
            vehicle::Status::Available => VehicleStatus::Available,
            vehicle::Status::InMaintenance => VehicleStatus::InMaintenance,
            vehicle::Status::Unavailable => VehicleStatus::Unavailable,
        }
    }
}

impl From<VehicleStatus> for vehicle::Status {
    fn from(value: VehicleStatus) -> Self {
        match value {
            VehicleStatus::Available => vehicle::Status::Available,
            VehicleStatus::InMaintenance => vehicle::Status::InMaintenance,
            VehicleStatus::Unavailable => vehicle::Status::Unavailable,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "VehicleType")]
pub enum VehicleKind {
    Light,
    Medium,
    Heavy,
    Equipment,
}

impl From<vehicle::VehicleType> for VehicleKind {
    fn from(value: vehicle::VehicleType) -> Self {
        match value {
            vehicle::VehicleType::Light => VehicleKind::Light,
            vehicle::VehicleType::Medium => VehicleKind::Medium,
            vehicle::VehicleType::Heavy => VehicleKind::Heavy,
            vehicle::VehicleType::Equipment => VehicleKind::Equipment,
        }
    }
}

impl From<VehicleKind> for vehicle::VehicleType {
    fn from(value: VehicleKind) -> Self {
        match value {
            VehicleKind::Light => vehicle::VehicleType::Light,
            VehicleKind::Medium => vehicle::VehicleType::Medium,
            VehicleKind::Heavy => vehicle::VehicleType::Heavy,
            VehicleKind::Equipment => vehicle::VehicleType::Equipment,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "Segment")]
pub enum VehicleSegment {
    TransmissionLine,
    Substation,
    NotApplicable,
}

impl From<vehicle::Segment> for VehicleSegment {
    fn from(value: vehicle::Segment) -> Self {
        match value {
            vehicle::Segment::TransmissionLine => VehicleSegment::TransmissionLine,
            vehicle::Segment::Substation => VehicleSegment::Substation,
            vehicle::Segment::NotApplicable => VehicleSegment::NotApplicable,
        }
    }
}

impl From<VehicleSegment> for vehicle::Segment {
    fn from(value: VehicleSegment) -> Self {
        match value {
            VehicleSegment::TransmissionLine => vehicle::Segment::TransmissionLine,
            VehicleSegment::Substation => vehicle::Segment::Substation,
            VehicleSegment::NotApplicable => vehicle::Segment::NotApplicable,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "WorkOrderStatus")]
pub enum WorkOrderState {
    AwaitingQuote,
    AwaitingApproval,
    Approved,
    Warranty,
    NotApplicable,
}

impl From<maintenance::WorkOrderStatus> for WorkOrderState {
    fn from(value: maintenance::WorkOrderStatus) -> Self {
        match value {
            maintenance::WorkOrderStatus::AwaitingQuote => WorkOrderState::AwaitingQuote,
            maintenance::WorkOrderStatus::AwaitingApproval => WorkOrderState::AwaitingApproval,
            maintenance::WorkOrderStatus::Approved => WorkOrderState::Approved,
            maintenance::WorkOrderStatus::Warranty => WorkOrderState::Warranty,
            maintenance::WorkOrderStatus::NotApplicable => WorkOrderState::NotApplicable,
        }
    }
}

impl From<WorkOrderState> for maintenance::WorkOrderStatus {
    fn from(value: WorkOrderState) -> Self {
        match value {
            WorkOrderState::AwaitingQuote => maintenance::WorkOrderStatus::AwaitingQuote,
            WorkOrderState::AwaitingApproval => maintenance::WorkOrderStatus::AwaitingApproval,
            WorkOrderState::Approved => maintenance::WorkOrderStatus::Approved,
            WorkOrderState::Warranty => maintenance::WorkOrderStatus::Warranty,
            WorkOrderState::NotApplicable => maintenance::WorkOrderStatus::NotApplicable,
        }
    }
}

#[derive(Enum, Copy, Clone, Default, Eq, PartialEq, Debug)]
pub enum ReferenceOrderBy {
    #[default]
    Code,
    Name,
}

impl From<ReferenceOrderBy> for reference::ReferenceOrder {
    fn from(value: ReferenceOrderBy) -> Self {
        match value {
            ReferenceOrderBy::Code => reference::ReferenceOrder::Code,
            ReferenceOrderBy::Name => reference::ReferenceOrder::Name,
        }
    }
}

/// An enumeration value paired with its display label.
#[derive(Clone, Debug, SimpleObject)]
#[graphql(concrete(name = "StatusChoice", params(VehicleStatus)))]
#[graphql(concrete(name = "VehicleTypeChoice", params(VehicleKind)))]
#[graphql(concrete(name = "SegmentChoice", params(VehicleSegment)))]
#[graphql(concrete(name = "WorkOrderStatusChoice", params(WorkOrderState)))]
pub struct Choice<T: OutputType> {
    pub value: T,
    pub label: String,
}

#[derive(InputObject, Default, Clone)]
pub struct VehicleFilterInput {
    pub plate: Option<String>,
    pub department_id: Option<ID>,
    pub region_id: Option<ID>,
    pub status: Option<VehicleStatus>,
}

impl VehicleFilterInput {
    fn into_filter(self) -> async_graphql::Result<VehicleFilter> {
        Ok(VehicleFilter {
            plate: self.plate,
            department_id: parse_optional_uuid(self.department_id)?,
            region_id: parse_optional_uuid(self.region_id)?,
            status: self.status.map(Into::into),
        })
    }
}

#[derive(InputObject, Clone)]
pub struct CodedEntityInput {
    pub name: String,
    pub code: String,
}

impl From<CodedEntityInput> for reference::CodedInput {
    fn from(value: CodedEntityInput) -> Self {
        reference::CodedInput::new(value.name, value.code)
    }
}

#[derive(InputObject, Clone)]
pub struct VehicleFields {
    pub prefix: String,
    pub plate: String,
    pub model_id: ID,
    pub department_id: ID,
    pub region_id: ID,
    pub vehicle_type: VehicleKind,
    pub segment: VehicleSegment,
}

impl VehicleFields {
    fn into_input(self) -> async_graphql::Result<VehicleInput> {
        Ok(VehicleInput {
            prefix: self.prefix,
            plate: self.plate,
            model_id: parse_uuid(&self.model_id)?,
            department_id: parse_uuid(&self.department_id)?,
            region_id: parse_uuid(&self.region_id)?,
            vehicle_type: self.vehicle_type.into(),
            segment: self.segment.into(),
        })
    }
}

#[derive(InputObject, Clone)]
pub struct MaintenanceInput {
    pub services: String,
    pub workshop_name: String,
    pub workshop_city: String,
    /// Defaults to today.
    pub entry_date: Option<NaiveDate>,
    pub expected_exit_date: Option<NaiveDate>,
    pub work_order_number: String,
    pub work_order_status: WorkOrderState,
}

impl From<MaintenanceInput> for MaintenanceDetails {
    fn from(value: MaintenanceInput) -> Self {
        MaintenanceDetails {
            services: value.services,
            workshop_name: value.workshop_name,
            workshop_city: value.workshop_city,
            entry_date: value.entry_date,
            expected_exit_date: value.expected_exit_date,
            work_order_number: value.work_order_number,
            work_order_status: value.work_order_status.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Department")]
pub struct DepartmentNode {
    pub id: ID,
    pub name: String,
    pub code: String,
}

impl From<department::Model> for DepartmentNode {
    fn from(model: department::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            name: model.name,
            code: model.code,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Region")]
pub struct RegionNode {
    pub id: ID,
    pub name: String,
    pub code: String,
}

impl From<region::Model> for RegionNode {
    fn from(model: region::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            name: model.name,
            code: model.code,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "VehicleModel")]
pub struct VehicleModelNode {
    pub id: ID,
    pub name: String,
}

impl From<vehicle_model::Model> for VehicleModelNode {
    fn from(model: vehicle_model::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            name: model.name,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Maintenance")]
pub struct MaintenanceNode {
    pub id: ID,
    pub services: String,
    pub workshop_name: String,
    pub workshop_city: String,
    pub entry_date: NaiveDate,
    pub expected_exit_date: Option<NaiveDate>,
    pub work_order_number: String,
    pub work_order_status: WorkOrderState,
    pub work_order_status_label: String,
    pub updated_at: DateTime<Utc>,
}

impl From<maintenance::Model> for MaintenanceNode {
    fn from(model: maintenance::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            services: model.services,
            workshop_name: model.workshop_name,
            workshop_city: model.workshop_city,
            entry_date: model.entry_date,
            expected_exit_date: model.expected_exit_date,
            work_order_number: model.work_order_number,
            work_order_status: model.work_order_status.into(),
            work_order_status_label: model.work_order_status.label().to_string(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Unavailability")]
pub struct UnavailabilityNode {
    pub id: ID,
    pub reason: String,
    pub updated_at: DateTime<Utc>,
}

impl From<unavailability::Model> for UnavailabilityNode {
    fn from(model: unavailability::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            reason: model.reason,
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Vehicle")]
pub struct VehicleNode {
    pub id: ID,
    pub prefix: String,
    pub plate: String,
    pub vehicle_type: VehicleKind,
    pub vehicle_type_label: String,
    pub segment: VehicleSegment,
    pub segment_label: String,
    pub status: VehicleStatus,
    pub status_label: String,
    pub model: VehicleModelNode,
    pub department: DepartmentNode,
    pub region: RegionNode,
    pub maintenance: Option<MaintenanceNode>,
    pub unavailability: Option<UnavailabilityNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleListing> for VehicleNode {
    fn from(row: VehicleListing) -> Self {
        let VehicleListing {
            vehicle,
            model,
            department,
            region,
            state,
        } = row;
        let status = state.status();
        let (maintenance, unavailability) = match state {
            VehicleState::Available => (None, None),
            VehicleState::InMaintenance(record) => (Some(record.into()), None),
            VehicleState::Unavailable(record) => (None, Some(record.into())),
        };
        Self {
            id: ID::from(vehicle.id.to_string()),
            prefix: vehicle.prefix,
            plate: vehicle.plate,
            vehicle_type: vehicle.vehicle_type.into(),
            vehicle_type_label: vehicle.vehicle_type.label().to_string(),
            segment: vehicle.segment.into(),
            segment_label: vehicle.segment.label().to_string(),
            status: status.into(),
            status_label: status.label().to_string(),
            model: model.into(),
            department: department.into(),
            region: region.into(),
            maintenance,
            unavailability,
            created_at: vehicle.created_at.into(),
            updated_at: vehicle.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct FleetBoard {
    pub vehicles: Vec<VehicleNode>,
    pub departments: Vec<DepartmentNode>,
    pub regions: Vec<RegionNode>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Admin")]
pub struct AdminNode {
    pub id: ID,
    pub username: String,
}

impl From<admin_user::Model> for AdminNode {
    fn from(model: admin_user::Model) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            username: model.username,
        }
    }
}

#[derive(Clone, Debug, SimpleObject, Default)]
pub struct AuthPayload {
    pub ok: bool,
    pub token: Option<String>,
    pub admin: Option<AdminNode>,
    pub error: Option<String>,
}

async fn reload(db: &DatabaseConnection, id: Uuid) -> async_graphql::Result<VehicleNode> {
    let row = listing::load_vehicle(db, id).await.map_err(fleet_error)?;
    Ok(row.into())
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing database connection"))
}

fn auth_config(ctx: &Context<'_>) -> async_graphql::Result<Arc<AuthConfig>> {
    ctx.data::<Arc<AuthConfig>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing auth configuration"))
}

/// The HTTP layer only attaches a [`CurrentAdmin`] for valid sessions of active accounts.
fn require_admin(ctx: &Context<'_>) -> async_graphql::Result<CurrentAdmin> {
    ctx.data::<CurrentAdmin>()
        .cloned()
        .map_err(|_| error_with_code("UNAUTHENTICATED", "Login required"))
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| error_with_code("VALIDATION", "Invalid ID"))
}

fn parse_optional_uuid(id: Option<ID>) -> async_graphql::Result<Option<Uuid>> {
    match id {
        Some(id) if !id.trim().is_empty() => parse_uuid(&id).map(Some),
        _ => Ok(None),
    }
}

fn fleet_error(err: FleetError) -> Error {
    err.extend()
}

fn error_with_code(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

fn append_session_cookie(ctx: &Context<'_>, token: &str, ttl_minutes: i64) {
    let cookie = if ttl_minutes < 0 {
        format!("{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE)
    } else {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            token,
            ttl_minutes * 60
        )
    };
    ctx.append_http_header("Set-Cookie", cookie);
}
