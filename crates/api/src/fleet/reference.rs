//! Departments, regions and the vehicle model catalog.
//!
//! These rows are referenced by vehicles and never owned by them: deletes are refused
//! while any vehicle still points at the row.

use chrono::Utc;
use entity::{department, region, vehicle, vehicle_model};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{contains_pattern, normalize_code, required_text, sanitize_optional_filter};
use crate::error::{FleetError, FleetResult};

const NAME_MAX: usize = 100;
const CODE_MAX: usize = 10;
const MODEL_NAME_MAX: usize = 50;

/// Payload shared by departments and regions.
#[derive(Clone, Debug)]
pub struct CodedInput {
    pub name: String,
    pub code: String,
}

impl CodedInput {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    fn normalized(&self) -> FleetResult<(String, String)> {
        Ok((
            required_text("name", &self.name, NAME_MAX)?,
            normalize_code("code", &self.code, CODE_MAX)?,
        ))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReferenceOrder {
    #[default]
    Code,
    Name,
}

/// A reference table with a display name and a unique upper-case code that vehicles point at.
pub trait CodedEntity: EntityTrait {
    /// Noun used in log fields and error messages.
    const LABEL: &'static str;

    type ActiveModel: ActiveModelTrait<Entity = Self> + ActiveModelBehavior;

    fn id_column() -> Self::Column;
    fn name_column() -> Self::Column;
    fn code_column() -> Self::Column;
    /// The vehicle column referencing this table.
    fn vehicle_column() -> vehicle::Column;

    fn id_of(model: &Self::Model) -> Uuid;
    fn code_of(model: &Self::Model) -> &str;
    fn new_row(name: String, code: String, now: DateTimeWithTimeZone) -> Self::ActiveModel;
    fn edit_row(
        model: Self::Model,
        name: String,
        code: String,
        now: DateTimeWithTimeZone,
    ) -> Self::ActiveModel;
}

impl CodedEntity for department::Entity {
    const LABEL: &'static str = "department";

    type ActiveModel = department::ActiveModel;

    fn id_column() -> department::Column {
        department::Column::Id
    }
    fn name_column() -> department::Column {
        department::Column::Name
    }
    fn code_column() -> department::Column {
        department::Column::Code
    }
    fn vehicle_column() -> vehicle::Column {
        vehicle::Column::DepartmentId
    }

    fn id_of(model: &department::Model) -> Uuid {
        model.id
    }
    fn code_of(model: &department::Model) -> &str {
        &model.code
    }

    fn new_row(name: String, code: String, now: DateTimeWithTimeZone) -> department::ActiveModel {
        department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            code: Set(code),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn edit_row(
        model: department::Model,
        name: String,
        code: String,
        now: DateTimeWithTimeZone,
    ) -> department::ActiveModel {
        let mut active: department::ActiveModel = model.into();
        active.name = Set(name);
        active.code = Set(code);
        active.updated_at = Set(now);
        active
    }
}

impl CodedEntity for region::Entity {
    const LABEL: &'static str = "region";

    type ActiveModel = region::ActiveModel;

    fn id_column() -> region::Column {
        region::Column::Id
    }
    fn name_column() -> region::Column {
        region::Column::Name
    }
    fn code_column() -> region::Column {
        region::Column::Code
    }
    fn vehicle_column() -> vehicle::Column {
        vehicle::Column::RegionId
    }

    fn id_of(model: &region::Model) -> Uuid {
        model.id
    }
    fn code_of(model: &region::Model) -> &str {
        &model.code
    }

    fn new_row(name: String, code: String, now: DateTimeWithTimeZone) -> region::ActiveModel {
        region::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            code: Set(code),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn edit_row(
        model: region::Model,
        name: String,
        code: String,
        now: DateTimeWithTimeZone,
    ) -> region::ActiveModel {
        let mut active: region::ActiveModel = model.into();
        active.name = Set(name);
        active.code = Set(code);
        active.updated_at = Set(now);
        active
    }
}

fn search_condition<C>(name: C, code: C, term: &str) -> Condition
where
    C: ColumnTrait,
{
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(name))).like(contains_pattern(term)))
        .add(Expr::expr(Func::lower(Expr::col(code))).like(contains_pattern(term)))
}

async fn list_coded<E, C>(
    conn: &C,
    search: Option<String>,
    order: ReferenceOrder,
) -> FleetResult<Vec<E::Model>>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    let mut query = E::find();
    if let Some(term) = sanitize_optional_filter(search) {
        query = query.filter(search_condition(E::name_column(), E::code_column(), &term));
    }
    query = match order {
        ReferenceOrder::Code => query.order_by_asc(E::code_column()),
        ReferenceOrder::Name => query
            .order_by_asc(E::name_column())
            .order_by_asc(E::code_column()),
    };
    Ok(query.all(conn).await?)
}

async fn get_coded<E, C>(conn: &C, id: Uuid) -> FleetResult<E::Model>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .one(conn)
        .await?
        .ok_or(FleetError::NotFound(E::LABEL))
}

async fn create_coded<E, C>(conn: &C, input: CodedInput) -> FleetResult<E::Model>
where
    E: CodedEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: Send,
    C: ConnectionTrait,
{
    let (name, code) = input.normalized()?;
    ensure_code_free::<E, C>(conn, &code, None).await?;
    let model = E::new_row(name, code, Utc::now().into()).insert(conn).await?;
    info!(
        entity = E::LABEL,
        id = %E::id_of(&model),
        code = %E::code_of(&model),
        "reference row created"
    );
    Ok(model)
}

async fn update_coded<E, C>(conn: &C, id: Uuid, input: CodedInput) -> FleetResult<E::Model>
where
    E: CodedEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: Send,
    C: ConnectionTrait,
{
    let (name, code) = input.normalized()?;
    let existing = get_coded::<E, C>(conn, id).await?;
    ensure_code_free::<E, C>(conn, &code, Some(id)).await?;
    Ok(E::edit_row(existing, name, code, Utc::now().into())
        .update(conn)
        .await?)
}

async fn delete_coded<E, C>(conn: &C, id: Uuid) -> FleetResult<()>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    let existing = get_coded::<E, C>(conn, id).await?;
    let in_use = vehicle::Entity::find()
        .filter(E::vehicle_column().eq(id))
        .count(conn)
        .await?;
    if in_use > 0 {
        return Err(FleetError::ReferenceInUse(format!(
            "{} {} still has {} vehicle(s) assigned",
            E::LABEL,
            E::code_of(&existing),
            in_use
        )));
    }
    E::delete_many()
        .filter(E::id_column().eq(id))
        .exec(conn)
        .await?;
    info!(entity = E::LABEL, %id, code = %E::code_of(&existing), "reference row deleted");
    Ok(())
}

async fn ensure_code_free<E, C>(conn: &C, code: &str, except: Option<Uuid>) -> FleetResult<()>
where
    E: CodedEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(E::code_column().eq(code));
    if let Some(id) = except {
        query = query.filter(E::id_column().ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(FleetError::validation(format!(
            "{} code {} is already in use",
            E::LABEL,
            code
        )));
    }
    Ok(())
}

// Departments

#[instrument(name = "fleet.departments.list", skip(conn))]
pub async fn list_departments<C>(
    conn: &C,
    search: Option<String>,
    order: ReferenceOrder,
) -> FleetResult<Vec<department::Model>>
where
    C: ConnectionTrait,
{
    list_coded::<department::Entity, C>(conn, search, order).await
}

pub async fn get_department<C>(conn: &C, id: Uuid) -> FleetResult<department::Model>
where
    C: ConnectionTrait,
{
    get_coded::<department::Entity, C>(conn, id).await
}

#[instrument(name = "fleet.departments.create", skip(conn))]
pub async fn create_department<C>(conn: &C, input: CodedInput) -> FleetResult<department::Model>
where
    C: ConnectionTrait,
{
    create_coded::<department::Entity, C>(conn, input).await
}

#[instrument(name = "fleet.departments.update", skip(conn))]
pub async fn update_department<C>(
    conn: &C,
    id: Uuid,
    input: CodedInput,
) -> FleetResult<department::Model>
where
    C: ConnectionTrait,
{
    update_coded::<department::Entity, C>(conn, id, input).await
}

#[instrument(name = "fleet.departments.delete", skip(conn))]
pub async fn delete_department<C>(conn: &C, id: Uuid) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    delete_coded::<department::Entity, C>(conn, id).await
}

// Regions

#[instrument(name = "fleet.regions.list", skip(conn))]
pub async fn list_regions<C>(
    conn: &C,
    search: Option<String>,
    order: ReferenceOrder,
) -> FleetResult<Vec<region::Model>>
where
    C: ConnectionTrait,
{
    list_coded::<region::Entity, C>(conn, search, order).await
}

pub async fn get_region<C>(conn: &C, id: Uuid) -> FleetResult<region::Model>
where
    C: ConnectionTrait,
{
    get_coded::<region::Entity, C>(conn, id).await
}

#[instrument(name = "fleet.regions.create", skip(conn))]
pub async fn create_region<C>(conn: &C, input: CodedInput) -> FleetResult<region::Model>
where
    C: ConnectionTrait,
{
    create_coded::<region::Entity, C>(conn, input).await
}

#[instrument(name = "fleet.regions.update", skip(conn))]
pub async fn update_region<C>(conn: &C, id: Uuid, input: CodedInput) -> FleetResult<region::Model>
where
    C: ConnectionTrait,
{
    update_coded::<region::Entity, C>(conn, id, input).await
}

#[instrument(name = "fleet.regions.delete", skip(conn))]
pub async fn delete_region<C>(conn: &C, id: Uuid) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    delete_coded::<region::Entity, C>(conn, id).await
}

// Vehicle models

#[instrument(name = "fleet.models.list", skip(conn))]
pub async fn list_vehicle_models<C>(conn: &C) -> FleetResult<Vec<vehicle_model::Model>>
where
    C: ConnectionTrait,
{
    Ok(vehicle_model::Entity::find()
        .order_by_asc(vehicle_model::Column::Name)
        .all(conn)
        .await?)
}

pub async fn get_vehicle_model<C>(conn: &C, id: Uuid) -> FleetResult<vehicle_model::Model>
where
    C: ConnectionTrait,
{
    vehicle_model::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(FleetError::NotFound("vehicle model"))
}

#[instrument(name = "fleet.models.create", skip(conn))]
pub async fn create_vehicle_model<C>(conn: &C, name: &str) -> FleetResult<vehicle_model::Model>
where
    C: ConnectionTrait,
{
    let name = required_text("name", name, MODEL_NAME_MAX)?;
    ensure_model_name_free(conn, &name, None).await?;
    let model = vehicle_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    info!(model_id = %model.id, name = %model.name, "vehicle model created");
    Ok(model)
}

#[instrument(name = "fleet.models.update", skip(conn))]
pub async fn update_vehicle_model<C>(
    conn: &C,
    id: Uuid,
    name: &str,
) -> FleetResult<vehicle_model::Model>
where
    C: ConnectionTrait,
{
    let name = required_text("name", name, MODEL_NAME_MAX)?;
    let existing = get_vehicle_model(conn, id).await?;
    ensure_model_name_free(conn, &name, Some(id)).await?;
    let mut active: vehicle_model::ActiveModel = existing.into();
    active.name = Set(name);
    Ok(active.update(conn).await?)
}

#[instrument(name = "fleet.models.delete", skip(conn))]
pub async fn delete_vehicle_model<C>(conn: &C, id: Uuid) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    let existing = get_vehicle_model(conn, id).await?;
    let in_use = vehicle::Entity::find()
        .filter(vehicle::Column::ModelId.eq(id))
        .count(conn)
        .await?;
    if in_use > 0 {
        return Err(FleetError::ReferenceInUse(format!(
            "vehicle model {} is used by {} vehicle(s)",
            existing.name, in_use
        )));
    }
    vehicle_model::Entity::delete_by_id(id).exec(conn).await?;
    info!(model_id = %id, "vehicle model deleted");
    Ok(())
}

async fn ensure_model_name_free<C>(conn: &C, name: &str, except: Option<Uuid>) -> FleetResult<()>
where
    C: ConnectionTrait,
{
    let mut query = vehicle_model::Entity::find().filter(vehicle_model::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(vehicle_model::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(FleetError::validation(format!(
            "vehicle model {} already exists",
            name
        )));
    }
    Ok(())
}
