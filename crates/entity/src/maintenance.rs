use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "maintenance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub vehicle_id: Uuid,
    pub services: String,
    pub workshop_name: String,
    pub workshop_city: String,
    pub entry_date: Date,
    pub expected_exit_date: Option<Date>,
    pub work_order_number: String,
    pub work_order_status: WorkOrderStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id",
        on_delete = "Cascade"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum WorkOrderStatus {
    #[sea_orm(string_value = "AWAITING_QUOTE")]
    AwaitingQuote,
    #[sea_orm(string_value = "AWAITING_APPROVAL")]
    AwaitingApproval,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "WARRANTY")]
    Warranty,
    #[sea_orm(string_value = "NOT_APPLICABLE")]
    NotApplicable,
}

impl WorkOrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            WorkOrderStatus::AwaitingQuote => "Aguardando Orçamento",
            WorkOrderStatus::AwaitingApproval => "Aguardando Aprovação",
            WorkOrderStatus::Approved => "Aprovado",
            WorkOrderStatus::Warranty => "Garantia",
            WorkOrderStatus::NotApplicable => "Não se aplica",
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
