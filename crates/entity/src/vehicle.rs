use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub prefix: String,
    #[sea_orm(unique)]
    pub plate: String,
    #[sea_orm(indexed)]
    pub model_id: Uuid,
    #[sea_orm(indexed)]
    pub department_id: Uuid,
    #[sea_orm(indexed)]
    pub region_id: Uuid,
    pub vehicle_type: VehicleType,
    pub segment: Segment,
    pub status: Status,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_model::Entity",
        from = "Column::ModelId",
        to = "super::vehicle_model::Column::Id",
        on_delete = "Restrict"
    )]
    VehicleModel,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Restrict"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id",
        on_delete = "Restrict"
    )]
    Region,
    #[sea_orm(has_one = "super::maintenance::Entity")]
    Maintenance,
    #[sea_orm(has_one = "super::unavailability::Entity")]
    Unavailability,
}

impl Related<super::vehicle_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleModel.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenance.def()
    }
}

impl Related<super::unavailability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unavailability.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum Status {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "IN_MAINTENANCE")]
    InMaintenance,
    #[sea_orm(string_value = "UNAVAILABLE")]
    Unavailable,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Available => "Disponível",
            Status::InMaintenance => "Em Manutenção",
            Status::Unavailable => "Indisponível",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum VehicleType {
    #[sea_orm(string_value = "LIGHT")]
    Light,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "HEAVY")]
    Heavy,
    #[sea_orm(string_value = "EQUIPMENT")]
    Equipment,
}

impl VehicleType {
    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Light => "Leve",
            VehicleType::Medium => "Médio",
            VehicleType::Heavy => "Pesado",
            VehicleType::Equipment => "Equipamento",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum Segment {
    #[sea_orm(string_value = "TRANSMISSION_LINE")]
    TransmissionLine,
    #[sea_orm(string_value = "SUBSTATION")]
    Substation,
    #[sea_orm(string_value = "NOT_APPLICABLE")]
    NotApplicable,
}

impl Segment {
    pub fn label(self) -> &'static str {
        match self {
            Segment::TransmissionLine => "Linha de Transmissão",
            Segment::Substation => "Subestação",
            Segment::NotApplicable => "Não se aplica",
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
