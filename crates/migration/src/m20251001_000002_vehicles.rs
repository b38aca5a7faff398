use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Vehicle {
    Table,
    Id,
    Prefix,
    Plate,
    ModelId,
    DepartmentId,
    VehicleType,
    Segment,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Maintenance {
    Table,
    Id,
    VehicleId,
    Services,
    WorkshopName,
    WorkshopCity,
    EntryDate,
    ExpectedExitDate,
    WorkOrderNumber,
    WorkOrderStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Unavailability {
    Table,
    Id,
    VehicleId,
    Reason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LastUpdate {
    Table,
    Id,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum VehicleModel {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicle::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(Vehicle::Prefix)
                            .string_len(6)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicle::Plate)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vehicle::ModelId).uuid().not_null())
                    .col(ColumnDef::new(Vehicle::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(Vehicle::VehicleType).string_len(32).not_null())
                    .col(ColumnDef::new(Vehicle::Segment).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Vehicle::Status)
                            .string_len(32)
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(Vehicle::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Vehicle::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_model")
                            .from(Vehicle::Table, Vehicle::ModelId)
                            .to(VehicleModel::Table, VehicleModel::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_department")
                            .from(Vehicle::Table, Vehicle::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_vehicle_model", Vehicle::ModelId),
            ("idx_vehicle_department", Vehicle::DepartmentId),
            ("idx_vehicle_status", Vehicle::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Vehicle::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Maintenance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Maintenance::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(Maintenance::VehicleId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Maintenance::Services).text().not_null())
                    .col(
                        ColumnDef::new(Maintenance::WorkshopName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Maintenance::WorkshopCity)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Maintenance::EntryDate)
                            .date()
                            .not_null()
                            .default(Expr::cust("CURRENT_DATE")),
                    )
                    .col(ColumnDef::new(Maintenance::ExpectedExitDate).date())
                    .col(
                        ColumnDef::new(Maintenance::WorkOrderNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Maintenance::WorkOrderStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Maintenance::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Maintenance::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_vehicle")
                            .from(Maintenance::Table, Maintenance::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Unavailability::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Unavailability::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(Unavailability::VehicleId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Unavailability::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Unavailability::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Unavailability::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_unavailability_vehicle")
                            .from(Unavailability::Table, Unavailability::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LastUpdate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LastUpdate::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LastUpdate::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LastUpdate::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Unavailability::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Maintenance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}
