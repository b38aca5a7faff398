pub use sea_orm_migration::prelude::*;

mod m20251001_000001_reference_data;
mod m20251001_000002_vehicles;
mod m20251014_000003_vehicle_region;
mod m20251014_000004_admin_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_reference_data::Migration),
            Box::new(m20251001_000002_vehicles::Migration),
            Box::new(m20251014_000003_vehicle_region::Migration),
            Box::new(m20251014_000004_admin_user::Migration),
        ]
    }
}
