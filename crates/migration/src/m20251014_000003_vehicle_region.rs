use sea_orm_migration::prelude::*;

// Vehicles registered before regions existed are parked in a placeholder region
// so the column can be made NOT NULL.
const UP_SQL: &str = r#"
ALTER TABLE vehicle ADD COLUMN IF NOT EXISTS region_id uuid NULL;

INSERT INTO region (id, name, code)
SELECT gen_random_uuid(), 'Sem região', 'NA'
WHERE EXISTS (SELECT 1 FROM vehicle WHERE region_id IS NULL)
ON CONFLICT (code) DO NOTHING;

UPDATE vehicle
SET region_id = (SELECT id FROM region WHERE code = 'NA')
WHERE region_id IS NULL;

ALTER TABLE vehicle ALTER COLUMN region_id SET NOT NULL;

ALTER TABLE vehicle
    ADD CONSTRAINT fk_vehicle_region FOREIGN KEY (region_id)
    REFERENCES region(id) ON DELETE RESTRICT ON UPDATE CASCADE;

CREATE INDEX IF NOT EXISTS idx_vehicle_region ON vehicle(region_id);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_vehicle_region;
ALTER TABLE vehicle DROP CONSTRAINT IF EXISTS fk_vehicle_region;
ALTER TABLE vehicle DROP COLUMN IF EXISTS region_id;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
