#![allow(dead_code)]

use std::sync::Arc;

use api::auth::{AuthConfig, CurrentAdmin};
use api::fleet::reference::{self, CodedInput};
use api::fleet::{vehicles, VehicleInput};
use api::schema::{build_schema, AppSchema};
use async_graphql::{Request, Response, Schema, Variables};
use entity::{department, region, vehicle, vehicle_model};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use serde_json::Value;
use uuid::Uuid;

pub type FleetSchema =
    Schema<api::schema::QueryRoot, api::schema::MutationRoot, async_graphql::EmptySubscription>;

pub struct TestEnv {
    pub db: Arc<DatabaseConnection>,
    pub schema: FleetSchema,
    pub auth: Arc<AuthConfig>,
}

impl TestEnv {
    pub async fn sqlite() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        let db = Arc::new(conn);
        bootstrap_sqlite(db.as_ref()).await;
        let auth = Arc::new(AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 30,
        });
        let AppSchema(schema) = build_schema(db.clone(), auth.clone());
        Self { db, schema, auth }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    pub async fn anonymous(&self, query: &str, vars: Value) -> Response {
        self.schema
            .execute(Request::new(query).variables(Variables::from_json(vars)))
            .await
    }

    pub async fn as_admin(&self, query: &str, vars: Value) -> Response {
        let admin = CurrentAdmin {
            user_id: Uuid::new_v4(),
            username: "frota".into(),
        };
        self.schema
            .execute(
                Request::new(query)
                    .variables(Variables::from_json(vars))
                    .data(admin),
            )
            .await
    }
}

pub struct Fixture {
    pub department: department::Model,
    pub other_department: department::Model,
    pub region: region::Model,
    pub other_region: region::Model,
    pub model: vehicle_model::Model,
}

impl Fixture {
    pub async fn load(db: &DatabaseConnection) -> Self {
        Self {
            department: reference::create_department(db, CodedInput::new("Administração", "adm"))
                .await
                .unwrap(),
            other_department: reference::create_department(
                db,
                CodedInput::new("Operação", "ope"),
            )
            .await
            .unwrap(),
            region: reference::create_region(db, CodedInput::new("Rio de Janeiro", "rj"))
                .await
                .unwrap(),
            other_region: reference::create_region(db, CodedInput::new("São Paulo", "sp"))
                .await
                .unwrap(),
            model: reference::create_vehicle_model(db, "Fiat Strada")
                .await
                .unwrap(),
        }
    }

    pub fn vehicle_input(&self, prefix: &str, plate: &str) -> VehicleInput {
        VehicleInput {
            prefix: prefix.into(),
            plate: plate.into(),
            model_id: self.model.id,
            department_id: self.department.id,
            region_id: self.region.id,
            vehicle_type: vehicle::VehicleType::Light,
            segment: vehicle::Segment::NotApplicable,
        }
    }

    pub async fn vehicle(&self, db: &DatabaseConnection, prefix: &str, plate: &str) -> vehicle::Model {
        vehicles::create_vehicle(db, self.vehicle_input(prefix, plate))
            .await
            .unwrap()
    }
}

pub fn error_code(resp: &Response) -> Option<String> {
    let err = resp.errors.first()?;
    let code = err.extensions.as_ref()?.get("code")?;
    match code {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

pub async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    let tables = [
        r#"
        CREATE TABLE department (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE region (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE vehicle_model (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE vehicle (
            id TEXT PRIMARY KEY,
            prefix TEXT NOT NULL UNIQUE,
            plate TEXT NOT NULL UNIQUE,
            model_id TEXT NOT NULL,
            department_id TEXT NOT NULL,
            region_id TEXT NOT NULL,
            vehicle_type TEXT NOT NULL,
            segment TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(model_id) REFERENCES vehicle_model(id) ON DELETE RESTRICT,
            FOREIGN KEY(department_id) REFERENCES department(id) ON DELETE RESTRICT,
            FOREIGN KEY(region_id) REFERENCES region(id) ON DELETE RESTRICT
        );
        "#,
        r#"
        CREATE TABLE maintenance (
            id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL UNIQUE,
            services TEXT NOT NULL,
            workshop_name TEXT NOT NULL,
            workshop_city TEXT NOT NULL,
            entry_date TEXT NOT NULL,
            expected_exit_date TEXT,
            work_order_number TEXT NOT NULL,
            work_order_status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(vehicle_id) REFERENCES vehicle(id) ON DELETE CASCADE
        );
        "#,
        r#"
        CREATE TABLE unavailability (
            id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL UNIQUE,
            reason TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(vehicle_id) REFERENCES vehicle(id) ON DELETE CASCADE
        );
        "#,
        r#"
        CREATE TABLE last_update (
            id INTEGER PRIMARY KEY,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE admin_user (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_active BOOLEAN NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ];
    for ddl in tables {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, ddl))
            .await
            .unwrap();
    }
}
