mod config;
mod http;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use api::auth::AuthConfig;
use api::schema::{AppSchema, build_schema};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::http::AppState;

#[derive(Parser, Debug)]
#[command(name = "fleet-server", version, about = "Fleet registry server")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the HTTP server (applies pending migrations first)
    Serve {
        /// Overrides BIND
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run migrations
    Migrate {
        #[arg(value_enum, default_value_t = MigrateAction::Up)]
        action: MigrateAction,
    },
    /// Load demo departments, regions, models and vehicles
    Seed,
    /// Create an admin account, or reset its password
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
    /// Print GraphQL SDL
    PrintSchema,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MigrateAction {
    Up,
    Down,
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.log_filter, config.otlp_endpoint.as_deref())?;

    let result = run(cli, config).await;
    telemetry::shutdown_tracing();
    result
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let auth = Arc::new(config.auth.clone());

    match cli.cmd {
        Cmd::PrintSchema => println!("{}", schema_sdl(auth)),
        Cmd::Migrate { action } => {
            let db = connect(&config).await?;
            match action {
                MigrateAction::Up => Migrator::up(&db, None).await?,
                MigrateAction::Down => Migrator::down(&db, None).await?,
                MigrateAction::Reset => Migrator::reset(&db).await?,
            }
            info!(?action, "migrations finished");
        }
        Cmd::Seed => {
            let db = connect(&config).await?;
            let seeded = api::seed::seed_fleet_demo(&db)
                .await
                .context("seed data failed")?;
            info!(
                departments = seeded.departments.len(),
                regions = seeded.regions.len(),
                models = seeded.models.len(),
                vehicles = seeded.vehicles.len(),
                "seed complete"
            );
        }
        Cmd::CreateAdmin { username, password } => {
            let db = connect(&config).await?;
            let admin = api::auth::create_admin(&db, &username, &password)
                .await
                .context("failed to create admin")?;
            println!("admin {} ready ({})", admin.username, admin.id);
        }
        Cmd::Serve { bind } => {
            if config.uses_dev_secret() {
                warn!("AUTH_SECRET not set; using the development secret");
            }
            let db = Arc::new(connect(&config).await?);
            Migrator::up(db.as_ref(), None).await?;
            let AppSchema(schema) = build_schema(db.clone(), auth.clone());
            let state = AppState {
                schema,
                db,
                auth,
                cors_allowed_origins: Arc::new(config.cors_allowed_origins.clone()),
            };
            let bind = bind.unwrap_or(config.bind);
            let addr: SocketAddr = bind
                .parse()
                .with_context(|| format!("invalid bind address {}", bind))?;
            http::serve(addr, state).await?;
        }
    }
    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    Database::connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")
}

/// SDL generation never touches the database.
fn schema_sdl(auth: Arc<AuthConfig>) -> String {
    let AppSchema(schema) = build_schema(Arc::new(DatabaseConnection::Disconnected), auth);
    schema.sdl()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_prints_without_a_database() {
        let sdl = schema_sdl(Arc::new(AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 60,
        }));
        assert!(sdl.contains("type Vehicle"));
        assert!(sdl.contains("startMaintenance"));
        assert!(sdl.contains("enum ReferenceOrderBy"));
    }

    #[test]
    fn cli_parses_print_schema_and_migrate() {
        let cli = Cli::try_parse_from(["fleet-server", "print-schema"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::PrintSchema));
        let cli = Cli::try_parse_from(["fleet-server", "migrate", "reset"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Cmd::Migrate {
                action: MigrateAction::Reset
            }
        ));
    }
}
