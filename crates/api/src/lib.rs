pub mod auth;
pub mod error;
pub mod fleet;
pub mod schema;
pub mod seed;

pub use error::{FleetError, FleetResult};
