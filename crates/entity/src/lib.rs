pub mod admin_user;
pub mod department;
pub mod last_update;
pub mod maintenance;
pub mod region;
pub mod unavailability;
pub mod vehicle;
pub mod vehicle_model;
