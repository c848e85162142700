pub mod db;
pub mod models;
pub mod pagination;
pub mod registration;
pub mod repos;

pub use registration::{
    AdmissionController, IdentityAssigner, RegistrationConfig, RegistrationError,
    RegistrationService, RegistrationStore,
};
