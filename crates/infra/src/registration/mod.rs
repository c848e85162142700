//! Registration admission control and identity assignment.
//!
//! A registration attempt flows through [`AdmissionController::check_admission`],
//! then [`IdentityAssigner::assign_ids`] and
//! [`IdentityAssigner::assign_receipt_number`], and finally the store's unique
//! insert. [`RegistrationService`] wires the three together.

pub mod admission;
pub mod codes;
pub mod config;
pub mod error;
pub mod identity;
pub mod memory;
pub mod service;
pub mod store;

pub use admission::{Admission, AdmissionController, MAX_REGISTRATIONS_PER_USER};
pub use config::RegistrationConfig;
pub use error::{DenyReason, RegistrationError, StoreError, UniqueKey};
pub use identity::{IdResult, IdentityAssigner};
pub use memory::MemoryStore;
pub use service::{Actor, RegistrationRequest, RegistrationService};
pub use store::{RegistrationFilter, RegistrationStore, StatusUpdate};
