mod provisioning_service;

pub use provisioning_service::{DomainProvisioner, DEFAULT_STEP_TIMEOUT};
