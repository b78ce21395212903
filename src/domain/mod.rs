//! Domain Layer
//!
//! Provisioning vocabulary and the outbound ports the application drives.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;
