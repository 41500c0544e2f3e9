//! Domain layer
//!
//! One submodule per business module. Modules reference each other's
//! aggregates by identity only and validate those references through the
//! lookup traits exported from each module's API.

pub mod identity;
pub mod issues;
pub mod teams;
pub mod users;

pub(crate) mod validation;
