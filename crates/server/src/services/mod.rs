//! Domain services: slot admission control and role resolution.

pub mod roles;
pub mod slots;
