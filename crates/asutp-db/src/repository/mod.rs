//! Repository layer — query functions organized by schema area.

pub mod archive;
pub mod catalog;
pub mod parameters;
pub mod security;
