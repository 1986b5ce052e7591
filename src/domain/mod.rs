//! Domain layer
//!
//! Entities and repository traits. Nothing here touches storage directly.

pub mod entities;
pub mod repositories;
