//! RotoWorks: shop-floor rotor inspection workscopes
//!
//! Builds measurement scopes for a CMM from a project's machine catalog
//! entry and stage scope, and documents the results in a CAD layout.

pub mod cli;
pub mod core;
pub mod doc;
pub mod entities;
pub mod logging;
pub mod session;
