//! dsconfig-sync: declarative directory-server configuration
//!
//! A library for reconciling polymorphic configuration objects (cipher
//! stream providers, uncached attribute criteria) against a server's
//! REST configuration API.

pub mod config;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod state;
pub mod store;
