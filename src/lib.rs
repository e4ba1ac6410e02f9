//! dim: Data-file dependency manager
//!
//! Reconciles a user-declared manifest of remote data files (`dim.json`)
//! against a lock file of what was actually fetched (`dim-lock.json`),
//! downloading and preprocessing whatever is missing.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod preprocess;
pub mod reconcile;
pub mod store;
pub mod types;
