//! Model layer of the SSM dashboard: typed views over the SSM REST API that
//! poll for changes while a view scope is alive.

pub mod config;
pub mod controller;
pub mod locator;
pub mod models;
pub mod restapi;
pub mod scope;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use controller::{ResourceController, RuleController};
pub use locator::Locator;
pub use models::Models;
pub use scope::Scope;
pub use types::{DashboardError, DecodeError, DAG_DEATH_UNSPECIFIED};
