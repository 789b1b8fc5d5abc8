pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod logger;
pub mod models;
pub mod service;
pub mod store;

pub use error::PortalError;
pub use gateway::sandbox::SandboxGateway;
pub use logger::in_memory::InMemoryAuditLog;
pub use service::PortalService;
pub use store::in_memory::InMemoryStore;

#[cfg(test)]
mod tests;
