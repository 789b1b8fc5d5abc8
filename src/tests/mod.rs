use crate::gateway::sandbox::SandboxGateway;
use crate::logger::in_memory::InMemoryAuditLog;
use crate::service::PortalService;
use crate::store::in_memory::InMemoryStore;

mod campaign_tests;
mod payment_tests;

pub(crate) type TestPortal = PortalService<InMemoryStore, SandboxGateway, InMemoryAuditLog>;

/// Service over fresh in-memory backends, with handles kept so tests can
/// seed rows and settle payments behind the service's back.
pub(crate) fn portal() -> (TestPortal, InMemoryStore, SandboxGateway) {
    let _ = env_logger::try_init();
    let store = InMemoryStore::new();
    let gateway = SandboxGateway::new();
    let service = PortalService::new(store.clone(), gateway.clone(), InMemoryAuditLog::new());
    (service, store, gateway)
}
