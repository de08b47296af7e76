pub mod apps_hub_service;
pub mod audit_service;
pub mod crud_service;
pub mod tenant_service;

pub use apps_hub_service::AppsHubService;
pub use audit_service::AuditService;
pub use crud_service::CrudService;
pub use tenant_service::{TenantError, TenantService};
