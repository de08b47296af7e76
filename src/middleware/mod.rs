pub mod auth;
pub mod resolve_tenant;
pub mod resolve_user;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthClaims};
pub use resolve_tenant::{resolve_tenant_middleware, CurrentTenant};
pub use resolve_user::{resolve_user_middleware, CurrentUser};
pub use response::{ApiResponse, ApiResult};
