pub mod admin;
pub mod auth;
pub mod response;
pub mod transaction;

pub use admin::admin_middleware;
pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use transaction::transaction_middleware;
