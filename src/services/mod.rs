pub mod populate;
pub mod upload_service;
pub mod user_service;

pub use upload_service::{StoredUpload, UploadError, UploadService};
pub use user_service::{UserService, UserServiceError};
