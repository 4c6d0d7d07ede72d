// Route handlers, one module per resource family.
// Generic CRUD lives in `crud`; resources with custom behavior get their own module.
pub mod admin_posts;
pub mod auth;
pub mod crud;
pub mod posts;
pub mod upload;
