//! Request middleware.

pub mod auth;

pub use auth::{
    AuthUser, auth_middleware, require_admin, require_cashier, require_manager, require_student,
};
