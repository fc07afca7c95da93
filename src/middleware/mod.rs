pub mod permission;

pub use permission::{
    AdminOnly, AdminOrManager, CurrentUser, ADMIN_ONLY, ADMIN_OR_MANAGER, AUTH_COOKIE,
};
