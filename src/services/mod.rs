//! Business rules behind the HTTP surface: supplier management with its
//! delete guard, inventory with the derived low-stock flag, CSV import,
//! and user accounts.

pub mod import;
pub mod inventory;
pub mod suppliers;
pub mod users;
