pub mod inventory;
pub mod supplier;
pub mod user;

pub use inventory::{
    CreateInventoryItem, InventoryItem, InventoryItemDetail, InventoryPatch, LowStockItem,
    NewInventoryItem,
};
pub use supplier::{
    ContactInfo, CreateSupplier, NewSupplier, Supplier, SupplierName, SupplierPatch,
    SupplierSummary,
};
pub use user::{
    CreateUserRequest, LoginRequest, LoginResponse, NewUser, RegisterRequest, Registration, Role,
    User,
};
