//! `stockroom-suppliers` — supplier records and input validation.

pub mod supplier;

pub use supplier::{NewSupplier, Supplier, SupplierUpdate};
