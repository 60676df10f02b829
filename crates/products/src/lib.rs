//! `stockroom-products` — product records, stock, and input validation.

pub mod product;

pub use product::{NewProduct, Product, ProductUpdate, ProductWithSuppliers};
