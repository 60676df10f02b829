//! `stockroom-orders` — orders, order lines, and placement validation.

pub mod order;

pub use order::{
    Order, OrderDraft, OrderItem, OrderLine, OrderRecipient, OrderUpdate,
};
