//! Products domain module.
//!
//! This crate contains the product entity and the shapes used to create and
//! partially update it, implemented as plain domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product, ProductPatch};
