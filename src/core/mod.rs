//! Core business logic, independent of any user interface.
//!
//! Functions take a `SeaORM` connection and return [`crate::errors::Result`], so
//! they can back the CLI, a web frontend or tests alike.

pub mod aggregator;
pub mod autocomplete;
pub mod customer;
pub mod employee;
pub mod import;
pub mod lookup;
pub mod money;
pub mod order;
pub mod order_line;
pub mod paging;
pub mod product;
pub mod validate;
