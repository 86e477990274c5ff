//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod customer;
pub mod customer_customer_type;
pub mod customer_note;
pub mod customer_type;
pub mod employee;
pub mod employee_territory;
pub mod order;
pub mod order_line;
pub mod product;
pub mod sales_region;
pub mod shipper;
pub mod supplier;
pub mod territory;

// Re-export specific types to avoid conflicts
pub use category::Entity as Category;
pub use customer::Entity as Customer;
pub use customer_customer_type::Entity as CustomerCustomerType;
pub use customer_note::Entity as CustomerNote;
pub use customer_type::Entity as CustomerType;
pub use employee::Entity as Employee;
pub use employee_territory::Entity as EmployeeTerritory;
pub use order::Entity as Order;
pub use order_line::Entity as OrderLine;
pub use product::Entity as Product;
pub use sales_region::Entity as SalesRegion;
pub use shipper::Entity as Shipper;
pub use supplier::Entity as Supplier;
pub use territory::Entity as Territory;
