//! Order entity - a customer order header.
//!
//! Subtotal and total are not stored; they are derived from the order's lines by
//! [`crate::core::aggregator`] every time they are needed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the order in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Customer who placed the order
    pub customer_id: Option<i64>,
    /// Employee who sold the order
    pub employee_id: Option<i64>,
    /// Date the order was placed
    pub order_date: Option<Date>,
    /// Date the customer needs the order by
    pub required_date: Option<Date>,
    /// Date the order shipped, if it has
    pub shipped_date: Option<Date>,
    /// Carrier delivering the order
    pub shipper_id: Option<i64>,
    /// Freight charge added on top of the line subtotal
    #[sea_orm(column_type = "Decimal(Some((11, 2)))", nullable)]
    pub freight: Option<Decimal>,
    #[sea_orm(column_type = "String(StringLen::N(40))", nullable)]
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub ship_to_city: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(2))", nullable)]
    pub ship_to_state: Option<String>,
    pub ship_to_region: Option<String>,
    pub ship_to_postal_code: Option<String>,
    pub ship_to_country: Option<String>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order is placed by one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Each order is sold by one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Each order ships with one carrier
    #[sea_orm(
        belongs_to = "super::shipper::Entity",
        from = "Column::ShipperId",
        to = "super::shipper::Column::Id"
    )]
    Shipper,
    /// An order owns its lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::shipper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipper.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
