//! Order line entity - one product entry within an order.
//!
//! `unit_price` is the price captured when the line's product was last set. It is
//! written by the pricing policy in [`crate::core::order_line`] and never follows the
//! product's current price on its own.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the line in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Order this line belongs to
    pub order_id: i64,
    /// Product sold on this line
    pub product_id: Option<i64>,
    /// Price per unit captured at time of sale
    #[sea_orm(column_type = "Decimal(Some((11, 2)))", nullable)]
    pub unit_price: Option<Decimal>,
    /// Number of units sold
    pub quantity: Option<i32>,
    /// Discount fraction, 0 when none was given
    #[sea_orm(column_type = "Decimal(Some((11, 2)))")]
    pub discount: Decimal,
}

/// Defines relationships between `OrderLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order and is removed with it
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each line sells one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
