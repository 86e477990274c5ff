//! Product entity - items that can be sold on order lines.
//!
//! The product's `unit_price` is the current list price. Order lines copy it at the
//! time the line's product is set, so later price changes here do not alter existing
//! lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the product in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Name of the product (e.g., "Chai")
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub name: String,
    /// The organization where we purchase this product
    pub supplier_id: Option<i64>,
    /// Product category
    pub category_id: Option<i64>,
    /// Packaging description (e.g., "10 boxes x 20 bags")
    pub quantity_per_unit: Option<String>,
    /// Current list price
    #[sea_orm(column_type = "Decimal(Some((11, 2)))", nullable)]
    pub unit_price: Option<Decimal>,
    /// Units in stock
    pub in_stock: Option<i32>,
    /// Units on order from the supplier
    pub on_order: Option<i32>,
    /// Stock level that triggers a reorder
    pub reorder_level: Option<i32>,
    /// Discontinued products stay referenced by historical lines
    pub discontinued: bool,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product is bought from one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
