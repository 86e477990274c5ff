//! Supplier entity - organizations products are purchased from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the supplier in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Company name
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub name: String,
    pub contact: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Homepage URL or markup copied from the legacy data
    #[sea_orm(column_type = "Text", nullable)]
    pub homepage: Option<String>,
    /// Sales region the supplier is served from
    pub sales_region_id: Option<i64>,
}

/// Defines relationships between Supplier and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_region::Entity",
        from = "Column::SalesRegionId",
        to = "super::sales_region::Column::Id"
    )]
    SalesRegion,
}

impl Related<super::sales_region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRegion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
