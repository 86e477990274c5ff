//! Sales region entity - top-level geographic grouping for territories,
//! employees and suppliers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales region database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_regions")]
pub struct Model {
    /// Unique identifier for the region
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the region in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Region name (e.g., "Eastern")
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
