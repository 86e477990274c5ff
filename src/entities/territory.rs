//! Territory entity - a sales territory inside a sales region.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Territory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "territories")]
pub struct Model {
    /// Unique identifier for the territory
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the territory in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    /// Territory name (e.g., "Westboro")
    pub name: String,
    /// Region this territory belongs to
    pub sales_region_id: Option<i64>,
}

/// Defines relationships between Territory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each territory belongs to one sales region
    #[sea_orm(
        belongs_to = "super::sales_region::Entity",
        from = "Column::SalesRegionId",
        to = "super::sales_region::Column::Id"
    )]
    SalesRegion,
    #[sea_orm(has_many = "super::employee_territory::Entity")]
    EmployeeTerritory,
}

impl Related<super::sales_region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRegion.def()
    }
}

impl Related<super::employee_territory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeTerritory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
