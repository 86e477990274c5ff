//! Employee entity - staff who sell orders.
//!
//! Employees form a reporting hierarchy through the optional `supervisor_id`
//! self-reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the employee in the legacy Northwind dataset
    pub legacy_id: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub last_name: String,
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub first_name: String,
    /// Job title (e.g., "Sales Representative")
    pub title: Option<String>,
    /// Courtesy title (e.g., "Ms.")
    pub title_of_courtesy: Option<String>,
    pub birth_date: Option<Date>,
    pub hire_date: Option<Date>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    /// Phone extension
    pub extension: Option<String>,
    /// Photo file reference
    pub photo: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Employee this one reports to
    pub supervisor_id: Option<i64>,
    /// Region the employee works in
    pub sales_region_id: Option<i64>,
}

impl Model {
    /// Label used in pick lists: `"Last, First"`.
    #[must_use]
    pub fn list_label(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Label used when displaying a reference: `"First Last"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Reporting line to another employee
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::SupervisorId",
        to = "Column::Id"
    )]
    Supervisor,
    /// Each employee works in one sales region
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
