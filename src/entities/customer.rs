//! Customer entity - companies that place orders.
//!
//! Contact and address columns are free text with the legacy column widths.
//! Notes, customer types and orders reference customers by `id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Legacy Northwind customer code (e.g., "ALFKI")
    pub legacy_id: Option<String>,
    /// Company name
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub name: String,
    /// Contact person at the company
    pub contact: Option<String>,
    /// Job title of the contact person
    pub title: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Region or state
    pub region: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Email address, validated on write
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
