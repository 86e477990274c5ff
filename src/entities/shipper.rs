//! Shipper entity - carriers used to deliver orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipper database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shippers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub legacy_id: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
