//! Customer type entity - classification labels assignable to customers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub legacy_id: Option<String>,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_customer_type::Entity")]
    CustomerCustomerType,
}

impl Related<super::customer_customer_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerCustomerType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
