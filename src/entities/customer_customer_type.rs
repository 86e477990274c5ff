//! Link table assigning customer types to customers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer/customer-type link model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_customer_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub legacy_id: Option<String>,
    pub customer_id: i64,
    pub customer_type_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::customer_type::Entity",
        from = "Column::CustomerTypeId",
        to = "super::customer_type::Column::Id"
    )]
    CustomerType,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::customer_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
