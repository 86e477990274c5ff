//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs,
//! foreign keys included.

use crate::entities::{
    Category, Customer, CustomerCustomerType, CustomerNote, CustomerType, Employee,
    EmployeeTerritory, Order, OrderLine, Product, SalesRegion, Shipper, Supplier, Territory,
    customer_customer_type, employee_territory,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info, instrument};

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables, parents before children.
///
/// Existing tables are left untouched.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<()> {
    create_table(db, SalesRegion).await?;
    create_table(db, Territory).await?;
    create_table(db, Customer).await?;
    create_table(db, CustomerNote).await?;
    create_table(db, CustomerType).await?;
    create_table(db, CustomerCustomerType).await?;
    create_table(db, Shipper).await?;
    create_table(db, Supplier).await?;
    create_table(db, Category).await?;
    create_table(db, Product).await?;
    create_table(db, Employee).await?;
    create_table(db, EmployeeTerritory).await?;
    create_table(db, Order).await?;
    create_table(db, OrderLine).await?;
    create_link_indexes(db).await?;

    info!("Database tables ensured.");
    Ok(())
}

async fn create_table<C: ConnectionTrait, E: EntityTrait>(db: &C, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// A customer holds each type once and an employee covers each territory once.
async fn create_link_indexes<C: ConnectionTrait>(db: &C) -> Result<()> {
    let builder = db.get_database_backend();
    let statements = [
        Index::create()
            .name("idx_customer_customer_types_pair")
            .table(CustomerCustomerType)
            .col(customer_customer_type::Column::CustomerId)
            .col(customer_customer_type::Column::CustomerTypeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_employee_territories_pair")
            .table(EmployeeTerritory)
            .col(employee_territory::Column::EmployeeId)
            .col(employee_territory::Column::TerritoryId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];
    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{order, order_line};
    use crate::errors::Error;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<order::Model> = Order::find().limit(1).all(&db).await?;
        let _: Vec<order_line::Model> = OrderLine::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_link_pairs_are_unique_in_schema() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Around the Horn").await?;
        let retail = crate::core::lookup::create_customer_type(&db, "Retail").await?;
        let link = || customer_customer_type::ActiveModel {
            customer_id: Set(customer.id),
            customer_type_id: Set(retail.id),
            ..Default::default()
        };
        link().insert(&db).await?;
        let duplicate = link().insert(&db).await.map_err(Error::from);
        assert!(matches!(duplicate.unwrap_err(), Error::Database(_)));

        let employee = create_test_employee(&db, "Fuller", "Andrew").await?;
        let region = crate::core::lookup::create_sales_region(&db, "Eastern").await?;
        let territory =
            crate::core::lookup::create_territory(&db, "Westboro", Some(region.id)).await?;
        let cover = || employee_territory::ActiveModel {
            employee_id: Set(employee.id),
            territory_id: Set(territory.id),
            ..Default::default()
        };
        cover().insert(&db).await?;
        assert!(cover().insert(&db).await.is_err());
        Ok(())
    }
}
