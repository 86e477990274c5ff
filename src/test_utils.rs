//! Shared test utilities for `northwind-admin`.
//!
//! Helpers for setting up in-memory databases, seeding records with sensible
//! defaults, and an in-memory store for testing aggregation without a database.

use crate::{
    core::{
        aggregator::{OrderLedger, PriceList},
        customer::{self, CustomerForm},
        employee::{self, EmployeeForm},
        lookup::SupplierForm,
        money::LineAmount,
        order::{self, OrderForm},
        product::{self, ProductForm},
    },
    entities,
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

/// Installs a test-writer tracing subscriber once per test binary.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A product form with only a name and price.
pub fn product_form(name: &str, unit_price: Decimal) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        unit_price: Some(unit_price),
        ..ProductForm::default()
    }
}

/// A supplier form with only a name.
pub fn supplier_form(name: &str) -> SupplierForm {
    SupplierForm {
        name: name.to_string(),
        ..SupplierForm::default()
    }
}

/// Creates a product with no supplier or category.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    unit_price: Decimal,
) -> Result<entities::product::Model> {
    product::create_product(db, product_form(name, unit_price)).await
}

/// Creates a customer with only a company name.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(db, CustomerForm::named(name)).await
}

/// Creates an employee with only names.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    last_name: &str,
    first_name: &str,
) -> Result<entities::employee::Model> {
    employee::create_employee(db, EmployeeForm::named(last_name, first_name)).await
}

/// Sets up a database holding one order for a test customer and employee.
/// Returns (db, order) for line and aggregation tests.
pub async fn setup_with_order(
    freight: Option<Decimal>,
) -> Result<(DatabaseConnection, entities::order::Model)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "Test Customer").await?;
    let employee = create_test_employee(&db, "Test", "Employee").await?;
    let order = order::create_order(
        &db,
        OrderForm {
            customer_id: Some(customer.id),
            employee_id: Some(employee.id),
            freight,
            ..OrderForm::default()
        },
    )
    .await?;
    Ok((db, order))
}

/// In-memory [`OrderLedger`] and [`PriceList`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lines: Vec<(i64, LineAmount)>,
    freight: HashMap<i64, Decimal>,
    prices: HashMap<i64, Decimal>,
}

impl MemoryStore {
    /// Adds a line to `order_id`.
    #[must_use]
    pub fn with_line(mut self, order_id: i64, unit_price: Decimal, quantity: Decimal) -> Self {
        self.lines.push((order_id, LineAmount::new(unit_price, quantity)));
        self
    }

    /// Sets the freight of `order_id`.
    #[must_use]
    pub fn with_freight(mut self, order_id: i64, freight: Decimal) -> Self {
        self.freight.insert(order_id, freight);
        self
    }

    /// Sets the current price of `product_id`.
    #[must_use]
    pub fn with_price(mut self, product_id: i64, price: Decimal) -> Self {
        self.prices.insert(product_id, price);
        self
    }
}

impl OrderLedger for MemoryStore {
    async fn order_lines(&self, order_id: i64) -> Result<Vec<LineAmount>> {
        Ok(self
            .lines
            .iter()
            .filter(|(order, _)| *order == order_id)
            .map(|(_, line)| *line)
            .collect())
    }

    async fn freight(&self, order_id: i64) -> Result<Option<Decimal>> {
        Ok(self.freight.get(&order_id).copied())
    }
}

impl PriceList for MemoryStore {
    async fn product_price(&self, product_id: i64) -> Result<Option<Decimal>> {
        Ok(self.prices.get(&product_id).copied())
    }
}
