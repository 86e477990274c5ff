//! Legacy import - copies a Northwind `SQLite` dataset into the admin schema.
//!
//! Tables are copied parents first so every legacy reference can be resolved to
//! the id the row received in the target. The legacy key of each copied row is
//! kept in its `legacy_id` column. The whole copy runs in one transaction: a
//! failure part way leaves the target untouched.

use crate::{
    core::money::round_money,
    entities::{
        Category, Customer, CustomerCustomerType, CustomerNote, Employee, EmployeeTerritory,
        Order, OrderLine, Product, SalesRegion, Shipper, Supplier, Territory, category, customer,
        employee, order, order_line, product, sales_region, shipper, supplier, territory,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use sea_orm::{
    ConnectionTrait, Database, DatabaseTransaction, QueryResult, Set, Statement,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::Serialize;
use std::{collections::HashMap, fmt, path::Path};
use tracing::{info, instrument, warn};

/// Rows copied per target table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub sales_regions: u64,
    pub territories: u64,
    pub categories: u64,
    pub shippers: u64,
    pub customers: u64,
    pub employees: u64,
    pub suppliers: u64,
    pub products: u64,
    pub orders: u64,
    pub order_lines: u64,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sales_regions  {:>8}", self.sales_regions)?;
        writeln!(f, "territories    {:>8}", self.territories)?;
        writeln!(f, "categories     {:>8}", self.categories)?;
        writeln!(f, "shippers       {:>8}", self.shippers)?;
        writeln!(f, "customers      {:>8}", self.customers)?;
        writeln!(f, "employees      {:>8}", self.employees)?;
        writeln!(f, "suppliers      {:>8}", self.suppliers)?;
        writeln!(f, "products       {:>8}", self.products)?;
        writeln!(f, "orders         {:>8}", self.orders)?;
        write!(f, "order_lines    {:>8}", self.order_lines)
    }
}

/// Legacy key to target id, per table.
#[derive(Debug, Default)]
struct IdMaps {
    sales_regions: HashMap<String, i64>,
    categories: HashMap<String, i64>,
    shippers: HashMap<String, i64>,
    customers: HashMap<String, i64>,
    employees: HashMap<String, i64>,
    suppliers: HashMap<String, i64>,
    products: HashMap<String, i64>,
    orders: HashMap<String, i64>,
}

fn resolve(map: &HashMap<String, i64>, key: Option<&String>) -> Option<i64> {
    key.and_then(|k| map.get(k)).copied()
}

/// Opens a legacy Northwind database read-only.
///
/// # Errors
/// Returns an import error if the file does not exist, or a database error if it
/// cannot be opened.
pub async fn open_legacy_source(path: &Path) -> Result<DatabaseConnection> {
    if !path.is_file() {
        return Err(Error::Import {
            message: format!("legacy database not found: {}", path.display()),
        });
    }
    let url = format!("sqlite://{}?mode=ro", path.display());
    Database::connect(&url).await.map_err(Into::into)
}

/// Replaces the contents of `target` with the legacy dataset in `source`.
///
/// # Errors
/// Returns an error if a legacy table is missing or unreadable, or a write to the
/// target fails. Nothing is written in that case.
#[instrument(skip_all)]
pub async fn import_all(
    source: &DatabaseConnection,
    target: &DatabaseConnection,
) -> Result<ImportReport> {
    let txn = target.begin().await?;
    clear_target(&txn).await?;

    let mut ids = IdMaps::default();
    let report = ImportReport {
        sales_regions: copy_regions(source, &txn, &mut ids).await?,
        territories: copy_territories(source, &txn, &ids).await?,
        categories: copy_categories(source, &txn, &mut ids).await?,
        shippers: copy_shippers(source, &txn, &mut ids).await?,
        customers: copy_customers(source, &txn, &mut ids).await?,
        employees: copy_employees(source, &txn, &mut ids).await?,
        suppliers: copy_suppliers(source, &txn, &mut ids).await?,
        products: copy_products(source, &txn, &mut ids).await?,
        orders: copy_orders(source, &txn, &mut ids).await?,
        order_lines: copy_order_lines(source, &txn, &ids).await?,
    };

    txn.commit().await?;
    info!(?report, "Legacy import complete");
    Ok(report)
}

/// Deletes every row of the target, children first.
async fn clear_target(txn: &DatabaseTransaction) -> Result<()> {
    OrderLine::delete_many().exec(txn).await?;
    Order::delete_many().exec(txn).await?;
    Product::delete_many().exec(txn).await?;
    Supplier::delete_many().exec(txn).await?;
    EmployeeTerritory::delete_many().exec(txn).await?;
    Employee::update_many()
        .col_expr(employee::Column::SupervisorId, Expr::value(Option::<i64>::None))
        .exec(txn)
        .await?;
    Employee::delete_many().exec(txn).await?;
    CustomerCustomerType::delete_many().exec(txn).await?;
    CustomerNote::delete_many().exec(txn).await?;
    Customer::delete_many().exec(txn).await?;
    Shipper::delete_many().exec(txn).await?;
    Category::delete_many().exec(txn).await?;
    Territory::delete_many().exec(txn).await?;
    SalesRegion::delete_many().exec(txn).await?;
    Ok(())
}

async fn legacy_rows(source: &DatabaseConnection, sql: &str) -> Result<Vec<QueryResult>> {
    let statement = Statement::from_string(source.get_database_backend(), sql);
    source.query_all(statement).await.map_err(|e| Error::Import {
        message: format!("reading legacy data failed ({sql}): {e}"),
    })
}

// ---------------------------------------------------------------------------
// Column readers. Legacy columns are loosely typed, so each reader accepts the
// storage classes the Northwind files actually use.
// ---------------------------------------------------------------------------

fn text(row: &QueryResult, column: &str) -> Result<Option<String>> {
    if let Ok(value) = row.try_get::<Option<String>>("", column) {
        return Ok(value);
    }
    let value: Option<i64> = row.try_get("", column)?;
    Ok(value.map(|v| v.to_string()))
}

fn key(row: &QueryResult) -> Result<String> {
    text(row, "id")?.ok_or_else(|| Error::Import {
        message: "legacy row without an id".to_string(),
    })
}

fn whole(row: &QueryResult, column: &str) -> Result<Option<i32>> {
    let Some(value) = row.try_get::<Option<i64>>("", column)? else {
        return Ok(None);
    };
    let converted = i32::try_from(value).ok();
    if converted.is_none() {
        warn!(column, value, "Legacy number out of range, stored as empty");
    }
    Ok(converted)
}

#[allow(clippy::cast_precision_loss)]
fn money(row: &QueryResult, column: &str) -> Result<Option<Decimal>> {
    let value = match row.try_get::<Option<f64>>("", column) {
        Ok(value) => value,
        Err(_) => row.try_get::<Option<i64>>("", column)?.map(|v| v as f64),
    };
    Ok(value.and_then(Decimal::from_f64).map(round_money))
}

fn date(row: &QueryResult, column: &str) -> Result<Option<Date>> {
    let Some(raw) = text(row, column)? else {
        return Ok(None);
    };
    let parsed = raw
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
    if parsed.is_none() {
        warn!(column, value = %raw, "Unreadable legacy date, stored as empty");
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Table copies
// ---------------------------------------------------------------------------

async fn copy_regions(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let mut copied = 0;
    for row in legacy_rows(source, "SELECT id, regionDescription FROM region").await? {
        let legacy = key(&row)?;
        let model = sales_region::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "regionDescription")?.unwrap_or_default().trim().to_string()),
            ..Default::default()
        };
        let id = SalesRegion::insert(model).exec(txn).await?.last_insert_id;
        ids.sales_regions.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

async fn copy_territories(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, territoryDescription, regionId FROM territory";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let region_key = text(&row, "regionId")?;
        let Some(sales_region_id) = resolve(&ids.sales_regions, region_key.as_ref()) else {
            warn!(territory = %legacy, region = ?region_key, "Skipping territory with unknown region");
            continue;
        };
        let model = territory::ActiveModel {
            legacy_id: Set(Some(legacy)),
            name: Set(text(&row, "territoryDescription")?.unwrap_or_default().trim().to_string()),
            sales_region_id: Set(Some(sales_region_id)),
            ..Default::default()
        };
        Territory::insert(model).exec(txn).await?;
        copied += 1;
    }
    Ok(copied)
}

async fn copy_categories(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, categoryName, description FROM category";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = category::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "categoryName")?.unwrap_or_default()),
            description: Set(text(&row, "description")?),
            picture: Set(None),
            ..Default::default()
        };
        let id = Category::insert(model).exec(txn).await?.last_insert_id;
        ids.categories.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

async fn copy_shippers(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let mut copied = 0;
    for row in legacy_rows(source, "SELECT id, companyName, phone FROM shipper").await? {
        let legacy = key(&row)?;
        let model = shipper::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "companyName")?.unwrap_or_default()),
            phone: Set(text(&row, "phone")?),
            ..Default::default()
        };
        let id = Shipper::insert(model).exec(txn).await?.last_insert_id;
        ids.shippers.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

async fn copy_customers(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, companyName, contactName, contactTitle, address, city, region, \
               postalCode, country, phone FROM customer";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = customer::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "companyName")?.unwrap_or_default()),
            contact: Set(text(&row, "contactName")?),
            title: Set(text(&row, "contactTitle")?),
            address: Set(text(&row, "address")?),
            city: Set(text(&row, "city")?),
            region: Set(text(&row, "region")?),
            postal_code: Set(text(&row, "postalCode")?),
            country: Set(text(&row, "country")?),
            phone: Set(text(&row, "phone")?),
            email: Set(None),
            ..Default::default()
        };
        let id = Customer::insert(model).exec(txn).await?.last_insert_id;
        ids.customers.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

/// Copies employees, then links each to its supervisor once every employee has
/// a target id.
async fn copy_employees(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, lastName, firstName, title, titleOfCourtesy, birthDate, hireDate, \
               address, city, region, postalCode, country, homePhone, extension, notes, \
               reportsTo FROM employee";
    let mut copied = 0;
    let mut reports_to = Vec::new();
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = employee::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            last_name: Set(text(&row, "lastName")?.unwrap_or_default()),
            first_name: Set(text(&row, "firstName")?.unwrap_or_default()),
            title: Set(text(&row, "title")?),
            title_of_courtesy: Set(text(&row, "titleOfCourtesy")?),
            birth_date: Set(date(&row, "birthDate")?),
            hire_date: Set(date(&row, "hireDate")?),
            address: Set(text(&row, "address")?),
            city: Set(text(&row, "city")?),
            region: Set(text(&row, "region")?),
            postal_code: Set(text(&row, "postalCode")?),
            country: Set(text(&row, "country")?),
            phone: Set(text(&row, "homePhone")?),
            extension: Set(text(&row, "extension")?),
            photo: Set(None),
            notes: Set(text(&row, "notes")?),
            supervisor_id: Set(None),
            sales_region_id: Set(None),
            ..Default::default()
        };
        let id = Employee::insert(model).exec(txn).await?.last_insert_id;
        ids.employees.insert(legacy, id);
        if let Some(supervisor) = text(&row, "reportsTo")? {
            reports_to.push((id, supervisor));
        }
        copied += 1;
    }

    for (employee_id, supervisor) in reports_to {
        let Some(supervisor_id) = ids.employees.get(&supervisor).copied() else {
            warn!(employee_id, supervisor = %supervisor, "Unknown legacy supervisor");
            continue;
        };
        Employee::update_many()
            .col_expr(employee::Column::SupervisorId, Expr::value(supervisor_id))
            .filter(employee::Column::Id.eq(employee_id))
            .exec(txn)
            .await?;
    }
    Ok(copied)
}

async fn copy_suppliers(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, companyName, contactName, contactTitle, address, city, region, \
               postalCode, country, phone, homePage FROM supplier";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = supplier::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "companyName")?.unwrap_or_default()),
            contact: Set(text(&row, "contactName")?),
            title: Set(text(&row, "contactTitle")?),
            address: Set(text(&row, "address")?),
            city: Set(text(&row, "city")?),
            region: Set(text(&row, "region")?),
            postal_code: Set(text(&row, "postalCode")?),
            country: Set(text(&row, "country")?),
            phone: Set(text(&row, "phone")?),
            email: Set(None),
            homepage: Set(text(&row, "homePage")?),
            sales_region_id: Set(None),
            ..Default::default()
        };
        let id = Supplier::insert(model).exec(txn).await?.last_insert_id;
        ids.suppliers.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

async fn copy_products(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, productName, supplierId, categoryId, quantityPerUnit, unitPrice, \
               unitsInStock, unitsOnOrder, reorderLevel, discontinued FROM product";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = product::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            name: Set(text(&row, "productName")?.unwrap_or_default()),
            supplier_id: Set(resolve(&ids.suppliers, text(&row, "supplierId")?.as_ref())),
            category_id: Set(resolve(&ids.categories, text(&row, "categoryId")?.as_ref())),
            quantity_per_unit: Set(text(&row, "quantityPerUnit")?),
            unit_price: Set(money(&row, "unitPrice")?),
            in_stock: Set(whole(&row, "unitsInStock")?),
            on_order: Set(whole(&row, "unitsOnOrder")?),
            reorder_level: Set(whole(&row, "reorderLevel")?),
            discontinued: Set(whole(&row, "discontinued")?.unwrap_or(0) != 0),
            ..Default::default()
        };
        let id = Product::insert(model).exec(txn).await?.last_insert_id;
        ids.products.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

async fn copy_orders(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &mut IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, customerId, employeeId, orderDate, requiredDate, shippedDate, shipVia, \
               freight, shipName, shipAddress, shipCity, shipRegion, shipPostalCode, shipCountry \
               FROM `order`";
    let mut copied = 0;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let model = order::ActiveModel {
            legacy_id: Set(Some(legacy.clone())),
            customer_id: Set(resolve(&ids.customers, text(&row, "customerId")?.as_ref())),
            employee_id: Set(resolve(&ids.employees, text(&row, "employeeId")?.as_ref())),
            order_date: Set(date(&row, "orderDate")?),
            required_date: Set(date(&row, "requiredDate")?),
            shipped_date: Set(date(&row, "shippedDate")?),
            shipper_id: Set(resolve(&ids.shippers, text(&row, "shipVia")?.as_ref())),
            freight: Set(money(&row, "freight")?),
            ship_to_name: Set(text(&row, "shipName")?),
            ship_to_address: Set(text(&row, "shipAddress")?),
            ship_to_city: Set(text(&row, "shipCity")?),
            ship_to_state: Set(None),
            ship_to_region: Set(text(&row, "shipRegion")?),
            ship_to_postal_code: Set(text(&row, "shipPostalCode")?),
            ship_to_country: Set(text(&row, "shipCountry")?),
            ..Default::default()
        };
        let id = Order::insert(model).exec(txn).await?.last_insert_id;
        ids.orders.insert(legacy, id);
        copied += 1;
    }
    Ok(copied)
}

/// Copies order details with their legacy prices; the line pricing policy is not
/// applied to the bulk copy.
async fn copy_order_lines(
    source: &DatabaseConnection,
    txn: &DatabaseTransaction,
    ids: &IdMaps,
) -> Result<u64> {
    let sql = "SELECT id, orderId, productId, unitPrice, quantity, discount FROM orderDetail";
    let mut copied = 0;
    let mut skipped = 0_u64;
    for row in legacy_rows(source, sql).await? {
        let legacy = key(&row)?;
        let Some(order_id) = resolve(&ids.orders, text(&row, "orderId")?.as_ref()) else {
            skipped += 1;
            continue;
        };
        let model = order_line::ActiveModel {
            legacy_id: Set(Some(legacy)),
            order_id: Set(order_id),
            product_id: Set(resolve(&ids.products, text(&row, "productId")?.as_ref())),
            unit_price: Set(money(&row, "unitPrice")?),
            quantity: Set(whole(&row, "quantity")?),
            discount: Set(money(&row, "discount")?.unwrap_or(Decimal::ZERO)),
            ..Default::default()
        };
        OrderLine::insert(model).exec(txn).await?;
        copied += 1;
    }
    if skipped > 0 {
        warn!(skipped, "Skipped order details with unknown orders");
    }
    Ok(copied)
}
