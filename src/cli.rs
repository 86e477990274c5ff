//! Command-line interface - argument parsing and command dispatch.
//!
//! Output goes to any [`Write`] so commands can be exercised in tests.

use crate::{
    config::{Settings, database::create_tables, settings::DEFAULT_CONFIG_PATH},
    core::{
        aggregator::{summarize, summarize_all},
        autocomplete::suggest_products,
        import::{import_all, open_legacy_source},
        money::format_money,
        order::{OrderFilter, search_orders},
        order_line::{LineChanges, lines_for_order, update_line},
        paging::Page,
        product::{ProductFilter, search_products},
    },
    errors::{Error, Result},
};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::{io::Write, path::PathBuf};
use tracing::info;

/// Northwind order administration
#[derive(Debug, Parser)]
#[command(name = "northwind-admin", version)]
pub struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the database schema
    Init,
    /// Replace the database contents with a legacy Northwind dataset
    Import {
        /// Legacy `SQLite` file; defaults to `legacy_source` from the settings
        path: Option<PathBuf>,
    },
    /// Show an order with its subtotal, total and lines
    Order {
        /// Order id
        id: i64,
    },
    /// List orders, newest first
    Orders {
        /// Filter by Customer id
        #[arg(long)]
        customer: Option<i64>,
        /// Filter by Employee id
        #[arg(long)]
        employee: Option<i64>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },
    /// List products by name
    Products {
        /// Filter by Supplier id
        #[arg(long)]
        supplier: Option<i64>,
        /// Filter by Category id
        #[arg(long)]
        category: Option<i64>,
        /// Filter by part of the product name
        #[arg(long)]
        name: Option<String>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
    },
    /// Suggest products matching partial input
    SuggestProducts {
        /// Text typed so far
        partial: String,
    },
    /// Point an order line at a product, capturing its current price
    SetLineProduct {
        /// Order line id
        line_id: i64,
        /// Product id
        product_id: i64,
    },
}

/// Converts a 1-based page option to a page request.
const fn page_request(page: u64, size: u64) -> Page {
    Page::new(page.saturating_sub(1), size)
}

/// Runs `command` against `db`, writing its report to `out`.
///
/// # Errors
/// Returns an error if the command fails or `out` cannot be written.
pub async fn execute<W: Write>(
    command: Command,
    db: &DatabaseConnection,
    settings: &Settings,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Init => {
            create_tables(db).await?;
            writeln!(out, "Schema ready")?;
        }
        Command::Import { path } => {
            let path = path
                .or_else(|| settings.legacy_source.clone())
                .ok_or_else(|| Error::Config {
                    message: "No legacy database given and no legacy_source configured"
                        .to_string(),
                })?;
            info!("Importing legacy data from {}", path.display());
            create_tables(db).await?;
            let source = open_legacy_source(&path).await?;
            let report = import_all(&source, db).await?;
            writeln!(out, "{report}")?;
        }
        Command::Order { id } => {
            let summary = summarize(db, id)
                .await?
                .ok_or_else(|| Error::not_found("Order", id))?;
            writeln!(out, "Order {}", summary.order.id)?;
            if let Some(date) = summary.order.order_date {
                writeln!(out, "Date      {date}")?;
            }
            for (line, product) in lines_for_order(db, id).await? {
                let name = product.map_or_else(|| "-".to_string(), |p| p.name);
                let price = line.unit_price.map_or_else(|| "-".to_string(), format_money);
                let quantity = line.quantity.unwrap_or_default();
                writeln!(out, "  {name:<40} {quantity:>5} x {price:>10}")?;
            }
            writeln!(out, "Subtotal  {}", format_money(summary.totals.subtotal))?;
            writeln!(
                out,
                "Freight   {}",
                format_money(summary.order.freight.unwrap_or_default())
            )?;
            writeln!(out, "Total     {}", format_money(summary.totals.total))?;
        }
        Command::Orders {
            customer,
            employee,
            page,
        } => {
            let filter = OrderFilter {
                customer_id: customer,
                employee_id: employee,
            };
            let request = page_request(page, settings.grid.order_rows_per_page);
            let orders = search_orders(db, filter, request).await?;
            let (total_items, total_pages) = (orders.total_items, orders.total_pages);
            for summary in summarize_all(db, orders.items).await? {
                let date = summary
                    .order
                    .order_date
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                writeln!(
                    out,
                    "{:>8}  {date:<10}  {:>10}  {:>10}",
                    summary.order.id,
                    format_money(summary.totals.subtotal),
                    format_money(summary.totals.total)
                )?;
            }
            writeln!(out, "page {page} of {total_pages} ({total_items} orders)")?;
        }
        Command::Products {
            supplier,
            category,
            name,
            page,
        } => {
            let filter = ProductFilter {
                supplier_id: supplier,
                category_id: category,
                name_contains: name,
            };
            let request = page_request(page, settings.grid.rows_per_page);
            let products = search_products(db, &filter, request).await?;
            for product in &products.items {
                let price = product
                    .unit_price
                    .map_or_else(|| "-".to_string(), format_money);
                writeln!(out, "{:>6}  {:<40} {price:>10}", product.id, product.name)?;
            }
            writeln!(
                out,
                "page {page} of {} ({} products)",
                products.total_pages, products.total_items
            )?;
        }
        Command::SuggestProducts { partial } => {
            let limit = settings.grid.autocomplete_limit;
            for suggestion in suggest_products(db, &partial, limit).await? {
                writeln!(out, "{:>6}  {}", suggestion.id, suggestion.label)?;
            }
        }
        Command::SetLineProduct {
            line_id,
            product_id,
        } => {
            let changes = LineChanges {
                product_id: Some(product_id),
                ..LineChanges::default()
            };
            let line = update_line(db, line_id, changes).await?;
            let price = line.unit_price.map_or_else(|| "-".to_string(), format_money);
            writeln!(out, "Line {} now sells product {product_id} at {price}", line.id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::order_line::add_line;
    use crate::core::product::update_product;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    async fn run(db: &DatabaseConnection, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("northwind-admin").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        execute(cli.command, db, &Settings::default(), &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_orders_filters() {
        let cli = Cli::try_parse_from([
            "northwind-admin",
            "orders",
            "--customer",
            "3",
            "--page",
            "2",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Orders {
                customer: Some(3),
                employee: None,
                page: 2
            }
        );
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_parse_rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["northwind-admin", "order", "ten"]).is_err());
    }

    #[test]
    fn test_parse_rejects_page_zero() {
        assert!(Cli::try_parse_from(["northwind-admin", "orders", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["northwind-admin", "products", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["northwind-admin", "products", "--page", "1"]).is_ok());
    }

    #[test]
    fn test_page_request_is_zero_based() {
        assert_eq!(page_request(1, 5), Page::new(0, 5));
        assert_eq!(page_request(3, 15), Page::new(2, 15));
    }

    #[tokio::test]
    async fn test_order_command_prints_totals() -> Result<()> {
        let (db, order) = setup_with_order(Some(dec!(5.25))).await?;
        let chai = create_test_product(&db, "Chai", dec!(18.00)).await?;
        add_line(&db, order.id, LineChanges::for_product(chai.id, 3)).await?;

        let output = run(&db, &["order", &order.id.to_string()]).await?;
        assert!(output.contains("Chai"));
        assert!(output.contains("Subtotal  54.00"));
        assert!(output.contains("Total     59.25"));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_command_missing_order() -> Result<()> {
        let db = setup_test_db().await?;
        let result = run(&db, &["order", "404"]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Order", id: 404 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_line_product_reprices_line() -> Result<()> {
        let (db, order) = setup_with_order(None).await?;
        let chai = create_test_product(&db, "Chai", dec!(18.00)).await?;
        let line = add_line(&db, order.id, LineChanges::for_product(chai.id, 2)).await?;
        update_product(&db, chai.id, product_form("Chai", dec!(7.50))).await?;

        let output = run(
            &db,
            &["set-line-product", &line.id.to_string(), &chai.id.to_string()],
        )
        .await?;
        assert!(output.contains("at 7.50"));

        let output = run(&db, &["orders"]).await?;
        assert!(output.contains("15.00"));
        assert!(output.contains("(1 orders)"));
        Ok(())
    }

    #[tokio::test]
    async fn test_products_and_suggestions() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Chai", dec!(18.00)).await?;
        create_test_product(&db, "Chang", dec!(19.00)).await?;
        create_test_product(&db, "Tofu", dec!(23.25)).await?;

        let output = run(&db, &["products", "--name", "ch"]).await?;
        assert!(output.contains("Chang"));
        assert!(!output.contains("Tofu"));
        assert!(output.contains("(2 products)"));

        let output = run(&db, &["suggest-products", "tof"]).await?;
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("Tofu"));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_without_source_is_config_error() -> Result<()> {
        let db = setup_test_db().await?;
        let result = run(&db, &["import"]).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        Ok(())
    }
}
