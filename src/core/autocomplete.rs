//! Autocomplete suggestions for reference fields.
//!
//! A suggestion matches when any searchable text column contains the typed text,
//! or when the typed text is a number equal to the row id. Results are ordered by
//! label and capped at `limit`.

use crate::{
    core::paging::contains_text,
    entities::{Customer, Employee, Product, customer, employee, product},
    errors::Result,
};
use sea_orm::{Condition, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use tracing::instrument;

/// One entry of an autocomplete list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Id stored in the reference field when picked
    pub id: i64,
    /// Text shown in the list
    pub label: String,
}

/// Builds the match condition for `partial` over `text_columns` and `id_column`.
fn matching<C: ColumnTrait>(partial: &str, text_columns: &[C], id_column: C) -> Condition {
    let partial = partial.trim();
    let mut condition = Condition::any();
    for column in text_columns {
        condition = condition.add(contains_text(*column, partial));
    }
    if let Ok(id) = partial.parse::<i64>() {
        condition = condition.add(id_column.eq(id));
    }
    condition
}

/// Products for order-line entry.
#[instrument(skip(db))]
pub async fn suggest_products(
    db: &DatabaseConnection,
    partial: &str,
    limit: u64,
) -> Result<Vec<Suggestion>> {
    let products = Product::find()
        .filter(matching(
            partial,
            &[product::Column::Name, product::Column::QuantityPerUnit],
            product::Column::Id,
        ))
        .order_by_asc(product::Column::Name)
        .limit(limit)
        .all(db)
        .await?;

    Ok(products
        .into_iter()
        .map(|p| Suggestion {
            id: p.id,
            label: p.name,
        })
        .collect())
}

/// Customers for the order header.
#[instrument(skip(db))]
pub async fn suggest_customers(
    db: &DatabaseConnection,
    partial: &str,
    limit: u64,
) -> Result<Vec<Suggestion>> {
    let customers = Customer::find()
        .filter(matching(
            partial,
            &[customer::Column::Name, customer::Column::Contact],
            customer::Column::Id,
        ))
        .order_by_asc(customer::Column::Name)
        .limit(limit)
        .all(db)
        .await?;

    Ok(customers
        .into_iter()
        .map(|c| Suggestion {
            id: c.id,
            label: c.name,
        })
        .collect())
}

/// Employees, labelled `"Last, First"`.
#[instrument(skip(db))]
pub async fn suggest_employees(
    db: &DatabaseConnection,
    partial: &str,
    limit: u64,
) -> Result<Vec<Suggestion>> {
    let employees = Employee::find()
        .filter(matching(
            partial,
            &[employee::Column::LastName, employee::Column::FirstName],
            employee::Column::Id,
        ))
        .order_by_asc(employee::Column::LastName)
        .order_by_asc(employee::Column::FirstName)
        .limit(limit)
        .all(db)
        .await?;

    Ok(employees
        .into_iter()
        .map(|e| Suggestion {
            id: e.id,
            label: e.list_label(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_suggest_products_contains_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Chang", dec!(19.00)).await?;
        create_test_product(&db, "Chai", dec!(18.00)).await?;
        create_test_product(&db, "Aniseed Syrup", dec!(10.00)).await?;
        create_test_product(&db, "Chef Anton's Cajun Seasoning", dec!(22.00)).await?;

        let labels: Vec<String> = suggest_products(&db, "cha", 25)
            .await?
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, vec!["Chai", "Chang"]);

        let capped = suggest_products(&db, "", 2).await?;
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].label, "Aniseed Syrup");
        Ok(())
    }

    #[tokio::test]
    async fn test_wildcards_in_input_match_literally() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "100% Juice", dec!(4.50)).await?;
        create_test_product(&db, "Chai", dec!(18.00)).await?;
        create_test_product(&db, "Tofu", dec!(23.25)).await?;

        let percent = suggest_products(&db, "%", 25).await?;
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].label, "100% Juice");
        assert!(suggest_products(&db, "_", 25).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_numeric_input_matches_id() -> Result<()> {
        let db = setup_test_db().await?;
        let chai = create_test_product(&db, "Chai", dec!(18.00)).await?;
        create_test_product(&db, "Chang", dec!(19.00)).await?;

        let found = suggest_products(&db, &chai.id.to_string(), 25).await?;
        assert_eq!(
            found,
            vec![Suggestion {
                id: chai.id,
                label: "Chai".to_string()
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_suggest_customers_and_employees() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "Around the Horn").await?;
        create_test_customer(&db, "Bottom-Dollar Markets").await?;
        create_test_employee(&db, "Buchanan", "Steven").await?;
        create_test_employee(&db, "Suyama", "Michael").await?;

        let customers = suggest_customers(&db, "horn", 25).await?;
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].label, "Around the Horn");

        let employees = suggest_employees(&db, "STEV", 25).await?;
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].label, "Buchanan, Steven");

        assert!(suggest_employees(&db, "zzz", 25).await?.is_empty());
        Ok(())
    }
}
