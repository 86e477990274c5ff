//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, retrieving, updating, searching and
//! deleting products. A product's `unit_price` is its current list price; order lines
//! copy it through the pricing policy in [`crate::core::order_line`].

use crate::{
    core::{
        paging::{Page, Paged, contains_text, fetch_page},
        validate::{optional_text, required_text},
    },
    entities::{Category, Product, Supplier, category, product, supplier},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QueryTrait, Set, prelude::*, sea_query::Query};
use tracing::{info, instrument};

/// Editable fields of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub supplier_id: Option<i64>,
    pub category_id: Option<i64>,
    pub quantity_per_unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub in_stock: Option<i32>,
    pub on_order: Option<i32>,
    pub reorder_level: Option<i32>,
    pub discontinued: bool,
}

impl ProductForm {
    fn into_active_model(self, mut model: product::ActiveModel) -> Result<product::ActiveModel> {
        let name = required_text("name", &self.name, 40)?;

        if let Some(price) = self.unit_price {
            if price < Decimal::ZERO {
                return Err(Error::InvalidAmount { amount: price });
            }
        }

        model.name = Set(name);
        model.supplier_id = Set(self.supplier_id);
        model.category_id = Set(self.category_id);
        model.quantity_per_unit = Set(optional_text(self.quantity_per_unit.as_deref()));
        model.unit_price = Set(self.unit_price);
        model.in_stock = Set(self.in_stock);
        model.on_order = Set(self.on_order);
        model.reorder_level = Set(self.reorder_level);
        model.discontinued = Set(self.discontinued);
        Ok(model)
    }
}

/// Product search filters; unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Filter by Supplier
    pub supplier_id: Option<i64>,
    /// Filter by Category
    pub category_id: Option<i64>,
    /// Filter by Name (substring, case-insensitive)
    pub name_contains: Option<String>,
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or longer than 40 characters
/// - The price is negative
/// - The database insert operation fails
#[instrument(skip(db, form), fields(name = %form.name))]
pub async fn create_product(db: &DatabaseConnection, form: ProductForm) -> Result<product::Model> {
    let model = form.into_active_model(<product::ActiveModel as Default>::default())?;
    let product = model.insert(db).await?;
    info!("Created product {} ({})", product.name, product.id);
    Ok(product)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the editable fields of a product.
///
/// Lines already sold keep the price they captured.
///
/// # Errors
/// Returns an error if the form is invalid, the product does not exist, or the
/// update fails.
#[instrument(skip(db, form))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    form: ProductForm,
) -> Result<product::Model> {
    let existing: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?
        .into();

    let model = form.into_active_model(existing)?;
    model.update(db).await.map_err(Into::into)
}

/// Deletes a product.
///
/// # Errors
/// Returns an error if the product does not exist or is still referenced by order
/// lines.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Product", product_id));
    }
    info!("Deleted product {}", product_id);
    Ok(())
}

/// Lists products matching `filter`, ordered by name.
pub async fn search_products(
    db: &DatabaseConnection,
    filter: &ProductFilter,
    page: Page,
) -> Result<Paged<product::Model>> {
    let name = optional_text(filter.name_contains.as_deref());

    let select = Product::find()
        .apply_if(filter.supplier_id, |q, id| {
            q.filter(product::Column::SupplierId.eq(id))
        })
        .apply_if(filter.category_id, |q, id| {
            q.filter(product::Column::CategoryId.eq(id))
        })
        .apply_if(name, |q, name| q.filter(contains_text(product::Column::Name, &name)))
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id);

    fetch_page(db, select, page).await
}

/// Suppliers that supply at least one product, by name. Options for the supplier
/// filter.
pub async fn suppliers_with_products(db: &DatabaseConnection) -> Result<Vec<supplier::Model>> {
    let referenced = Query::select()
        .distinct()
        .column(product::Column::SupplierId)
        .from(product::Entity)
        .to_owned();

    Supplier::find()
        .filter(supplier::Column::Id.in_subquery(referenced))
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Categories holding at least one product, by name. Options for the category
/// filter.
pub async fn categories_with_products(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    let referenced = Query::select()
        .distinct()
        .column(product::Column::CategoryId)
        .from(product::Entity)
        .to_owned();

    Category::find()
        .filter(category::Column::Id.in_subquery(referenced))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::lookup::{create_category, create_supplier};
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = create_product(&db, product_form("", dec!(10.00))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        // Test whitespace-only name validation
        let result = create_product(&db, product_form("   ", dec!(10.00))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        // Test negative price validation
        let result = create_product(&db, product_form("Chai", dec!(-10.00))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == dec!(-10.00)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let form = ProductForm {
            quantity_per_unit: Some("10 boxes x 20 bags".to_string()),
            in_stock: Some(39),
            ..product_form("  Chai ", dec!(18.00))
        };
        let product = create_product(&db, form).await?;

        assert_eq!(product.name, "Chai");
        assert_eq!(product.unit_price, Some(dec!(18.00)));
        assert_eq!(product.in_stock, Some(39));
        assert!(!product.discontinued);

        let fetched = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(fetched, product);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Chai", dec!(18.00)).await?;

        let form = ProductForm {
            discontinued: true,
            ..product_form("Chai Tea", dec!(19.50))
        };
        let updated = update_product(&db, product.id, form).await?;
        assert_eq!(updated.name, "Chai Tea");
        assert_eq!(updated.unit_price, Some(dec!(19.50)));
        assert!(updated.discontinued);

        let result = update_product(&db, 999, product_form("X", dec!(1.00))).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Chai", dec!(18.00)).await?;

        delete_product(&db, product.id).await?;
        assert!(get_product_by_id(&db, product.id).await?.is_none());

        let result = delete_product(&db, product.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_products() -> Result<()> {
        let db = setup_test_db().await?;
        let exotic = create_supplier(&db, supplier_form("Exotic Liquids")).await?;
        let tokyo = create_supplier(&db, supplier_form("Tokyo Traders")).await?;
        let beverages = create_category(&db, "Beverages", None).await?;
        let produce = create_category(&db, "Produce", None).await?;

        for (name, supplier, category) in [
            ("Chang", exotic.id, beverages.id),
            ("Chai", exotic.id, beverages.id),
            ("Tofu", tokyo.id, produce.id),
            ("Aniseed Syrup", exotic.id, produce.id),
        ] {
            let form = ProductForm {
                supplier_id: Some(supplier),
                category_id: Some(category),
                ..product_form(name, dec!(10.00))
            };
            create_product(&db, form).await?;
        }

        let names = |paged: Paged<product::Model>| -> Vec<String> {
            paged.items.into_iter().map(|p| p.name).collect()
        };

        let all = search_products(&db, &ProductFilter::default(), Page::first(10)).await?;
        assert_eq!(names(all), vec!["Aniseed Syrup", "Chai", "Chang", "Tofu"]);

        let filter = ProductFilter {
            supplier_id: Some(exotic.id),
            category_id: Some(beverages.id),
            ..ProductFilter::default()
        };
        let found = search_products(&db, &filter, Page::first(10)).await?;
        assert_eq!(names(found), vec!["Chai", "Chang"]);

        let filter = ProductFilter {
            name_contains: Some("cha".to_string()),
            ..ProductFilter::default()
        };
        let found = search_products(&db, &filter, Page::first(10)).await?;
        assert_eq!(names(found), vec!["Chai", "Chang"]);

        let filter = ProductFilter {
            name_contains: Some("   ".to_string()),
            ..ProductFilter::default()
        };
        let found = search_products(&db, &filter, Page::first(10)).await?;
        assert_eq!(found.total_items, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_options() -> Result<()> {
        let db = setup_test_db().await?;
        let exotic = create_supplier(&db, supplier_form("Exotic Liquids")).await?;
        create_supplier(&db, supplier_form("Unused Supplier")).await?;
        let beverages = create_category(&db, "Beverages", None).await?;
        create_category(&db, "Seafood", None).await?;

        let form = ProductForm {
            supplier_id: Some(exotic.id),
            category_id: Some(beverages.id),
            ..product_form("Chai", dec!(18.00))
        };
        create_product(&db, form).await?;

        let suppliers = suppliers_with_products(&db).await?;
        assert_eq!(suppliers.len(), 1);
        assert_eq!(suppliers[0].id, exotic.id);

        let categories = categories_with_products(&db).await?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, beverages.id);
        Ok(())
    }
}
