//! Order line business logic - line entry with the copy-then-freeze pricing policy.
//!
//! Whenever an insert or edit request carries a product reference, the line's unit
//! price is replaced with that product's current price before the row is written,
//! whatever price the request itself supplied. The price is a snapshot: changing the
//! product's price later does not touch existing lines until a line is saved with a
//! product again. If the product cannot be priced the request's price (or the stored
//! one) is kept, never zeroed.

use crate::{
    core::aggregator::{PriceList, SeaOrmStore},
    entities::{Order, OrderLine, Product, order_line, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Fields of a line insert or edit request.
///
/// `None` leaves a field as it is on update, or unset on insert (discount defaults
/// to zero).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineChanges {
    /// Product being sold; presence triggers the pricing policy
    pub product_id: Option<i64>,
    /// Unit price supplied by the request
    pub unit_price: Option<Decimal>,
    /// Units sold
    pub quantity: Option<i32>,
    /// Discount fraction in `[0, 1]`
    pub discount: Option<Decimal>,
}

impl LineChanges {
    /// A request selling `quantity` units of `product_id`.
    #[must_use]
    pub const fn for_product(product_id: i64, quantity: i32) -> Self {
        Self {
            product_id: Some(product_id),
            unit_price: None,
            quantity: Some(quantity),
            discount: None,
        }
    }

    /// A request changing only the quantity.
    #[must_use]
    pub const fn quantity(quantity: i32) -> Self {
        Self {
            product_id: None,
            unit_price: None,
            quantity: Some(quantity),
            discount: None,
        }
    }

    const fn is_empty(&self) -> bool {
        self.product_id.is_none()
            && self.unit_price.is_none()
            && self.quantity.is_none()
            && self.discount.is_none()
    }

    fn validate(&self) -> Result<()> {
        if let Some(price) = self.unit_price {
            if price < Decimal::ZERO {
                return Err(Error::InvalidAmount { amount: price });
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(Error::validation(
                    "quantity",
                    format!("{quantity} is negative"),
                ));
            }
        }
        if let Some(discount) = self.discount {
            if discount < Decimal::ZERO || discount > Decimal::ONE {
                return Err(Error::validation(
                    "discount",
                    format!("{discount} is outside 0..=1"),
                ));
            }
        }
        Ok(())
    }
}

/// Applies the copy-then-freeze pricing policy to `changes`.
///
/// When `changes` names a product, its unit price is overwritten with the product's
/// current price. A product that is missing or unpriced leaves the unit price alone.
pub async fn apply_pricing_policy<P: PriceList>(
    prices: &P,
    changes: &mut LineChanges,
) -> Result<()> {
    let Some(product_id) = changes.product_id else {
        return Ok(());
    };

    match prices.product_price(product_id).await? {
        Some(price) => {
            debug!(
                "Capturing price {} of product {} (request supplied {:?})",
                price, product_id, changes.unit_price
            );
            changes.unit_price = Some(price);
        }
        None => {
            warn!(
                "Product {} has no current price; keeping unit price {:?}",
                product_id, changes.unit_price
            );
        }
    }
    Ok(())
}

/// Adds a line to `order_id`, pricing it from its product.
///
/// # Errors
/// Returns an error if:
/// - The quantity, discount or supplied price is invalid
/// - The order does not exist
/// - The database insert fails (e.g. the product does not exist)
#[instrument(skip(db))]
pub async fn add_line(
    db: &DatabaseConnection,
    order_id: i64,
    mut changes: LineChanges,
) -> Result<order_line::Model> {
    changes.validate()?;

    let txn = db.begin().await?;

    if Order::find_by_id(order_id).one(&txn).await?.is_none() {
        return Err(Error::not_found("Order", order_id));
    }

    apply_pricing_policy(&SeaOrmStore::new(&txn), &mut changes).await?;

    let line = order_line::ActiveModel {
        order_id: Set(order_id),
        product_id: Set(changes.product_id),
        unit_price: Set(changes.unit_price),
        quantity: Set(changes.quantity),
        discount: Set(changes.discount.unwrap_or(Decimal::ZERO)),
        ..Default::default()
    };
    let line = line.insert(&txn).await?;
    txn.commit().await?;

    info!("Added line {} to order {}", line.id, order_id);
    Ok(line)
}

/// Applies `changes` to an existing line, re-pricing it if a product is given.
///
/// # Errors
/// Returns an error if the changes are invalid, the line does not exist, or the
/// update fails.
#[instrument(skip(db))]
pub async fn update_line(
    db: &DatabaseConnection,
    line_id: i64,
    mut changes: LineChanges,
) -> Result<order_line::Model> {
    changes.validate()?;

    let txn = db.begin().await?;

    let existing = OrderLine::find_by_id(line_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Order line", line_id))?;

    if changes.is_empty() {
        return Ok(existing);
    }

    apply_pricing_policy(&SeaOrmStore::new(&txn), &mut changes).await?;

    let mut line: order_line::ActiveModel = existing.into();
    if let Some(product_id) = changes.product_id {
        line.product_id = Set(Some(product_id));
    }
    if let Some(price) = changes.unit_price {
        line.unit_price = Set(Some(price));
    }
    if let Some(quantity) = changes.quantity {
        line.quantity = Set(Some(quantity));
    }
    if let Some(discount) = changes.discount {
        line.discount = Set(discount);
    }

    let line = line.update(&txn).await?;
    txn.commit().await?;
    Ok(line)
}

/// Deletes a line.
///
/// # Errors
/// Returns an error if the line does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_line(db: &DatabaseConnection, line_id: i64) -> Result<()> {
    let result = OrderLine::delete_by_id(line_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Order line", line_id));
    }
    info!("Deleted order line {}", line_id);
    Ok(())
}

/// Retrieves a line by id.
pub async fn get_line_by_id(
    db: &DatabaseConnection,
    line_id: i64,
) -> Result<Option<order_line::Model>> {
    OrderLine::find_by_id(line_id).one(db).await.map_err(Into::into)
}

/// Lines of `order_id` with their products, ordered by product name then quantity.
pub async fn lines_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<(order_line::Model, Option<product::Model>)>> {
    OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .find_also_related(Product)
        .order_by_asc(product::Column::Name)
        .order_by_asc(order_line::Column::Quantity)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Distinct product names on `order_id`, by product name.
pub async fn product_names_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for (_, product) in lines_for_order(db, order_id).await? {
        if let Some(product) = product {
            if !names.contains(&product.name) {
                names.push(product.name);
            }
        }
    }
    Ok(names)
}
