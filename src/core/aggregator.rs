//! Order aggregation - derives an order's subtotal and total from its lines.
//!
//! Aggregation reads through two narrow store traits so the arithmetic does not
//! depend on `SeaORM`: [`OrderLedger`] supplies an order's line amounts and freight,
//! [`PriceList`] supplies a product's current price for the line pricing policy.
//! [`SeaOrmStore`] implements both over any `SeaORM` connection or transaction.
//!
//! A missing order is not an error: it has no lines and no freight, so both
//! aggregates come out as zero.

use crate::{
    core::money::{LineAmount, subtotal_of, total_of},
    entities::{Order, OrderLine, Product, order, order_line},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, prelude::*};
use tracing::{debug, instrument};

/// Source of the line amounts and freight of an order.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// Returns the price/quantity pairs of every line on `order_id`.
    async fn order_lines(&self, order_id: i64) -> Result<Vec<LineAmount>>;

    /// Returns the freight charged on `order_id`, `None` when unset or the order is missing.
    async fn freight(&self, order_id: i64) -> Result<Option<Decimal>>;
}

/// Source of current product prices.
#[allow(async_fn_in_trait)]
pub trait PriceList {
    /// Returns the current unit price of `product_id`, `None` when the product is
    /// missing or has no price.
    async fn product_price(&self, product_id: i64) -> Result<Option<Decimal>>;
}

/// [`OrderLedger`] and [`PriceList`] backed by the relational store.
pub struct SeaOrmStore<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SeaOrmStore<'a, C> {
    /// Wraps a connection or transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl From<&order_line::Model> for LineAmount {
    /// Unset prices and quantities count as zero.
    fn from(line: &order_line::Model) -> Self {
        Self::new(
            line.unit_price.unwrap_or(Decimal::ZERO),
            line.quantity.map_or(Decimal::ZERO, Decimal::from),
        )
    }
}

impl<C: ConnectionTrait> OrderLedger for SeaOrmStore<'_, C> {
    async fn order_lines(&self, order_id: i64) -> Result<Vec<LineAmount>> {
        let lines = OrderLine::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .all(self.db)
            .await?;
        Ok(lines.iter().map(LineAmount::from).collect())
    }

    async fn freight(&self, order_id: i64) -> Result<Option<Decimal>> {
        let order = Order::find_by_id(order_id).one(self.db).await?;
        Ok(order.and_then(|o| o.freight))
    }
}

impl<C: ConnectionTrait> PriceList for SeaOrmStore<'_, C> {
    async fn product_price(&self, product_id: i64) -> Result<Option<Decimal>> {
        let product = Product::find_by_id(product_id).one(self.db).await?;
        Ok(product.and_then(|p| p.unit_price))
    }
}

/// Both derived monetary values of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of the line extended prices
    pub subtotal: Decimal,
    /// Subtotal plus freight
    pub total: Decimal,
}

/// An order together with its derived values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    /// The stored order
    pub order: order::Model,
    /// Derived subtotal and total
    pub totals: OrderTotals,
}

/// Computes the subtotal of `order_id`.
pub async fn subtotal<L: OrderLedger>(ledger: &L, order_id: i64) -> Result<Decimal> {
    let lines = ledger.order_lines(order_id).await?;
    Ok(subtotal_of(&lines))
}

/// Computes the total of `order_id`: subtotal plus freight.
pub async fn total<L: OrderLedger>(ledger: &L, order_id: i64) -> Result<Decimal> {
    Ok(order_totals(ledger, order_id).await?.total)
}

/// Computes subtotal and total of `order_id` from one read of its lines.
pub async fn order_totals<L: OrderLedger>(ledger: &L, order_id: i64) -> Result<OrderTotals> {
    let subtotal = subtotal(ledger, order_id).await?;
    let freight = ledger.freight(order_id).await?;
    let totals = OrderTotals {
        subtotal,
        total: total_of(subtotal, freight),
    };
    debug!(
        "Order {} totals: subtotal={}, total={}",
        order_id, totals.subtotal, totals.total
    );
    Ok(totals)
}

/// Loads `order_id` with its derived values, `None` when the order does not exist.
#[instrument(skip(db))]
pub async fn summarize<C: ConnectionTrait>(db: &C, order_id: i64) -> Result<Option<OrderSummary>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let totals = order_totals(&SeaOrmStore::new(db), order_id).await?;
    Ok(Some(OrderSummary { order, totals }))
}

/// Attaches derived values to each order in `orders`.
pub async fn summarize_all<C: ConnectionTrait>(
    db: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderSummary>> {
    let store = SeaOrmStore::new(db);
    let mut summaries = Vec::with_capacity(orders.len());
    for order in orders {
        let totals = order_totals(&store, order.id).await?;
        summaries.push(OrderSummary { order, totals });
    }
    Ok(summaries)
}
