//! Order business logic - order headers, order search and filter options.
//!
//! Order values (subtotal, total) are derived in [`crate::core::aggregator`];
//! line entry lives in [`crate::core::order_line`].

use crate::{
    core::{
        paging::{Page, Paged, fetch_page},
        validate::optional_text,
    },
    entities::{Customer, Employee, Order, customer, employee, order, order_line},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QueryTrait, Set, prelude::*, sea_query::Query};
use tracing::{info, instrument};

/// Editable fields of an order, as submitted by an entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub customer_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub order_date: Option<Date>,
    pub required_date: Option<Date>,
    pub shipped_date: Option<Date>,
    pub shipper_id: Option<i64>,
    pub freight: Option<Decimal>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub ship_to_city: Option<String>,
    pub ship_to_state: Option<String>,
    pub ship_to_region: Option<String>,
    pub ship_to_postal_code: Option<String>,
    pub ship_to_country: Option<String>,
}

impl OrderForm {
    fn validate(&self) -> Result<()> {
        if let Some(freight) = self.freight {
            if freight < Decimal::ZERO {
                return Err(Error::InvalidAmount { amount: freight });
            }
        }
        if let Some(state) = &self.ship_to_state {
            if state.trim().chars().count() > 2 {
                return Err(Error::validation(
                    "ship_to_state",
                    "must be a two letter code",
                ));
            }
        }
        Ok(())
    }

    fn apply(self, model: &mut order::ActiveModel) {
        model.customer_id = Set(self.customer_id);
        model.employee_id = Set(self.employee_id);
        model.order_date = Set(self.order_date);
        model.required_date = Set(self.required_date);
        model.shipped_date = Set(self.shipped_date);
        model.shipper_id = Set(self.shipper_id);
        model.freight = Set(self.freight);
        model.ship_to_name = Set(optional_text(self.ship_to_name.as_deref()));
        model.ship_to_address = Set(optional_text(self.ship_to_address.as_deref()));
        model.ship_to_city = Set(optional_text(self.ship_to_city.as_deref()));
        model.ship_to_state = Set(optional_text(self.ship_to_state.as_deref()));
        model.ship_to_region = Set(optional_text(self.ship_to_region.as_deref()));
        model.ship_to_postal_code = Set(optional_text(self.ship_to_postal_code.as_deref()));
        model.ship_to_country = Set(optional_text(self.ship_to_country.as_deref()));
    }
}

/// Order search filters; unset filters match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Filter by Customer
    pub customer_id: Option<i64>,
    /// Filter by Employee
    pub employee_id: Option<i64>,
}

/// Creates an order.
///
/// # Errors
/// Returns an error if the freight is negative, the ship-to state is not a two
/// letter code, or the insert fails (e.g. an unknown customer).
#[instrument(skip(db, form))]
pub async fn create_order(db: &DatabaseConnection, form: OrderForm) -> Result<order::Model> {
    form.validate()?;

    let mut model = <order::ActiveModel as Default>::default();
    form.apply(&mut model);
    let order = model.insert(db).await?;

    info!("Created order {}", order.id);
    Ok(order)
}

/// Retrieves an order by id.
pub async fn get_order_by_id(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Replaces the editable fields of an order.
///
/// # Errors
/// Returns an error if the form is invalid, the order does not exist, or the
/// update fails.
#[instrument(skip(db, form))]
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    form: OrderForm,
) -> Result<order::Model> {
    form.validate()?;

    let mut model: order::ActiveModel = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Order", order_id))?
        .into();
    form.apply(&mut model);

    model.update(db).await.map_err(Into::into)
}

/// Deletes an order together with its lines.
///
/// # Errors
/// Returns an error if the order does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let result = Order::delete_by_id(order_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Order", order_id));
    }
    info!("Deleted order {}", order_id);
    Ok(())
}

fn newest_first(select: Select<Order>) -> Select<Order> {
    select
        .order_by_desc(order::Column::OrderDate)
        .order_by_desc(order::Column::Id)
}

/// Lists orders matching `filter`, newest order date first.
pub async fn search_orders(
    db: &DatabaseConnection,
    filter: OrderFilter,
    page: Page,
) -> Result<Paged<order::Model>> {
    let select = newest_first(Order::find())
        .apply_if(filter.customer_id, |q, id| {
            q.filter(order::Column::CustomerId.eq(id))
        })
        .apply_if(filter.employee_id, |q, id| {
            q.filter(order::Column::EmployeeId.eq(id))
        });
    fetch_page(db, select, page).await
}

/// Orders placed by `customer_id`, newest first.
pub async fn orders_for_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<order::Model>> {
    newest_first(Order::find())
        .filter(order::Column::CustomerId.eq(customer_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders sold by `employee_id`, newest first.
pub async fn orders_for_employee(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<Vec<order::Model>> {
    newest_first(Order::find())
        .filter(order::Column::EmployeeId.eq(employee_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders with at least one line selling `product_id`, newest first.
pub async fn orders_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<order::Model>> {
    let with_product = Query::select()
        .column(order_line::Column::OrderId)
        .from(order_line::Entity)
        .and_where(order_line::Column::ProductId.eq(product_id))
        .to_owned();

    newest_first(Order::find())
        .filter(order::Column::Id.in_subquery(with_product))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Customers that have placed at least one order, by name. Options for the
/// customer filter.
pub async fn customers_with_orders(db: &DatabaseConnection) -> Result<Vec<customer::Model>> {
    let referenced = Query::select()
        .distinct()
        .column(order::Column::CustomerId)
        .from(order::Entity)
        .to_owned();

    Customer::find()
        .filter(customer::Column::Id.in_subquery(referenced))
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Employees that have sold at least one order, by last then first name. Options
/// for the employee filter.
pub async fn employees_with_orders(db: &DatabaseConnection) -> Result<Vec<employee::Model>> {
    let referenced = Query::select()
        .distinct()
        .column(order::Column::EmployeeId)
        .from(order::Entity)
        .to_owned();

    Employee::find()
        .filter(employee::Column::Id.in_subquery(referenced))
        .order_by_asc(employee::Column::LastName)
        .order_by_asc(employee::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}
