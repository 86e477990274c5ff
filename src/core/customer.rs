//! Customer business logic - customer records, their notes and their types.

use crate::{
    core::{
        paging::{Page, Paged, contains_text, fetch_page},
        validate::{optional_text, tidy},
    },
    entities::{
        Customer, CustomerCustomerType, CustomerNote, CustomerType, customer,
        customer_customer_type, customer_note, customer_type,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QueryTrait, Set, prelude::*};
use tracing::{debug, info, instrument};
use validator::Validate;

/// Editable fields of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CustomerForm {
    #[validate(length(min = 1, max = 40, message = "must be 1 to 40 characters"))]
    pub name: String,
    pub contact: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "is not an email address"))]
    pub email: Option<String>,
}

impl CustomerForm {
    /// A form with only the company name filled in.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn tidy(&mut self) {
        self.name = self.name.trim().to_string();
        for field in [
            &mut self.contact,
            &mut self.title,
            &mut self.address,
            &mut self.city,
            &mut self.region,
            &mut self.postal_code,
            &mut self.country,
            &mut self.phone,
            &mut self.email,
        ] {
            tidy(field);
        }
    }

    fn into_active_model(mut self, mut model: customer::ActiveModel) -> Result<customer::ActiveModel> {
        self.tidy();
        self.validate()?;
        model.name = Set(self.name);
        model.email = Set(self.email);
        model.contact = Set(self.contact);
        model.title = Set(self.title);
        model.address = Set(self.address);
        model.city = Set(self.city);
        model.region = Set(self.region);
        model.postal_code = Set(self.postal_code);
        model.country = Set(self.country);
        model.phone = Set(self.phone);
        Ok(model)
    }
}

/// Customer search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the company name
    pub name_contains: Option<String>,
}

/// Creates a customer.
///
/// # Errors
/// Returns an error if the name is empty or too long, the email is malformed,
/// or the insert fails.
#[instrument(skip(db, form), fields(name = %form.name))]
pub async fn create_customer(db: &DatabaseConnection, form: CustomerForm) -> Result<customer::Model> {
    let customer = form
        .into_active_model(<customer::ActiveModel as Default>::default())?
        .insert(db)
        .await?;
    info!("Created customer {} ({})", customer.name, customer.id);
    Ok(customer)
}

/// Retrieves a customer by id.
pub async fn get_customer_by_id(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the editable fields of a customer.
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    form: CustomerForm,
) -> Result<customer::Model> {
    let existing: customer::ActiveModel = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer", customer_id))?
        .into();
    form.into_active_model(existing)?
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a customer and its notes. Customers with orders cannot be deleted.
#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let result = Customer::delete_by_id(customer_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Customer", customer_id));
    }
    info!("Deleted customer {}", customer_id);
    Ok(())
}

/// Lists customers matching `filter` by name.
pub async fn search_customers(
    db: &DatabaseConnection,
    filter: &CustomerFilter,
    page: Page,
) -> Result<Paged<customer::Model>> {
    let name = filter.name_contains.as_deref().and_then(|n| optional_text(Some(n)));
    let select = Customer::find()
        .apply_if(name, |q, name| q.filter(contains_text(customer::Column::Name, &name)))
        .order_by_asc(customer::Column::Name);
    fetch_page(db, select, page).await
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// Adds a note to a customer, stamped with the current time.
#[instrument(skip(db, note))]
pub async fn add_note(
    db: &DatabaseConnection,
    customer_id: i64,
    note: &str,
) -> Result<customer_note::Model> {
    let note = note.trim();
    if note.is_empty() {
        return Err(Error::validation("note", "cannot be empty"));
    }
    if Customer::find_by_id(customer_id).one(db).await?.is_none() {
        return Err(Error::not_found("Customer", customer_id));
    }

    let model = customer_note::ActiveModel {
        customer_id: Set(customer_id),
        timestamp: Set(Utc::now().naive_utc()),
        note: Set(note.to_string()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Notes on a customer, newest first.
pub async fn list_notes(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<customer_note::Model>> {
    CustomerNote::find()
        .filter(customer_note::Column::CustomerId.eq(customer_id))
        .order_by_desc(customer_note::Column::Timestamp)
        .order_by_desc(customer_note::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rewrites the body of a note. The timestamp is kept.
pub async fn update_note(
    db: &DatabaseConnection,
    note_id: i64,
    note: &str,
) -> Result<customer_note::Model> {
    let note = note.trim();
    if note.is_empty() {
        return Err(Error::validation("note", "cannot be empty"));
    }
    let mut model: customer_note::ActiveModel = CustomerNote::find_by_id(note_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer note", note_id))?
        .into();
    model.note = Set(note.to_string());
    model.update(db).await.map_err(Into::into)
}

/// Deletes a note.
pub async fn delete_note(db: &DatabaseConnection, note_id: i64) -> Result<()> {
    let result = CustomerNote::delete_by_id(note_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Customer note", note_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Customer types
// ---------------------------------------------------------------------------

/// Assigns a customer type to a customer. Assigning the same type twice is an
/// error.
pub async fn assign_type(
    db: &DatabaseConnection,
    customer_id: i64,
    customer_type_id: i64,
) -> Result<customer_customer_type::Model> {
    let existing = CustomerCustomerType::find()
        .filter(customer_customer_type::Column::CustomerId.eq(customer_id))
        .filter(customer_customer_type::Column::CustomerTypeId.eq(customer_type_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation(
            "customer_type_id",
            "is already assigned to this customer",
        ));
    }

    let link = customer_customer_type::ActiveModel {
        customer_id: Set(customer_id),
        customer_type_id: Set(customer_type_id),
        ..Default::default()
    };
    let link = link.insert(db).await?;
    debug!(customer_id, customer_type_id, "Assigned customer type");
    Ok(link)
}

/// Removes a customer type from a customer.
pub async fn remove_type(
    db: &DatabaseConnection,
    customer_id: i64,
    customer_type_id: i64,
) -> Result<()> {
    let result = CustomerCustomerType::delete_many()
        .filter(customer_customer_type::Column::CustomerId.eq(customer_id))
        .filter(customer_customer_type::Column::CustomerTypeId.eq(customer_type_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Customer type", customer_type_id));
    }
    Ok(())
}

/// Types assigned to a customer, by name.
pub async fn types_for_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<customer_type::Model>> {
    CustomerType::find()
        .inner_join(CustomerCustomerType)
        .filter(customer_customer_type::Column::CustomerId.eq(customer_id))
        .order_by_asc(customer_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}
