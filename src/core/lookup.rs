//! Lookup tables - sales regions, territories, shippers, suppliers, categories and
//! customer types.
//!
//! These are small reference tables maintained from the setup screens. Each gets
//! create, get, update, delete and a name-ordered listing.

use crate::{
    core::validate::{optional_text, required_text, tidy},
    entities::{
        Category, CustomerType, SalesRegion, Shipper, Supplier, Territory, category,
        customer_type, sales_region, shipper, supplier, territory,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};
use validator::Validate;

// ---------------------------------------------------------------------------
// Sales regions
// ---------------------------------------------------------------------------

/// Creates a sales region.
#[instrument(skip(db))]
pub async fn create_sales_region(
    db: &DatabaseConnection,
    name: &str,
) -> Result<sales_region::Model> {
    let region = sales_region::ActiveModel {
        name: Set(required_text("name", name, 50)?),
        ..Default::default()
    };
    let region = region.insert(db).await?;
    info!("Created sales region {} ({})", region.name, region.id);
    Ok(region)
}

/// Renames a sales region.
pub async fn rename_sales_region(
    db: &DatabaseConnection,
    region_id: i64,
    name: &str,
) -> Result<sales_region::Model> {
    let name = required_text("name", name, 50)?;
    let mut region: sales_region::ActiveModel = SalesRegion::find_by_id(region_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Sales region", region_id))?
        .into();
    region.name = Set(name);
    region.update(db).await.map_err(Into::into)
}

/// Retrieves a sales region by id.
pub async fn get_sales_region_by_id(
    db: &DatabaseConnection,
    region_id: i64,
) -> Result<Option<sales_region::Model>> {
    SalesRegion::find_by_id(region_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All sales regions by name.
pub async fn list_sales_regions(db: &DatabaseConnection) -> Result<Vec<sales_region::Model>> {
    SalesRegion::find()
        .order_by_asc(sales_region::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a sales region that nothing references.
pub async fn delete_sales_region(db: &DatabaseConnection, region_id: i64) -> Result<()> {
    let result = SalesRegion::delete_by_id(region_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Sales region", region_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Territories
// ---------------------------------------------------------------------------

/// Creates a territory in `sales_region_id`.
#[instrument(skip(db))]
pub async fn create_territory(
    db: &DatabaseConnection,
    name: &str,
    sales_region_id: Option<i64>,
) -> Result<territory::Model> {
    let territory = territory::ActiveModel {
        name: Set(required_text("name", name, 50)?),
        sales_region_id: Set(sales_region_id),
        ..Default::default()
    };
    territory.insert(db).await.map_err(Into::into)
}

/// Renames a territory and moves it to `sales_region_id`.
pub async fn update_territory(
    db: &DatabaseConnection,
    territory_id: i64,
    name: &str,
    sales_region_id: Option<i64>,
) -> Result<territory::Model> {
    let name = required_text("name", name, 50)?;
    let mut territory: territory::ActiveModel = Territory::find_by_id(territory_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Territory", territory_id))?
        .into();
    territory.name = Set(name);
    territory.sales_region_id = Set(sales_region_id);
    territory.update(db).await.map_err(Into::into)
}

/// Retrieves a territory by id.
pub async fn get_territory_by_id(
    db: &DatabaseConnection,
    territory_id: i64,
) -> Result<Option<territory::Model>> {
    Territory::find_by_id(territory_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All territories by name.
pub async fn list_territories(db: &DatabaseConnection) -> Result<Vec<territory::Model>> {
    Territory::find()
        .order_by_asc(territory::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Territories of one sales region by name.
pub async fn territories_for_region(
    db: &DatabaseConnection,
    sales_region_id: i64,
) -> Result<Vec<territory::Model>> {
    Territory::find()
        .filter(territory::Column::SalesRegionId.eq(sales_region_id))
        .order_by_asc(territory::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a territory that nothing references.
pub async fn delete_territory(db: &DatabaseConnection, territory_id: i64) -> Result<()> {
    let result = Territory::delete_by_id(territory_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Territory", territory_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shippers
// ---------------------------------------------------------------------------

/// Creates a shipper.
#[instrument(skip(db))]
pub async fn create_shipper(
    db: &DatabaseConnection,
    name: &str,
    phone: Option<&str>,
) -> Result<shipper::Model> {
    let shipper = shipper::ActiveModel {
        name: Set(required_text("name", name, 40)?),
        phone: Set(optional_text(phone)),
        ..Default::default()
    };
    shipper.insert(db).await.map_err(Into::into)
}

/// Updates a shipper's name and phone.
pub async fn update_shipper(
    db: &DatabaseConnection,
    shipper_id: i64,
    name: &str,
    phone: Option<&str>,
) -> Result<shipper::Model> {
    let name = required_text("name", name, 40)?;
    let mut shipper: shipper::ActiveModel = Shipper::find_by_id(shipper_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Shipper", shipper_id))?
        .into();
    shipper.name = Set(name);
    shipper.phone = Set(optional_text(phone));
    shipper.update(db).await.map_err(Into::into)
}

/// Retrieves a shipper by id.
pub async fn get_shipper_by_id(
    db: &DatabaseConnection,
    shipper_id: i64,
) -> Result<Option<shipper::Model>> {
    Shipper::find_by_id(shipper_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All shippers by name.
pub async fn list_shippers(db: &DatabaseConnection) -> Result<Vec<shipper::Model>> {
    Shipper::find()
        .order_by_asc(shipper::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a shipper no order ships with.
pub async fn delete_shipper(db: &DatabaseConnection, shipper_id: i64) -> Result<()> {
    let result = Shipper::delete_by_id(shipper_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Shipper", shipper_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Suppliers
// ---------------------------------------------------------------------------

/// Editable fields of a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct SupplierForm {
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
    pub homepage: Option<String>,
    pub sales_region_id: Option<i64>,
}

impl SupplierForm {
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
            &mut self.homepage,
        ] {
            tidy(field);
        }
    }

    fn into_active_model(mut self, mut model: supplier::ActiveModel) -> Result<supplier::ActiveModel> {
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
        model.homepage = Set(self.homepage);
        model.sales_region_id = Set(self.sales_region_id);
        Ok(model)
    }
}

/// Creates a supplier.
///
/// # Errors
/// Returns an error if the name is empty, the email is malformed, or the insert
/// fails.
#[instrument(skip(db, form), fields(name = %form.name))]
pub async fn create_supplier(db: &DatabaseConnection, form: SupplierForm) -> Result<supplier::Model> {
    let model = form.into_active_model(<supplier::ActiveModel as Default>::default())?;
    model.insert(db).await.map_err(Into::into)
}

/// Replaces the editable fields of a supplier.
pub async fn update_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
    form: SupplierForm,
) -> Result<supplier::Model> {
    let existing: supplier::ActiveModel = Supplier::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", supplier_id))?
        .into();
    form.into_active_model(existing)?
        .update(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a supplier by id.
pub async fn get_supplier_by_id(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<Option<supplier::Model>> {
    Supplier::find_by_id(supplier_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All suppliers by name.
pub async fn list_suppliers(db: &DatabaseConnection) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a supplier no product references.
pub async fn delete_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<()> {
    let result = Supplier::delete_by_id(supplier_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Supplier", supplier_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Creates a product category.
#[instrument(skip(db, description))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    description: Option<&str>,
) -> Result<category::Model> {
    let category = category::ActiveModel {
        name: Set(required_text("name", name, 15)?),
        description: Set(optional_text(description)),
        picture: Set(None),
        ..Default::default()
    };
    category.insert(db).await.map_err(Into::into)
}

/// Updates a category's name, description and picture.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    name: &str,
    description: Option<&str>,
    picture: Option<&str>,
) -> Result<category::Model> {
    let name = required_text("name", name, 15)?;
    let mut category: category::ActiveModel = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))?
        .into();
    category.name = Set(name);
    category.description = Set(optional_text(description));
    category.picture = Set(optional_text(picture));
    category.update(db).await.map_err(Into::into)
}

/// Retrieves a category by id.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All categories by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a category no product references.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let result = Category::delete_by_id(category_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Category", category_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Customer types
// ---------------------------------------------------------------------------

/// Creates a customer type.
pub async fn create_customer_type(
    db: &DatabaseConnection,
    name: &str,
) -> Result<customer_type::Model> {
    let customer_type = customer_type::ActiveModel {
        name: Set(required_text("name", name, 50)?),
        ..Default::default()
    };
    customer_type.insert(db).await.map_err(Into::into)
}

/// Retrieves a customer type by id.
pub async fn get_customer_type_by_id(
    db: &DatabaseConnection,
    customer_type_id: i64,
) -> Result<Option<customer_type::Model>> {
    CustomerType::find_by_id(customer_type_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Renames a customer type.
pub async fn rename_customer_type(
    db: &DatabaseConnection,
    customer_type_id: i64,
    name: &str,
) -> Result<customer_type::Model> {
    let name = required_text("name", name, 50)?;
    let mut customer_type: customer_type::ActiveModel = CustomerType::find_by_id(customer_type_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer type", customer_type_id))?
        .into();
    customer_type.name = Set(name);
    customer_type.update(db).await.map_err(Into::into)
}

/// All customer types by name.
pub async fn list_customer_types(db: &DatabaseConnection) -> Result<Vec<customer_type::Model>> {
    CustomerType::find()
        .order_by_asc(customer_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a customer type no customer is assigned.
pub async fn delete_customer_type(db: &DatabaseConnection, customer_type_id: i64) -> Result<()> {
    let result = CustomerType::delete_by_id(customer_type_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Customer type", customer_type_id));
    }
    Ok(())
}
