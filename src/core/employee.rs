//! Employee business logic - staff records, reporting lines and territories.

use crate::{
    core::{
        paging::{Page, Paged, contains_text, fetch_page},
        validate::{optional_text, tidy},
    },
    entities::{Employee, EmployeeTerritory, Territory, employee, employee_territory, territory},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, QueryTrait, Set, prelude::*};
use tracing::{debug, info, instrument};
use validator::Validate;

/// Editable fields of an employee. The supervisor is set separately with
/// [`set_supervisor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct EmployeeForm {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 10, message = "must be 1 to 10 characters"))]
    pub first_name: String,
    pub title: Option<String>,
    pub title_of_courtesy: Option<String>,
    pub birth_date: Option<Date>,
    pub hire_date: Option<Date>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub extension: Option<String>,
    pub photo: Option<String>,
    pub notes: Option<String>,
    pub sales_region_id: Option<i64>,
}

impl EmployeeForm {
    /// A form with only the names filled in.
    #[must_use]
    pub fn named(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            ..Self::default()
        }
    }

    fn tidy(&mut self) {
        self.last_name = self.last_name.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        for field in [
            &mut self.title,
            &mut self.title_of_courtesy,
            &mut self.address,
            &mut self.city,
            &mut self.region,
            &mut self.postal_code,
            &mut self.country,
            &mut self.phone,
            &mut self.extension,
            &mut self.photo,
            &mut self.notes,
        ] {
            tidy(field);
        }
    }

    fn into_active_model(mut self, mut model: employee::ActiveModel) -> Result<employee::ActiveModel> {
        self.tidy();
        self.validate()?;
        if let (Some(born), Some(hired)) = (self.birth_date, self.hire_date) {
            if hired < born {
                return Err(Error::validation("hire_date", "is before the birth date"));
            }
        }
        model.last_name = Set(self.last_name);
        model.first_name = Set(self.first_name);
        model.title = Set(self.title);
        model.title_of_courtesy = Set(self.title_of_courtesy);
        model.birth_date = Set(self.birth_date);
        model.hire_date = Set(self.hire_date);
        model.address = Set(self.address);
        model.city = Set(self.city);
        model.region = Set(self.region);
        model.postal_code = Set(self.postal_code);
        model.country = Set(self.country);
        model.phone = Set(self.phone);
        model.extension = Set(self.extension);
        model.photo = Set(self.photo);
        model.notes = Set(self.notes);
        model.sales_region_id = Set(self.sales_region_id);
        Ok(model)
    }
}

/// Employee search filters; unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    /// Substring of the first or last name
    pub name_contains: Option<String>,
    /// Filter by Sales Region
    pub sales_region_id: Option<i64>,
}

/// Creates an employee.
///
/// # Errors
/// Returns an error if a name is empty or too long, the hire date precedes the
/// birth date, or the insert fails.
#[instrument(skip(db, form), fields(last_name = %form.last_name))]
pub async fn create_employee(db: &DatabaseConnection, form: EmployeeForm) -> Result<employee::Model> {
    let employee = form
        .into_active_model(<employee::ActiveModel as Default>::default())?
        .insert(db)
        .await?;
    info!("Created employee {} ({})", employee.list_label(), employee.id);
    Ok(employee)
}

/// Retrieves an employee by id.
pub async fn get_employee_by_id(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<Option<employee::Model>> {
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the editable fields of an employee. The supervisor is kept.
pub async fn update_employee(
    db: &DatabaseConnection,
    employee_id: i64,
    form: EmployeeForm,
) -> Result<employee::Model> {
    let existing: employee::ActiveModel = Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Employee", employee_id))?
        .into();
    form.into_active_model(existing)?
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes an employee. Employees with orders or reports cannot be deleted.
#[instrument(skip(db))]
pub async fn delete_employee(db: &DatabaseConnection, employee_id: i64) -> Result<()> {
    let result = Employee::delete_by_id(employee_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Employee", employee_id));
    }
    info!("Deleted employee {}", employee_id);
    Ok(())
}

/// Lists employees matching `filter` by last then first name.
pub async fn search_employees(
    db: &DatabaseConnection,
    filter: &EmployeeFilter,
    page: Page,
) -> Result<Paged<employee::Model>> {
    let name = filter.name_contains.as_deref().and_then(|n| optional_text(Some(n)));
    let select = Employee::find()
        .apply_if(name, |q, name| {
            q.filter(
                Condition::any()
                    .add(contains_text(employee::Column::LastName, &name))
                    .add(contains_text(employee::Column::FirstName, &name)),
            )
        })
        .apply_if(filter.sales_region_id, |q, id| {
            q.filter(employee::Column::SalesRegionId.eq(id))
        })
        .order_by_asc(employee::Column::LastName)
        .order_by_asc(employee::Column::FirstName);
    fetch_page(db, select, page).await
}

/// Sets or clears the supervisor of an employee.
///
/// # Errors
/// Returns an error if the employee would supervise itself, either employee does
/// not exist, or the update fails.
#[instrument(skip(db))]
pub async fn set_supervisor(
    db: &DatabaseConnection,
    employee_id: i64,
    supervisor_id: Option<i64>,
) -> Result<employee::Model> {
    if supervisor_id == Some(employee_id) {
        return Err(Error::validation(
            "supervisor_id",
            "an employee cannot supervise themselves",
        ));
    }
    if let Some(supervisor_id) = supervisor_id {
        if Employee::find_by_id(supervisor_id).one(db).await?.is_none() {
            return Err(Error::not_found("Employee", supervisor_id));
        }
    }

    let mut model: employee::ActiveModel = Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Employee", employee_id))?
        .into();
    model.supervisor_id = Set(supervisor_id);
    model.update(db).await.map_err(Into::into)
}

/// Employees reporting directly to `supervisor_id`, by last then first name.
pub async fn reports_of(
    db: &DatabaseConnection,
    supervisor_id: i64,
) -> Result<Vec<employee::Model>> {
    Employee::find()
        .filter(employee::Column::SupervisorId.eq(supervisor_id))
        .order_by_asc(employee::Column::LastName)
        .order_by_asc(employee::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

// ---------------------------------------------------------------------------
// Territories
// ---------------------------------------------------------------------------

/// Assigns a territory to an employee. Assigning the same territory twice is an
/// error.
pub async fn assign_territory(
    db: &DatabaseConnection,
    employee_id: i64,
    territory_id: i64,
) -> Result<employee_territory::Model> {
    let existing = EmployeeTerritory::find()
        .filter(employee_territory::Column::EmployeeId.eq(employee_id))
        .filter(employee_territory::Column::TerritoryId.eq(territory_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation(
            "territory_id",
            "is already assigned to this employee",
        ));
    }

    let link = employee_territory::ActiveModel {
        employee_id: Set(employee_id),
        territory_id: Set(territory_id),
        ..Default::default()
    };
    let link = link.insert(db).await?;
    debug!(employee_id, territory_id, "Assigned territory");
    Ok(link)
}

/// Removes a territory from an employee.
pub async fn remove_territory(
    db: &DatabaseConnection,
    employee_id: i64,
    territory_id: i64,
) -> Result<()> {
    let result = EmployeeTerritory::delete_many()
        .filter(employee_territory::Column::EmployeeId.eq(employee_id))
        .filter(employee_territory::Column::TerritoryId.eq(territory_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Territory", territory_id));
    }
    Ok(())
}

/// Territories assigned to an employee, by name.
pub async fn territories_for_employee(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<Vec<territory::Model>> {
    Territory::find()
        .inner_join(EmployeeTerritory)
        .filter(employee_territory::Column::EmployeeId.eq(employee_id))
        .order_by_asc(territory::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::lookup::{create_sales_region, create_territory};
    use crate::test_utils::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_employee_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_employee(&db, EmployeeForm::named("Davolio", "")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "first_name",
                ..
            }
        ));

        let result = create_employee(&db, EmployeeForm::named("Davolio", "Nancy-Jacqueline")).await;
        assert!(result.is_err());

        let form = EmployeeForm {
            birth_date: NaiveDate::from_ymd_opt(1968, 12, 8),
            hire_date: NaiveDate::from_ymd_opt(1960, 5, 1),
            ..EmployeeForm::named("Davolio", "Nancy")
        };
        let result = create_employee(&db, form).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "hire_date",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_employee_crud_and_labels() -> Result<()> {
        let db = setup_test_db().await?;
        let form = EmployeeForm {
            title: Some("Sales Representative".to_string()),
            hire_date: NaiveDate::from_ymd_opt(1992, 5, 1),
            ..EmployeeForm::named("Davolio", "Nancy")
        };
        let employee = create_employee(&db, form).await?;
        assert_eq!(employee.list_label(), "Davolio, Nancy");
        assert_eq!(employee.display_name(), "Nancy Davolio");

        let updated = update_employee(&db, employee.id, EmployeeForm::named("Davolio", "Nan")).await?;
        assert_eq!(updated.first_name, "Nan");
        assert_eq!(updated.title, None);

        delete_employee(&db, employee.id).await?;
        assert!(get_employee_by_id(&db, employee.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_employees() -> Result<()> {
        let db = setup_test_db().await?;
        let western = create_sales_region(&db, "Western").await?;
        create_test_employee(&db, "Fuller", "Andrew").await?;
        create_test_employee(&db, "Davolio", "Nancy").await?;
        let form = EmployeeForm {
            sales_region_id: Some(western.id),
            ..EmployeeForm::named("King", "Robert")
        };
        let king = create_employee(&db, form).await?;

        let all = search_employees(&db, &EmployeeFilter::default(), Page::first(15)).await?;
        let labels: Vec<String> = all.items.iter().map(employee::Model::list_label).collect();
        assert_eq!(labels, vec!["Davolio, Nancy", "Fuller, Andrew", "King, Robert"]);

        let filter = EmployeeFilter {
            name_contains: Some("an".to_string()),
            ..EmployeeFilter::default()
        };
        let by_name = search_employees(&db, &filter, Page::first(15)).await?;
        assert_eq!(by_name.total_items, 2);

        let filter = EmployeeFilter {
            sales_region_id: Some(western.id),
            ..EmployeeFilter::default()
        };
        let by_region = search_employees(&db, &filter, Page::first(15)).await?;
        assert_eq!(by_region.items.len(), 1);
        assert_eq!(by_region.items[0].id, king.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_supervisor() -> Result<()> {
        let db = setup_test_db().await?;
        let fuller = create_test_employee(&db, "Fuller", "Andrew").await?;
        let davolio = create_test_employee(&db, "Davolio", "Nancy").await?;
        let leverling = create_test_employee(&db, "Leverling", "Janet").await?;

        let result = set_supervisor(&db, fuller.id, Some(fuller.id)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        let result = set_supervisor(&db, fuller.id, Some(999)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        set_supervisor(&db, leverling.id, Some(fuller.id)).await?;
        let davolio = set_supervisor(&db, davolio.id, Some(fuller.id)).await?;
        assert_eq!(davolio.supervisor_id, Some(fuller.id));

        let reports: Vec<i64> = reports_of(&db, fuller.id).await?.iter().map(|e| e.id).collect();
        assert_eq!(reports, vec![davolio.id, leverling.id]);

        // Editing the record keeps the reporting line
        let edited = update_employee(&db, davolio.id, EmployeeForm::named("Davolio", "Nancy")).await?;
        assert_eq!(edited.supervisor_id, Some(fuller.id));

        let cleared = set_supervisor(&db, davolio.id, None).await?;
        assert_eq!(cleared.supervisor_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_territory_assignment() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Davolio", "Nancy").await?;
        let wilton = create_territory(&db, "Wilton", None).await?;
        let neward = create_territory(&db, "Neward", None).await?;

        assign_territory(&db, employee.id, wilton.id).await?;
        assign_territory(&db, employee.id, neward.id).await?;
        let duplicate = assign_territory(&db, employee.id, wilton.id).await;
        assert!(matches!(duplicate.unwrap_err(), Error::Validation { .. }));

        let names: Vec<String> = territories_for_employee(&db, employee.id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Neward", "Wilton"]);

        remove_territory(&db, employee.id, wilton.id).await?;
        assert_eq!(territories_for_employee(&db, employee.id).await?.len(), 1);
        assert!(matches!(
            remove_territory(&db, employee.id, wilton.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        Ok(())
    }
}
