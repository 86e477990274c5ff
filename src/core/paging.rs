//! Page requests and paged results for listings.

use crate::errors::Result;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Select,
    sea_query::{LikeExpr, SimpleExpr},
};

/// A page request. Page numbers start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-based page number
    pub number: u64,
    /// Rows per page
    pub size: u64,
}

impl Page {
    /// The first page of `size` rows.
    #[must_use]
    pub const fn first(size: u64) -> Self {
        Self { number: 0, size }
    }

    /// Page `number` of `size` rows.
    #[must_use]
    pub const fn new(number: u64, size: u64) -> Self {
        Self { number, size }
    }
}

/// One page of a listing plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Zero-based number of this page
    pub page: u64,
    /// Rows across all pages
    pub total_items: u64,
    /// Number of pages
    pub total_pages: u64,
}

/// Runs `select` and returns the requested page of it.
pub(crate) async fn fetch_page<C, E>(
    db: &C,
    select: Select<E>,
    page: Page,
) -> Result<Paged<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let paginator = select.paginate(db, page.size.max(1));
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page.number).await?;

    Ok(Paged {
        items,
        page: page.number,
        total_items: counts.number_of_items,
        total_pages: counts.number_of_pages,
    })
}

/// `column LIKE '%text%'` with wildcards and backslashes in `text` matched literally.
pub(crate) fn contains_text<C: ColumnTrait>(column: C, text: &str) -> SimpleExpr {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    column.like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Product, product};
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseConnection, QueryFilter, QueryOrder};

    async fn names_containing(db: &DatabaseConnection, text: &str) -> Result<Vec<String>> {
        let products = Product::find()
            .filter(contains_text(product::Column::Name, text))
            .order_by_asc(product::Column::Name)
            .all(db)
            .await?;
        Ok(products.into_iter().map(|p| p.name).collect())
    }

    #[tokio::test]
    async fn test_contains_text_matches_literally() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "100% Juice", dec!(18.00)).await?;
        create_test_product(&db, "Chai", dec!(18.00)).await?;
        create_test_product(&db, "Tofu", dec!(23.25)).await?;

        assert_eq!(names_containing(&db, "%").await?, vec!["100% Juice"]);
        assert!(names_containing(&db, "_").await?.is_empty());
        assert!(names_containing(&db, "\\").await?.is_empty());
        assert_eq!(names_containing(&db, "HA").await?, vec!["Chai"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_page_counts() -> Result<()> {
        let db = setup_test_db().await?;
        for name in ["Chai", "Chang", "Tofu"] {
            create_test_product(&db, name, dec!(18.00)).await?;
        }
        let second = fetch_page(
            &db,
            Product::find().order_by_asc(product::Column::Name),
            Page::new(1, 2),
        )
        .await?;
        assert_eq!(second.page, 1);
        assert_eq!(second.total_items, 3);
        assert_eq!(second.total_pages, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "Tofu");
        Ok(())
    }
}
