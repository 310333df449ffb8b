use crate::models::{Dimension, DimensionFilter, FilterGroup, FilterOperator};

/// Build the single filter group for a request.
///
/// Country codes are uppercased but not validated; an unknown code matches
/// nothing. The page filter is a raw substring. Blank values count as absent.
pub fn build_filters(country: Option<&str>, page: Option<&str>) -> FilterGroup {
    let mut filters = Vec::with_capacity(2);

    if let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) {
        filters.push(DimensionFilter {
            dimension: Dimension::Country,
            operator: FilterOperator::Equals,
            expression: country.to_uppercase(),
        });
    }

    if let Some(page) = page.filter(|p| !p.trim().is_empty()) {
        filters.push(DimensionFilter {
            dimension: Dimension::Page,
            operator: FilterOperator::Contains,
            expression: page.to_string(),
        });
    }

    FilterGroup { filters }
}
