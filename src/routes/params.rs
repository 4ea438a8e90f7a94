use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub perpage: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let perpage = self.perpage.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * perpage;
        (page, perpage, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuItemQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Case-insensitive substring match on the category title.
    pub category: Option<String>,
    /// Exact price match.
    pub to_price: Option<Decimal>,
    /// Case-insensitive substring match on the item title.
    pub search: Option<String>,
    /// Comma-separated field list, `-` prefix for descending.
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemSortBy {
    Title,
    Price,
    Featured,
    Category,
    CreatedAt,
}

impl MenuItemSortBy {
    fn parse(field: &str) -> Option<Self> {
        match field {
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "featured" => Some(Self::Featured),
            "category" => Some(Self::Category),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingSpec {
    pub field: MenuItemSortBy,
    pub descending: bool,
}

/// Parse an ordering list such as `price,-title`. Unknown field
/// names are reported back so the caller can reject the request.
pub fn parse_ordering(ordering: &str) -> Result<Vec<OrderingSpec>, String> {
    let mut specs = Vec::new();
    for raw in ordering.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let field = MenuItemSortBy::parse(name).ok_or_else(|| name.to_string())?;
        specs.push(OrderingSpec { field, descending });
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination {
            page: None,
            perpage: None,
        };
        assert_eq!(p.normalize(), (1, 10, 0));
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            perpage: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            perpage: Some(4),
        };
        assert_eq!(p.normalize(), (3, 4, 8));
    }

    #[test]
    fn ordering_parses_mixed_directions() {
        let specs = parse_ordering("price,-title").unwrap();
        assert_eq!(
            specs,
            vec![
                OrderingSpec {
                    field: MenuItemSortBy::Price,
                    descending: false,
                },
                OrderingSpec {
                    field: MenuItemSortBy::Title,
                    descending: true,
                },
            ]
        );
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        let err = parse_ordering("price,stock").unwrap_err();
        assert_eq!(err, "stock");
    }

    #[test]
    fn ordering_skips_empty_segments() {
        let specs = parse_ordering("price,,").unwrap();
        assert_eq!(specs.len(), 1);
    }
}
