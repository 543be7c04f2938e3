use serde::{Deserialize, Serialize};

const MAX_LIMIT: i64 = 100;

/// Uniform listing query contract: `page` (1-based, default 1), `limit`
/// (default 10), `sortBy` (default creation time), `sortType` (`asc`|`desc`,
/// default `desc`).
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default, rename = "sortBy")]
    pub sort_by: Option<String>,

    #[serde(default, rename = "sortType")]
    pub sort_type: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            page: default_page(),
            limit: default_limit(),
            sort_by: None,
            sort_type: None,
        }
    }
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Resolve `sortBy` against a whitelist of (api name, column expression)
    /// pairs. Unknown fields fall back to `default_column` rather than being
    /// spliced into SQL.
    pub fn order_by(&self, whitelist: &[(&str, &str)], default_column: &str) -> String {
        let column = self
            .sort_by
            .as_deref()
            .and_then(|requested| {
                whitelist
                    .iter()
                    .find(|(name, _)| *name == requested)
                    .map(|(_, col)| *col)
            })
            .unwrap_or(default_column);

        let direction = match self.sort_type.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };

        format!("{} {}", column, direction)
    }
}

/// One page of a listing view, with enough metadata for clients to compute
/// page count themselves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let limit = query.limit();
        Page {
            items,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, limit: i64, sort_by: Option<&str>, sort_type: Option<&str>) -> PageQuery {
        PageQuery {
            page,
            limit,
            sort_by: sort_by.map(String::from),
            sort_type: sort_type.map(String::from),
        }
    }

    #[test]
    fn defaults_are_page_one_limit_ten_desc() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.order_by(&[("title", "title")], "created_at"), "created_at DESC");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let q = query(0, 0, None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 1);

        let q = query(-3, 5000, None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_LIMIT);
    }

    #[test]
    fn offset_is_zero_based_from_one_based_page() {
        let q = query(3, 10, None, None);
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn sort_whitelist_resolves_known_fields() {
        let whitelist = [("createdAt", "v.created_at"), ("title", "v.title")];
        let q = query(1, 10, Some("title"), Some("asc"));
        assert_eq!(q.order_by(&whitelist, "v.created_at"), "v.title ASC");
    }

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let whitelist = [("createdAt", "v.created_at")];
        let q = query(1, 10, Some("owner_id; DROP TABLE videos"), None);
        assert_eq!(q.order_by(&whitelist, "v.created_at"), "v.created_at DESC");
    }

    #[test]
    fn anything_but_asc_sorts_descending() {
        let q = query(1, 10, None, Some("upside-down"));
        assert_eq!(q.order_by(&[], "created_at"), "created_at DESC");
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = query(1, 10, None, None);
        assert_eq!(Page::<u8>::new(vec![], 0, &q).total_pages, 0);
        assert_eq!(Page::<u8>::new(vec![], 10, &q).total_pages, 1);
        assert_eq!(Page::<u8>::new(vec![], 11, &q).total_pages, 2);
        assert_eq!(Page::<u8>::new(vec![], 95, &q).total_pages, 10);
    }
}
