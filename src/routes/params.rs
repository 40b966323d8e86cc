use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Deepest page any list endpoint will serve.
pub const MAX_PAGE: i64 = 10_000;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// `(page, limit, offset)` with a default page size of 20.
    pub fn normalize(&self) -> (i64, i64, i64) {
        self.normalize_with(20, 100)
    }

    pub fn normalize_with(&self, default_limit: i64, max_limit: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit);
        let offset = (page - 1) * limit;
        (page, limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination::new(0, 1000);
        assert_eq!(p.normalize_with(10, 50), (1, 50, 0));
        let p = Pagination::new(3, 10);
        assert_eq!(p.normalize_with(10, 50), (3, 10, 20));
    }

    #[test]
    fn huge_page_is_capped_instead_of_overflowing() {
        let (page, limit, offset) = Pagination::new(i64::MAX, 50).normalize_with(10, 50);
        assert_eq!(page, MAX_PAGE);
        assert_eq!(limit, 50);
        assert_eq!(offset, (MAX_PAGE - 1) * 50);
        let (page, _, offset) = Pagination::new(i64::MIN, i64::MIN).normalize();
        assert_eq!((page, offset), (1, 0));
    }

    #[test]
    fn per_page_is_accepted_as_limit() {
        let p: Pagination = serde_json::from_str(r#"{"page": 2, "per_page": 5}"#).unwrap();
        assert_eq!(p.normalize(), (2, 5, 5));
    }
}
