pub mod auth_dto;
pub mod lead_dto;
pub mod user_dto;
pub mod zalo_dto;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(current: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            current,
            pages,
            total,
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.pages, 3);
        assert_eq!(p.total, 25);
    }

    #[test]
    fn pagination_empty_set_has_zero_pages() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.pages, 0);
    }
}
