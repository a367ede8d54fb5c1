//! Page result types

use serde::{Deserialize, Serialize};

/// Navigation data for a returned page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// URL-safe token for the previous page, `None` when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    /// URL-safe token for the next page, `None` when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    pub has_previous: bool,

    pub has_next: bool,

    /// Records matching the base filter, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// One page of records in the caller's requested order.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub cursor: PageCursor,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, PageCursor) {
        (self.records, self.cursor)
    }

    /// Convert records, keeping the cursor.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            cursor: self.cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_serializes_camel_case_without_empty_tokens() {
        let cursor = PageCursor {
            previous: None,
            next: Some("abc".into()),
            has_previous: false,
            has_next: true,
            total_count: None,
        };
        let json = serde_json::to_value(&cursor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "next": "abc", "hasPrevious": false, "hasNext": true })
        );
    }

    #[test]
    fn test_map_keeps_cursor() {
        let page = Page {
            records: vec![1, 2],
            cursor: PageCursor {
                has_next: true,
                next: Some("t".into()),
                ..PageCursor::default()
            },
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.records, vec![10, 20]);
        assert!(mapped.cursor.has_next);
    }
}
