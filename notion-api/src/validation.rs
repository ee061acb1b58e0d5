//! Validation functions
//!

use snafu::prelude::*;

use crate::{
    Result,
    config::{
        MAX_PAGE_SIZE, VALIDATION_BODY_MAX_LEN, VALIDATION_MAX_PROPERTIES,
        VALIDATION_MAX_QUERY_LEN, VALIDATION_RICH_TEXT_MAX_LEN,
    },
    prelude::*,
};

/// Determine if a string is (probably) a page, database, or block id,
/// using syntactic checks: 32 hex digits, with or without the dashes
/// of the 8-4-4-4-12 uuid form.
/// Does not check whether the apparent-id represents an actual object.
pub fn looks_like_notion_id(s: &str) -> bool {
    match s.len() {
        32 => s.bytes().all(|b| b.is_ascii_hexdigit()),
        36 => s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        }),
        _ => false,
    }
}

/// Validation limits for safety & sanity checking.
/// Requests that exceed a limit fail locally with `NotionError::Validation`
/// instead of making a round trip that the API would reject.
/// All limits can be adjusted at client creation time
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// max characters in a single rich text content string
    pub rich_text_max_len: usize,

    /// max size of a request body in bytes
    pub body_max_len: usize,

    /// max number of properties in a database schema or page record
    pub max_properties: usize,

    /// max page size for list endpoints
    pub max_page_size: u32,

    /// max size of a query (total length of key=value params)
    pub max_query_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            // api limit for text.content (2000 characters)
            rich_text_max_len: VALIDATION_RICH_TEXT_MAX_LEN,
            // max size of request body (default: 500 KiB)
            body_max_len: VALIDATION_BODY_MAX_LEN,
            // max properties per schema or record (default: 100)
            max_properties: VALIDATION_MAX_PROPERTIES,
            max_page_size: MAX_PAGE_SIZE,
            // max size of query string (approximate) (default: 4000 bytes)
            max_query_len: VALIDATION_MAX_QUERY_LEN,
        }
    }
}

impl ValidationLimits {
    /// Checks an object id: not empty, and 32 hex digits with optional dashes
    #[doc(hidden)]
    pub fn validate_id(&self, id: &str, description: &str) -> Result<()> {
        ensure!(
            !id.is_empty(),
            ValidationSnafu {
                message: format!("{description} cannot be empty"),
            }
        );
        ensure!(
            looks_like_notion_id(id),
            ValidationSnafu {
                message: format!("{description} not a valid id: '{id}'"),
            }
        );
        Ok(())
    }

    #[doc(hidden)]
    pub fn validate_page_size(&self, page_size: u32, description: &str) -> Result<()> {
        ensure!(
            (1..=self.max_page_size).contains(&page_size),
            ValidationSnafu {
                message: format!(
                    "{description} page_size must be between 1 and {} (got {page_size})",
                    self.max_page_size
                ),
            }
        );
        Ok(())
    }

    #[doc(hidden)]
    pub fn validate_rich_text(&self, content: &str, description: &str) -> Result<()> {
        let len = content.chars().count();
        ensure!(
            len <= self.rich_text_max_len,
            ValidationSnafu {
                message: format!(
                    "{description} text too long: {len} characters (max: {})",
                    self.rich_text_max_len
                ),
            }
        );
        Ok(())
    }

    #[doc(hidden)]
    pub fn validate_num_properties(&self, count: usize, description: &str) -> Result<()> {
        ensure!(
            count <= self.max_properties,
            ValidationSnafu {
                message: format!(
                    "{description} too many properties: {count} (max: {})",
                    self.max_properties
                ),
            }
        );
        Ok(())
    }

    #[doc(hidden)]
    pub fn validate_body(&self, bytes: &bytes::Bytes, description: &str) -> Result<()> {
        ensure!(
            bytes.len() <= self.body_max_len,
            ValidationSnafu {
                message: format!(
                    "{description} body too long: {} bytes (max: {})",
                    bytes.len(),
                    self.body_max_len
                ),
            }
        );
        Ok(())
    }

    #[doc(hidden)]
    pub fn validate_query(&self, query: &[(String, String)]) -> Result<()> {
        let mut query_size = 0;
        for (key, val) in query {
            query_size += key.len() + val.len() + 1;
        }
        ensure!(
            query_size <= self.max_query_len,
            ValidationSnafu {
                message: format!("query too long {query_size}")
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_id() -> Result<()> {
        let limits = ValidationLimits::default();

        limits.validate_id("668d797c76fa49349b05ad288df2d136", "database_id")?;
        limits.validate_id("668d797c-76fa-4934-9b05-ad288df2d136", "database_id")?;

        assert!(limits.validate_id("", "page_id").is_err(), "empty id");
        assert!(limits.validate_id("short", "page_id").is_err(), "too short");

        let err = limits.validate_id("not-a-notion-id", "page_id").unwrap_err();
        assert!(matches!(err, NotionError::Validation { .. }));
        assert!(err.to_string().contains("page_id"));
        Ok(())
    }

    #[test]
    fn test_looks_like_notion_id() {
        for good_example in [
            "668d797c76fa49349b05ad288df2d136",
            "668D797C76FA49349B05AD288DF2D136",
            "668d797c-76fa-4934-9b05-ad288df2d136",
        ] {
            assert!(looks_like_notion_id(good_example), "{good_example}");
        }

        for bad_example in [
            "668d797c76fa49349b05ad288df2d13",   // too short
            "668d797c76fa49349b05ad288df2d1366", // too long
            "668d797c76fa49349b05ad288df2d13g",  // non-hex
            "668d797c-76fa4934-9b05-ad288df2d1366", // dash in wrong place
        ] {
            assert!(!looks_like_notion_id(bad_example), "{bad_example}");
        }
    }

    #[test]
    fn test_validate_page_size() -> Result<()> {
        let limits = ValidationLimits::default();
        limits.validate_page_size(1, "query")?;
        limits.validate_page_size(100, "query")?;
        assert!(limits.validate_page_size(0, "query").is_err());
        assert!(limits.validate_page_size(101, "query").is_err());
        Ok(())
    }

    #[test]
    fn test_validate_rich_text() -> Result<()> {
        let limits = ValidationLimits::default();
        limits.validate_rich_text("hello", "title")?;
        // counted in characters, not bytes
        limits.validate_rich_text(&"é".repeat(limits.rich_text_max_len), "title")?;
        let long = "x".repeat(limits.rich_text_max_len + 1);
        assert!(limits.validate_rich_text(&long, "title").is_err());
        Ok(())
    }

    #[test]
    fn test_validate_num_properties() -> Result<()> {
        let limits = ValidationLimits::default();
        limits.validate_num_properties(3, "record")?;
        assert!(
            limits
                .validate_num_properties(limits.max_properties + 1, "record")
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_validate_query() -> Result<()> {
        let limits = ValidationLimits::default();
        limits.validate_query(&[("start_cursor".into(), "abc".into())])?;
        let long = vec![("k".to_string(), "v".repeat(limits.max_query_len))];
        assert!(limits.validate_query(&long).is_err());
        Ok(())
    }
}
