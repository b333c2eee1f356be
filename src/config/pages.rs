//! Page-range expressions.
//!
//! Grammar: comma-separated tokens, each one of `<n>`, `<a>-<b>`, `<a>-` or
//! `-<b>`. Pages are 1-indexed and inclusive; an open end means "through the
//! last page".

use serde::Serialize;
use thiserror::Error;

/// Sentinel used in tuple form for "through the last page".
pub const LAST_PAGE: i64 = -1;

/// Rejection of one token of a page expression. Every variant names the token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    #[error("invalid page number format: {token:?}")]
    InvalidFormat { token: String },

    #[error("invalid page number: {token:?}")]
    InvalidPage { token: String },

    #[error("invalid start page number in {token:?}")]
    InvalidStart { token: String },

    #[error("invalid end page number in {token:?}")]
    InvalidEnd { token: String },

    #[error("start page {start} is greater than end page {end} in {token:?}")]
    StartAfterEnd { token: String, start: i64, end: i64 },
}

impl PageRangeError {
    /// The exact token that was rejected.
    pub fn token(&self) -> &str {
        match self {
            PageRangeError::InvalidFormat { token }
            | PageRangeError::InvalidPage { token }
            | PageRangeError::InvalidStart { token }
            | PageRangeError::InvalidEnd { token }
            | PageRangeError::StartAfterEnd { token, .. } => token,
        }
    }
}

/// Inclusive, 1-indexed page span. `end == None` means "through the last page".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageRange {
    start: u32,
    end: Option<u32>,
}

impl PageRange {
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> Option<u32> {
        self.end
    }

    /// `(start, end)` with [`LAST_PAGE`] standing in for an open end.
    pub fn as_tuple(&self) -> (i64, i64) {
        (
            i64::from(self.start),
            self.end.map(i64::from).unwrap_or(LAST_PAGE),
        )
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= self.start && self.end.map_or(true, |end| page <= end)
    }
}

/// Parse a page expression.
///
/// `None` and the empty string mean "no restriction" and yield `Ok(None)`.
/// The first bad token aborts the whole parse.
pub fn parse_pages(expr: Option<&str>) -> Result<Option<Vec<PageRange>>, PageRangeError> {
    let expr = match expr {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let mut ranges = Vec::new();
    for raw in expr.split(',') {
        let token = raw.trim();
        ranges.push(parse_token(token)?);
    }
    Ok(Some(ranges))
}

fn parse_token(token: &str) -> Result<PageRange, PageRangeError> {
    if !token.contains('-') {
        let page = parse_number(token).ok_or_else(|| PageRangeError::InvalidFormat {
            token: token.to_string(),
        })?;
        if page < 1 {
            return Err(PageRangeError::InvalidPage {
                token: token.to_string(),
            });
        }
        let page = to_page(page, token)?;
        return Ok(PageRange {
            start: page,
            end: Some(page),
        });
    }

    let parts: Vec<&str> = token.split('-').map(str::trim).collect();
    let (start_str, end_str) = match parts.as_slice() {
        [start, end] => (*start, *end),
        _ => {
            return Err(PageRangeError::InvalidFormat {
                token: token.to_string(),
            })
        }
    };

    let start = if start_str.is_empty() {
        1
    } else {
        parse_number(start_str).ok_or_else(|| PageRangeError::InvalidFormat {
            token: token.to_string(),
        })?
    };
    let end = if end_str.is_empty() {
        LAST_PAGE
    } else {
        parse_number(end_str).ok_or_else(|| PageRangeError::InvalidFormat {
            token: token.to_string(),
        })?
    };

    if !start_str.is_empty() && start < 1 {
        return Err(PageRangeError::InvalidStart {
            token: token.to_string(),
        });
    }
    // Splitting on '-' leaves no sign on the end, so this only guards a
    // change of separator.
    if end < LAST_PAGE {
        return Err(PageRangeError::InvalidEnd {
            token: token.to_string(),
        });
    }
    if end != LAST_PAGE && start > end {
        return Err(PageRangeError::StartAfterEnd {
            token: token.to_string(),
            start,
            end,
        });
    }

    Ok(PageRange {
        start: to_page(start, token)?,
        end: if end == LAST_PAGE {
            None
        } else {
            Some(to_page(end, token)?)
        },
    })
}

fn parse_number(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

// start > end is already rejected, so a surviving end of 0 cannot reach here.
fn to_page(n: i64, token: &str) -> Result<u32, PageRangeError> {
    u32::try_from(n).map_err(|_| PageRangeError::InvalidFormat {
        token: token.to_string(),
    })
}

/// Parsed page restriction of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSelection {
    ranges: Option<Vec<PageRange>>,
}

impl PageSelection {
    pub fn all() -> Self {
        Self { ranges: None }
    }

    pub fn from_ranges(ranges: Option<Vec<PageRange>>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> Option<&[PageRange]> {
        self.ranges.as_deref()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.ranges.is_none()
    }

    /// Whether the 1-indexed `page` is selected.
    pub fn contains(&self, page: u32) -> bool {
        match &self.ranges {
            None => true,
            Some(ranges) => ranges.iter().any(|r| r.contains(page)),
        }
    }
}
