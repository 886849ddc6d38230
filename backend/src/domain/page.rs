//! Offset pagination shared by the list, item and user filters.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Optional `(limit, offset)` window. Zero means "not set".
///
/// # Examples
/// ```
/// use todo_backend::domain::Page;
///
/// let page = Page::new(10, 0);
/// assert_eq!(page.limit(), Some(10));
/// assert_eq!(page.offset(), None);
/// assert!(Page::default().is_unbounded());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, IntoParams,
)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct Page {
    /// Maximum number of rows; `0` disables the limit.
    limit: u32,
    /// Rows to skip; `0` disables the offset.
    offset: u32,
}

impl Page {
    /// Build a window from raw values.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Limit to apply, if any.
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        if self.limit > 0 { Some(self.limit) } else { None }
    }

    /// Offset to apply, if any.
    #[must_use]
    pub const fn offset(self) -> Option<u32> {
        if self.offset > 0 { Some(self.offset) } else { None }
    }

    /// True when neither limit nor offset restricts the result.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        self.limit == 0 && self.offset == 0
    }

    /// Apply the window to an already ordered sequence.
    pub fn apply<T>(self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = rows
            .into_iter()
            .skip(self.offset().map_or(0, |offset| offset as usize));
        match self.limit() {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Page::new(0, 0), vec![1, 2, 3, 4, 5])]
    #[case(Page::new(2, 0), vec![1, 2])]
    #[case(Page::new(0, 3), vec![4, 5])]
    #[case(Page::new(2, 1), vec![2, 3])]
    #[case(Page::new(10, 10), vec![])]
    fn apply_windows_ordered_rows(#[case] page: Page, #[case] expected: Vec<i32>) {
        assert_eq!(page.apply(vec![1, 2, 3, 4, 5]), expected);
    }
}
