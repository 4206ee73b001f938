//! FILENAME: core/pivot-engine/src/paginate.rs
//! Pagination - slicing the flattened rows into pages.
//!
//! Only data rows count against the page budget; subtotal rows ride along
//! for free, so the number of pages depends only on the leaf-row count.
//! A page runs from its first data row to its last data row, then extends
//! through the subtotal rows that immediately follow it. A subtotal
//! therefore lands on the page holding the last data row of its group, and
//! every subtotal appears on exactly one page.

use std::ops::Range;

use crate::flatten::FlatRow;

/// Number of non-subtotal rows.
pub fn leaf_row_count(rows: &[FlatRow]) -> usize {
    rows.iter().filter(|r| !r.is_subtotal).count()
}

/// Number of pages needed to show every data row.
pub fn page_count(rows: &[FlatRow], page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    leaf_row_count(rows).div_ceil(page_size)
}

/// Index range of `page` within `rows`, or `None` when the page is empty
/// (no rows, page past the end, or a zero page size).
///
/// Walks the rows once and stops at the page's last data row. The subtotals
/// directly after it close groups that end with that row, so they are
/// taken along.
pub fn page_bounds(rows: &[FlatRow], page: usize, page_size: usize) -> Option<Range<usize>> {
    if page_size == 0 {
        return None;
    }
    let skip = page.checked_mul(page_size)?;

    let mut leaves = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_subtotal)
        .map(|(i, _)| i)
        .skip(skip);
    let first = leaves.next()?;
    let last = leaves.take(page_size - 1).last().unwrap_or(first);

    let anchor = &rows[last].path;
    let trailing = rows[last + 1..]
        .iter()
        .take_while(|r| r.is_subtotal && anchor.starts_with(&r.path))
        .count();
    let end = last + 1 + trailing;

    log::trace!(
        "page {} (size {}): flat rows {}..{}",
        page,
        page_size,
        first,
        end
    );
    Some(first..end)
}

/// The rows shown on `page`. Empty when the page is out of range.
pub fn paginate(rows: &[FlatRow], page: usize, page_size: usize) -> &[FlatRow] {
    match page_bounds(rows, page, page_size) {
        Some(range) => &rows[range],
        None => &[],
    }
}
