//! Argument validation shared by the sequence adapters.
//!
//! Offsets arrive as signed integers because that is what managed callers
//! pass across the boundary. Negative values are a `Range` failure, a
//! window that overruns either side is an `Argument` failure.

use crate::error::{InteropError, Result};
use std::ops::Range;

/// A validated `copy_to` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CopyWindow {
    pub src: Range<usize>,
    pub dest: Range<usize>,
}

fn non_negative(param: &'static str, value: i64, len: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| InteropError::range(param, value, len))
}

/// Validate `copy_to(src_start, dest, dest_start, count)`.
pub(crate) fn copy_window(
    src_len: usize,
    src_start: i64,
    dest_len: usize,
    dest_start: i64,
    count: i64,
) -> Result<CopyWindow> {
    let src_start = non_negative("src_start", src_start, src_len)?;
    let dest_start = non_negative("dest_start", dest_start, dest_len)?;
    let count = non_negative("count", count, src_len)?;

    if src_start.saturating_add(count) > src_len {
        return Err(InteropError::Argument(format!(
            "source window {src_start}+{count} exceeds source length {src_len}"
        )));
    }
    if dest_start.saturating_add(count) > dest_len {
        return Err(InteropError::Argument(format!(
            "destination window {dest_start}+{count} exceeds destination length {dest_len}"
        )));
    }

    Ok(CopyWindow {
        src: src_start..src_start + count,
        dest: dest_start..dest_start + count,
    })
}

/// Validate copying an entire container of `len` elements into a
/// destination of `dest_len` slots starting at `dest_start`.
pub(crate) fn whole_copy_window(len: usize, dest_len: usize, dest_start: i64) -> Result<Range<usize>> {
    let start = non_negative("dest_start", dest_start, dest_len)?;
    if start > dest_len {
        return Err(InteropError::range("dest_start", dest_start, dest_len));
    }
    if dest_len - start < len {
        return Err(InteropError::Argument(format!(
            "destination has {} free slots from {start}, {len} required",
            dest_len - start
        )));
    }
    Ok(start..start + len)
}

/// Validate a `[start, start + count)` sub-range of a sequence.
pub(crate) fn sub_range(len: usize, start: i64, count: i64) -> Result<Range<usize>> {
    let start_at = non_negative("start", start, len)?;
    let count = non_negative("count", count, len)?;
    if start_at.saturating_add(count) > len {
        return Err(InteropError::Argument(format!(
            "range {start_at}+{count} exceeds length {len}"
        )));
    }
    Ok(start_at..start_at + count)
}

/// Validate an element index for get/set/remove.
pub(crate) fn element_index(len: usize, index: i64) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i < len => Ok(i),
        _ => Err(InteropError::range("index", index, len)),
    }
}

/// Validate an insertion point, which may equal `len`.
pub(crate) fn insert_index(len: usize, index: i64) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i <= len => Ok(i),
        _ => Err(InteropError::range("index", index, len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_offsets_are_range_errors() {
        assert!(matches!(
            copy_window(4, -1, 10, 0, 0),
            Err(InteropError::Range { param: "src_start", .. })
        ));
        assert!(matches!(
            copy_window(4, 0, 10, -1, 0),
            Err(InteropError::Range { param: "dest_start", .. })
        ));
        assert!(matches!(
            copy_window(4, 0, 10, 0, -1),
            Err(InteropError::Range { param: "count", .. })
        ));
    }

    #[test]
    fn test_overrun_is_argument_error() {
        assert!(matches!(copy_window(4, 0, 10, 0, 11), Err(InteropError::Argument(_))));
        assert!(matches!(copy_window(4, 3, 10, 0, 2), Err(InteropError::Argument(_))));
        assert!(matches!(copy_window(4, 0, 10, 9, 2), Err(InteropError::Argument(_))));
    }

    #[test]
    fn test_partial_window() {
        let w = copy_window(4, 0, 10, 7, 2).unwrap();
        assert_eq!(w.src, 0..2);
        assert_eq!(w.dest, 7..9);
    }

    #[test]
    fn test_whole_copy_window() {
        assert_eq!(whole_copy_window(5, 7, 2).unwrap(), 2..7);
        assert!(matches!(whole_copy_window(2, 5, -1), Err(InteropError::Range { .. })));
        assert!(matches!(whole_copy_window(2, 5, 4), Err(InteropError::Argument(_))));
        assert!(matches!(whole_copy_window(0, 5, 6), Err(InteropError::Range { .. })));
    }

    #[test]
    fn test_indices() {
        assert_eq!(element_index(3, 2).unwrap(), 2);
        assert!(element_index(3, 3).is_err());
        assert!(element_index(3, -1).is_err());
        assert_eq!(insert_index(3, 3).unwrap(), 3);
        assert!(insert_index(3, 4).is_err());
        assert_eq!(sub_range(4, 2, 2).unwrap(), 2..4);
        assert!(matches!(sub_range(4, 3, 2), Err(InteropError::Argument(_))));
    }
}
