//! Stable, cancellable adaptive merge sort.
//!
//! The sort detects natural runs (reversing strictly descending ones), extends short runs with
//! binary insertion sort, and merges runs off a stack while keeping the run-length invariants
//! that bound the stack depth. Every merge starts with a cancellation check, so a superseded
//! computation stops within one merge of the request.

use core::cmp::Ordering;

use crate::{CellValue, Row, SortDirection, SortKey};

/// Returned by cancellable operations that observed a cancellation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

const MIN_MERGE: usize = 32;

#[derive(Clone, Copy, Debug)]
struct Run {
    start: usize,
    len: usize,
}

/// Sorts `v` stably by `compare`.
///
/// `should_cancel` is consulted before every merge; on cancellation `v` holds an unspecified
/// permutation of its input and `Err(Cancelled)` is returned.
pub fn sort_by<T: Copy>(
    v: &mut [T],
    mut compare: impl FnMut(&T, &T) -> Ordering,
    mut should_cancel: impl FnMut() -> bool,
) -> Result<(), Cancelled> {
    let n = v.len();
    if n < 2 {
        return Ok(());
    }
    if n < MIN_MERGE {
        let run = count_run_and_make_ascending(v, &mut compare);
        binary_insertion_sort(v, run, &mut compare);
        return Ok(());
    }

    let min_run = min_run_length(n);
    let mut runs: Vec<Run> = Vec::with_capacity(40);
    let mut buf: Vec<T> = Vec::with_capacity(n / 2 + 1);

    let mut lo = 0;
    while lo < n {
        let mut len = count_run_and_make_ascending(&mut v[lo..], &mut compare);
        if len < min_run {
            let forced = min_run.min(n - lo);
            binary_insertion_sort(&mut v[lo..lo + forced], len, &mut compare);
            len = forced;
        }
        runs.push(Run { start: lo, len });
        merge_collapse(v, &mut runs, &mut buf, &mut compare, &mut should_cancel)?;
        lo += len;
    }

    while runs.len() > 1 {
        let mut i = runs.len() - 2;
        if i > 0 && runs[i - 1].len < runs[i + 1].len {
            i -= 1;
        }
        merge_at(v, &mut runs, i, &mut buf, &mut compare, &mut should_cancel)?;
    }
    Ok(())
}

/// Restores the run-stack invariants
/// `len[i-2] > len[i-1] + len[i]` and `len[i-1] > len[i]`.
fn merge_collapse<T: Copy>(
    v: &mut [T],
    runs: &mut Vec<Run>,
    buf: &mut Vec<T>,
    compare: &mut impl FnMut(&T, &T) -> Ordering,
    should_cancel: &mut impl FnMut() -> bool,
) -> Result<(), Cancelled> {
    while runs.len() > 1 {
        let mut i = runs.len() - 2;
        let broken_top = i > 0 && runs[i - 1].len <= runs[i].len + runs[i + 1].len;
        let broken_below = i > 1 && runs[i - 2].len <= runs[i - 1].len + runs[i].len;
        if broken_top || broken_below {
            if runs[i - 1].len < runs[i + 1].len {
                i -= 1;
            }
        } else if runs[i].len > runs[i + 1].len {
            break;
        }
        merge_at(v, runs, i, buf, compare, should_cancel)?;
    }
    Ok(())
}

fn merge_at<T: Copy>(
    v: &mut [T],
    runs: &mut Vec<Run>,
    i: usize,
    buf: &mut Vec<T>,
    compare: &mut impl FnMut(&T, &T) -> Ordering,
    should_cancel: &mut impl FnMut() -> bool,
) -> Result<(), Cancelled> {
    if should_cancel() {
        return Err(Cancelled);
    }
    let a = runs[i];
    let b = runs[i + 1];
    debug_assert_eq!(a.start + a.len, b.start);
    runs[i].len += b.len;
    runs.remove(i + 1);
    merge(&mut v[a.start..b.start + b.len], a.len, buf, compare);
    Ok(())
}

/// Merges the sorted halves `v[..mid]` and `v[mid..]`. Ties take the left element.
fn merge<T: Copy>(
    v: &mut [T],
    mid: usize,
    buf: &mut Vec<T>,
    compare: &mut impl FnMut(&T, &T) -> Ordering,
) {
    if mid == 0 || mid == v.len() {
        return;
    }
    // Already in order.
    if compare(&v[mid], &v[mid - 1]) != Ordering::Less {
        return;
    }
    buf.clear();
    buf.extend_from_slice(&v[..mid]);

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < buf.len() && j < v.len() {
        if compare(&v[j], &buf[i]) == Ordering::Less {
            v[k] = v[j];
            j += 1;
        } else {
            v[k] = buf[i];
            i += 1;
        }
        k += 1;
    }
    while i < buf.len() {
        v[k] = buf[i];
        i += 1;
        k += 1;
    }
}

/// Length of the run starting at `v[0]`; strictly descending runs are reversed in place.
fn count_run_and_make_ascending<T>(
    v: &mut [T],
    compare: &mut impl FnMut(&T, &T) -> Ordering,
) -> usize {
    let n = v.len();
    if n < 2 {
        return n;
    }
    let mut end = 2;
    if compare(&v[1], &v[0]) == Ordering::Less {
        while end < n && compare(&v[end], &v[end - 1]) == Ordering::Less {
            end += 1;
        }
        v[..end].reverse();
    } else {
        while end < n && compare(&v[end], &v[end - 1]) != Ordering::Less {
            end += 1;
        }
    }
    end
}

/// Sorts `v` given that `v[..sorted]` is already sorted.
fn binary_insertion_sort<T: Copy>(
    v: &mut [T],
    sorted: usize,
    compare: &mut impl FnMut(&T, &T) -> Ordering,
) {
    for i in sorted.max(1)..v.len() {
        let pivot = v[i];
        let (mut lo, mut hi) = (0, i);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if compare(&pivot, &v[mid]) == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        v[lo..=i].rotate_right(1);
    }
}

fn min_run_length(mut n: usize) -> usize {
    let mut r = 0;
    while n >= MIN_MERGE {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Orders two rows by `keys`, earlier keys first.
pub fn compare_rows(a: &Row, b: &Row, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = compare_values(
            a.cell(key.column).map(|c| &c.value),
            b.cell(key.column).map(|c| &c.value),
        );
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Missing cells sort first, then numbers (numerically), then text (lexicographically).
pub fn compare_values(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(CellValue::Number(x)), Some(CellValue::Number(y))) => x.total_cmp(y),
        (Some(CellValue::Number(_)), Some(CellValue::Text(_))) => Ordering::Less,
        (Some(CellValue::Text(_)), Some(CellValue::Number(_))) => Ordering::Greater,
        (Some(CellValue::Text(x)), Some(CellValue::Text(y))) => x.cmp(y),
    }
}
