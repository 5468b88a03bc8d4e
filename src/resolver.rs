// 🎯 Record Resolver
// Sorts a filtered table into a choice list and resolves the chosen record.

use crate::error::{LookupError, LookupResult};
use crate::records::Filterable;
use std::cmp::Ordering;

/// Display-name order: code-point ascending, unnamed records last
fn by_display_name<R: Filterable>(a: &R, b: &R) -> Ordering {
    match (a.display_name(), b.display_name()) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort in place by display name. Stable, so duplicate names keep their
/// relative input order.
pub fn sort_by_display_name<R: Filterable>(records: &mut [R]) {
    records.sort_by(by_display_name);
}

/// Sorted copy of a table
pub fn sorted<R: Filterable + Clone>(records: &[R]) -> Vec<R> {
    let mut sorted = records.to_vec();
    sort_by_display_name(&mut sorted);
    sorted
}

/// Distinct display names in sorted order (the choice list shown to the user)
pub fn choices<R: Filterable>(records: &[R]) -> Vec<String> {
    let mut names: Vec<&str> = records.iter().filter_map(|r| r.display_name()).collect();
    names.sort_unstable();
    names.dedup();
    names.into_iter().map(str::to_string).collect()
}

/// First record, in display-name order, whose name equals `key` exactly
pub fn resolve<R: Filterable + Clone>(records: &[R], key: &str) -> LookupResult<R> {
    if records.is_empty() {
        return Err(LookupError::EmptyResult);
    }

    let sorted = sorted(records);

    sorted
        .into_iter()
        .find(|record| record.display_name() == Some(key))
        .ok_or_else(|| LookupError::not_found(key))
}
