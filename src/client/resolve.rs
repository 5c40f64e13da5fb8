//! Strict name and ID resolution over freshly fetched collections
//!
//! Lookups match exactly (case-sensitive, no prefixes). Bulk filters are
//! all-or-nothing: the first requested key that is missing fails the whole
//! call and nothing already matched is returned.

use crate::domain::resources::Resource;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::warn;

/// Return the first resource whose name equals `name`
pub fn find_by_name<T: Resource>(items: Vec<T>, name: &str) -> Result<T> {
    items
        .into_iter()
        .find(|item| item.name() == name)
        .ok_or_else(|| Error::name_not_found(T::KIND, name))
}

/// Select the resources named in `names`, in the order requested.
///
/// An empty `names` returns `items` untouched. When two fetched resources
/// share a name, the later one wins.
pub fn filter_by_names<T, S>(items: Vec<T>, names: &[S]) -> Result<Vec<T>>
where
    T: Resource + Clone,
    S: AsRef<str>,
{
    if names.is_empty() {
        return Ok(items);
    }

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(prev) = index.insert(item.name(), i) {
            warn!(
                kind = %T::KIND,
                name = item.name(),
                shadowed = %items[prev].id(),
                kept = %item.id(),
                "duplicate name in fetched collection"
            );
        }
    }

    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            index
                .get(name)
                .map(|&i| items[i].clone())
                .ok_or_else(|| Error::name_not_found(T::KIND, name))
        })
        .collect()
}

/// Select the resources identified by `ids`, in the order requested.
///
/// An empty `ids` returns `items` untouched.
pub fn filter_by_ids<T>(items: Vec<T>, ids: &[T::Id]) -> Result<Vec<T>>
where
    T: Resource + Clone,
{
    if ids.is_empty() {
        return Ok(items);
    }

    let index: HashMap<&T::Id, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), i))
        .collect();

    ids.iter()
        .map(|id| {
            index
                .get(id)
                .map(|&i| items[i].clone())
                .ok_or_else(|| Error::id_not_found(T::KIND, id))
        })
        .collect()
}
