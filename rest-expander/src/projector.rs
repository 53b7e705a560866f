//! Field projection over expanded records

use crate::filter::FilterTree;
use crate::value::{GenericValue, Record};

/// Keep only the fields `fields` selects, recursing into maps and lists.
///
/// An empty tree at any level keeps that level whole. Lists are projected
/// element by element with the tree of the field that holds them.
pub fn project(record: Record, fields: &FilterTree) -> Record {
    if fields.is_empty() {
        return record;
    }

    record
        .into_iter()
        .filter(|(key, _)| fields.contains(key))
        .map(|(key, value)| {
            let value = project_value(value, fields.get(&key));
            (key, value)
        })
        .collect()
}

fn project_value(value: GenericValue, fields: &FilterTree) -> GenericValue {
    match value {
        GenericValue::Map(map) => GenericValue::Map(project(map, fields)),
        GenericValue::List(items) => GenericValue::List(
            items
                .into_iter()
                .map(|item| project_value(item, fields))
                .collect(),
        ),
        other => other,
    }
}
