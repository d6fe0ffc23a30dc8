//! Rerun filtering of collected test items

use std::collections::HashMap;

use shared::messages::RerunTest;

use crate::types::TestItem;

/// Retain only the items the rerun decision names, preserving input order
/// and annotating each with its remote id so registration updates instead of
/// creating.
///
/// Matching is by test name alone; remote entries without correlation data
/// are ignored. An empty remote list means "run everything".
pub fn filter_items(items: Vec<TestItem>, tests_to_run: &[RerunTest]) -> Vec<TestItem> {
    if tests_to_run.is_empty() {
        return items;
    }

    let by_name: HashMap<&str, &RerunTest> = tests_to_run
        .iter()
        .filter(|test| test.correlation_data.is_some())
        .map(|test| (test.name.as_str(), test))
        .collect();

    items
        .into_iter()
        .filter_map(|mut item| {
            let remote = by_name.get(item.name.as_str())?;
            item.reportal_id = Some(remote.id);
            Some(item)
        })
        .collect()
}
