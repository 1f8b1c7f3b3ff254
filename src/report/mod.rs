use std::collections::HashMap;

use serde::Serialize;

use crate::process::NormalizedRecord;

/// All of one operator's records, in emission order. This is the unit the
/// downstream renderer consumes, one document per group.
#[derive(Debug, Serialize)]
pub struct OperatorGroup {
    pub operator: String,
    pub records: Vec<NormalizedRecord>,
}

impl OperatorGroup {
    /// Rows partitioned by their delivery-date display string: first-seen
    /// date order, row order preserved within each date.
    pub fn rows_by_date(&self) -> Vec<(&str, Vec<&NormalizedRecord>)> {
        let mut order: Vec<&str> = Vec::new();
        let mut buckets: HashMap<&str, Vec<&NormalizedRecord>> = HashMap::new();
        for record in &self.records {
            let date = record.date.as_str();
            if !buckets.contains_key(date) {
                order.push(date);
            }
            buckets.entry(date).or_default().push(record);
        }
        order
            .into_iter()
            .map(|date| (date, buckets.remove(date).unwrap_or_default()))
            .collect()
    }
}

/// Partition records by operator, preserving first-seen operator order and
/// row order. Pure grouping, no business logic.
pub fn group_by_operator(records: Vec<NormalizedRecord>) -> Vec<OperatorGroup> {
    let mut groups: Vec<OperatorGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.operator == record.operator) {
            Some(group) => group.records.push(record),
            None => groups.push(OperatorGroup {
                operator: record.operator.clone(),
                records: vec![record],
            }),
        }
    }
    groups
}
