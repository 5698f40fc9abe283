use crate::types::Record;

/// Merges one submission record with each of its comment records, one
/// output record per (submission, comment) pair. Comment fields win when
/// both sides carry the same name.
///
/// A submission with no comments contributes zero records, which makes it
/// invisible in the combined CSV. That is the shipped behaviour, kept
/// deliberately; tests assert it.
pub fn join_records(parent: &Record, children: &[Record]) -> Vec<Record> {
    children
        .iter()
        .map(|child| {
            let mut merged = parent.clone();
            for (key, value) in child {
                merged.insert(key.clone(), value.clone());
            }
            merged
        })
        .collect()
}
