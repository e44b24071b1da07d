//! Property-based tests for manifest aggregation.
//!
//! These tests use proptest to generate random record sets and verify that
//! the determinism and conflict-resolution invariants hold for all inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::{aggregate, Manifest, ScanRecord};
    use crate::metadata::RepoMetadata;
    use crate::writer;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use std::path::Path;

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, root: &str) -> ScanRecord {
        ScanRecord {
            root: root.into(),
            metadata: RepoMetadata {
                id: id.to_string(),
                one_liner: format!("project {id}"),
                ..RepoMetadata::default()
            },
            source_mtime: 1_700_000_000,
        }
    }

    fn build(records: Vec<ScanRecord>) -> Manifest {
        aggregate(Path::new("/src"), records, fixed_timestamp())
    }

    /// Ids drawn from a tiny alphabet so collisions are common; roots are
    /// made distinct by position.
    fn colliding_records() -> impl Strategy<Value = Vec<ScanRecord>> {
        prop::collection::vec("[a-c]{1,2}", 0..12).prop_map(|ids| {
            ids.into_iter()
                .enumerate()
                .map(|(i, id)| record(&id, &format!("/src/p{i:02}")))
                .collect()
        })
    }

    fn records_and_shuffle() -> impl Strategy<Value = (Vec<ScanRecord>, Vec<ScanRecord>)> {
        colliding_records()
            .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
    }

    // ============================================================================
    // determinism properties
    // ============================================================================

    proptest! {
        /// Property: aggregation is insensitive to record order
        #[test]
        fn aggregate_is_order_insensitive((original, shuffled) in records_and_shuffle()) {
            prop_assert_eq!(build(original), build(shuffled));
        }

        /// Property: the serialized document is byte-identical across orderings
        #[test]
        fn serialized_manifest_is_order_insensitive(
            (original, shuffled) in records_and_shuffle(),
        ) {
            let a = writer::to_json_string(&build(original)).unwrap();
            let b = writer::to_json_string(&build(shuffled)).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: aggregating the same records twice gives the same manifest
        #[test]
        fn aggregate_is_deterministic(records in colliding_records()) {
            prop_assert_eq!(build(records.clone()), build(records));
        }
    }

    // ============================================================================
    // conflict-resolution properties
    // ============================================================================

    proptest! {
        /// Property: each id appears at most once among projects, and the
        /// project list is sorted by id
        #[test]
        fn project_ids_are_unique_and_sorted(records in colliding_records()) {
            let manifest = build(records);
            let ids: Vec<&str> = manifest.projects.iter().map(|p| p.id.as_str()).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(ids, sorted);
        }

        /// Property: every conflict keeps the lexicographically smallest path,
        /// and that path is the one in the project list
        #[test]
        fn conflicts_keep_first_path(records in colliding_records()) {
            let manifest = build(records);
            for conflict in &manifest.conflicts {
                let smallest = conflict.paths.iter().min().unwrap();
                prop_assert_eq!(&conflict.kept_path, smallest);

                let mut sorted = conflict.paths.clone();
                sorted.sort();
                prop_assert_eq!(&conflict.paths, &sorted);

                let kept = manifest
                    .projects
                    .iter()
                    .find(|p| p.id == conflict.id)
                    .unwrap();
                prop_assert_eq!(&kept.path, &conflict.kept_path);
            }
        }

        /// Property: projects plus conflict losers account for every record
        /// (roots are distinct by construction)
        #[test]
        fn conflicts_account_for_all_records(records in colliding_records()) {
            let total = records.len();
            let manifest = build(records);
            let losers: usize = manifest
                .conflicts
                .iter()
                .map(|c| c.paths.len() - 1)
                .sum();
            prop_assert_eq!(manifest.projects.len() + losers, total);
        }
    }
}
