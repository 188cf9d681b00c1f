use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::dataset::{
    ClassifiedDataSet, ClassifiedGroup, ClassifiedSet, DataSet, GroupedDataSet, GroupedValues,
    name_alias,
};

/// Internal-consistency failures of the classifier. These indicate a bug
/// in the grouping stage or a malformed input relation, never a
/// user-recoverable condition; callers should abort the computation.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("label {label:?} has no classified set (alias {alias})")]
    UnknownLabel { label: String, alias: String },
    #[error("alias {alias} has no classified set in the arena")]
    UnknownAlias { alias: String },
}

/// Partition the values of a dataset by identical label signature. Two
/// values land in the same group iff their label sets are equal.
pub fn group_dataset(data: &DataSet) -> GroupedDataSet {
    let mut grouped: BTreeMap<String, GroupedValues> = BTreeMap::new();

    for (value, labels) in &data.data_with_labels {
        let alias = crate::dataset::signature_alias(labels);
        grouped
            .entry(alias)
            .or_insert_with(|| GroupedValues {
                labels: labels.clone(),
                values: BTreeSet::new(),
            })
            .values
            .insert(value.clone());
    }

    GroupedDataSet {
        data: data.clone(),
        grouped_data: grouped,
    }
}

/// Classify every pair of sets and every group against the sets.
///
/// Pairwise set classification is total and mutually exclusive: each
/// unordered pair ends up as parent/child, intersecting, or disjoint,
/// never more than one. Subset detection takes priority, so a contained
/// set is never also registered as a plain intersection.
pub fn classify_dataset(grouped: &GroupedDataSet) -> Result<ClassifiedDataSet, ClassifyError> {
    let mut sets: BTreeMap<String, ClassifiedSet> = grouped
        .data
        .labels
        .iter()
        .map(|label| {
            let set = ClassifiedSet::new(label);
            (set.alias.clone(), set)
        })
        .collect();

    // Containment first: the first qualifying superset in iteration
    // order wins, since only containment matters for the geometry, not
    // degree of containment. Running this to completion before the
    // overlap pass keeps subset priority independent of label order.
    for (label, values) in &grouped.data.labels_with_data {
        let alias = name_alias(label);
        if !sets.contains_key(&alias) {
            return Err(ClassifyError::UnknownLabel {
                label: label.clone(),
                alias,
            });
        }

        for (other_label, other_values) in &grouped.data.labels_with_data {
            if label == other_label {
                continue;
            }
            let other_alias = name_alias(other_label);
            let other = sets
                .get_mut(&other_alias)
                .ok_or_else(|| ClassifyError::UnknownLabel {
                    label: other_label.clone(),
                    alias: other_alias.clone(),
                })?;

            if other_values.is_subset(values) && other.parent.is_none() {
                other.parent = Some(alias.clone());
            }
        }
    }

    // Every remaining pair is intersecting or disjoint by value
    // overlap. A recorded containment is never doubled as a plain
    // intersection; supersets that lost the parent tie do register
    // here, since they share the contained set's values.
    for (label, values) in &grouped.data.labels_with_data {
        let alias = name_alias(label);
        for (other_label, other_values) in &grouped.data.labels_with_data {
            if label == other_label {
                continue;
            }
            let other_alias = name_alias(other_label);

            let contained = {
                let set = &sets[&alias];
                let other = &sets[&other_alias];
                set.parent.as_deref() == Some(other_alias.as_str())
                    || other.parent.as_deref() == Some(alias.as_str())
            };
            if contained {
                continue;
            }

            let set = sets.get_mut(&alias).expect("seeded from the same labels");
            if values.intersection(other_values).next().is_some() {
                set.intersections.insert(other_alias);
            } else {
                set.disconnections.insert(other_alias);
            }
        }
    }

    let mut groups: BTreeMap<String, ClassifiedGroup> = BTreeMap::new();
    for entry in grouped.grouped_data.values() {
        let mut group = ClassifiedGroup::new(entry.labels.clone(), entry.values.clone());

        for label in &group.labels {
            let alias = name_alias(label);
            if !sets.contains_key(&alias) {
                return Err(ClassifyError::UnknownLabel {
                    label: label.clone(),
                    alias,
                });
            }
            group.inclusion_sets.insert(alias);
        }

        for other in grouped.grouped_data.values() {
            if other.labels == group.labels {
                continue;
            }
            for rejected in other.labels.difference(&group.labels) {
                let alias = name_alias(rejected);
                if !sets.contains_key(&alias) {
                    return Err(ClassifyError::UnknownLabel {
                        label: rejected.clone(),
                        alias,
                    });
                }
                group.exclusion_sets.insert(alias);
            }
        }

        groups.insert(group.alias.clone(), group);
    }

    Ok(ClassifiedDataSet { sets, groups })
}

/// Collapse a group's exclusion sets along ancestor chains: when a set's
/// parent is itself excluded, excluding the parent already keeps the
/// group out of the child, so only the topmost excluded ancestor is
/// kept.
pub fn minimized_exclusion_sets(
    data: &ClassifiedDataSet,
    group: &ClassifiedGroup,
) -> Result<BTreeSet<String>, ClassifyError> {
    let mut minimized = BTreeSet::new();

    for alias in &group.exclusion_sets {
        let mut pointer = alias.clone();
        // Identical value sets classify as mutual parents; the visited
        // guard keeps that degenerate cycle from spinning forever.
        let mut visited = BTreeSet::new();

        loop {
            visited.insert(pointer.clone());
            let set = data
                .sets
                .get(&pointer)
                .ok_or_else(|| ClassifyError::UnknownAlias {
                    alias: pointer.clone(),
                })?;
            match &set.parent {
                Some(parent)
                    if group.exclusion_sets.contains(parent) && !visited.contains(parent) =>
                {
                    pointer = parent.clone();
                }
                _ => break,
            }
        }

        minimized.insert(pointer);
    }

    Ok(minimized)
}
