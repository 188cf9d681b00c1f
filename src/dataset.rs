use std::collections::{BTreeMap, BTreeSet};

/// Bipartite relation between data values and the labels ("sets") they
/// carry. Both lookup directions are kept so the classifier can walk the
/// relation either way without rebuilding indexes.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub labels_with_data: BTreeMap<String, BTreeSet<String>>,
    pub data_with_labels: BTreeMap<String, BTreeSet<String>>,
    pub labels: BTreeSet<String>,
    pub values: BTreeSet<String>,
}

impl DataSet {
    /// Both lookup directions must describe the same relation: every
    /// (label, value) edge present in one map appears in the other.
    pub fn is_consistent(&self) -> bool {
        for (label, values) in &self.labels_with_data {
            if !self.labels.contains(label) {
                return false;
            }
            for value in values {
                let Some(labels) = self.data_with_labels.get(value) else {
                    return false;
                };
                if !labels.contains(label) {
                    return false;
                }
            }
        }
        for (value, labels) in &self.data_with_labels {
            if !self.values.contains(value) {
                return false;
            }
            for label in labels {
                let Some(values) = self.labels_with_data.get(label) else {
                    return false;
                };
                if !values.contains(value) {
                    return false;
                }
            }
        }
        true
    }
}

/// A `DataSet` plus its partition into groups: one entry per distinct
/// label signature that actually occurs, keyed by the signature's alias.
#[derive(Debug, Clone)]
pub struct GroupedDataSet {
    pub data: DataSet,
    pub grouped_data: BTreeMap<String, GroupedValues>,
}

#[derive(Debug, Clone)]
pub struct GroupedValues {
    pub labels: BTreeSet<String>,
    pub values: BTreeSet<String>,
}

/// One label, classified against every other label. Relationship fields
/// hold aliases resolved through [`ClassifiedDataSet::sets`]; the arena
/// owns the records, the links do not.
#[derive(Debug, Clone)]
pub struct ClassifiedSet {
    pub name: String,
    pub alias: String,
    pub intersections: BTreeSet<String>,
    pub disconnections: BTreeSet<String>,
    pub parent: Option<String>,
}

impl ClassifiedSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: name_alias(name),
            intersections: BTreeSet::new(),
            disconnections: BTreeSet::new(),
            parent: None,
        }
    }
}

/// One distinct label signature and the values sharing it. Inclusion and
/// exclusion sets are aliases into the set arena.
#[derive(Debug, Clone)]
pub struct ClassifiedGroup {
    pub alias: String,
    pub labels: BTreeSet<String>,
    pub values: BTreeSet<String>,
    pub inclusion_sets: BTreeSet<String>,
    pub exclusion_sets: BTreeSet<String>,
}

impl ClassifiedGroup {
    pub fn new(labels: BTreeSet<String>, values: BTreeSet<String>) -> Self {
        Self {
            alias: signature_alias(&labels),
            labels,
            values,
            inclusion_sets: BTreeSet::new(),
            exclusion_sets: BTreeSet::new(),
        }
    }
}

/// Arena of classified sets and groups, both keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedDataSet {
    pub sets: BTreeMap<String, ClassifiedSet>,
    pub groups: BTreeMap<String, ClassifiedGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianSize {
    pub width: f64,
    pub height: f64,
}

/// Stable identifier for a label name. Container identity does not
/// survive rebuilds, so everything downstream keys on this instead.
pub fn name_alias(name: &str) -> String {
    format!("{:x}", hash_seed(name))
}

/// Stable identifier for a label signature; order-independent because
/// the signature is joined in sorted order before hashing.
pub fn signature_alias(labels: &BTreeSet<String>) -> String {
    let canonical = labels
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("{:x}", hash_seed(&canonical))
}

fn hash_seed(input: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    input.hash(&mut hasher);
    hasher.finish()
}
