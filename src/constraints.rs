//! Constraint families lowering the relationship graph into linear
//! constraints. Every rectangle is four coordinate variables
//! `x1,y1,x2,y2`; spatial "or" conditions are encoded as big-M
//! disjunctions over dedicated binary indicators.

use std::collections::BTreeSet;

use crate::classify::minimized_exclusion_sets;
use crate::dataset::{CartesianSize, ClassifiedDataSet};
use crate::model::{Constraint, ConstraintOp, LpModel, ModelError, ModelInput, ObjectiveTerm};

const BOUNDING_BOX: [&str; 4] = ["br_x1", "br_x2", "br_y1", "br_y2"];
const COORDS: [&str; 4] = ["x1", "x2", "y1", "y2"];

fn set_var(alias: &str, coord: &str) -> String {
    format!("s_{alias}_{coord}")
}

fn group_var(alias: &str, coord: &str) -> String {
    format!("g_{alias}_{coord}")
}

/// Canonical key for an unordered pair, so symmetric relationships emit
/// their disjunction exactly once regardless of iteration order.
fn pair_key(left: &str, right: &str) -> String {
    let mut pair = [left, right];
    pair.sort_unstable();
    pair.join("_")
}

/// Upper bound on any coordinate delta: twice the summed side lengths of
/// every group block. Large enough that a relaxed disjunct can never
/// bind, small enough to keep the relaxation numerically tame. Label
/// widths are deliberately left out; the model solves faster without
/// them.
pub fn big_m(input: &ModelInput) -> f64 {
    let sides_sum: f64 = input
        .group_sizes
        .values()
        .map(|CartesianSize { width, height }| width + height)
        .sum();
    sides_sum * 2.0
}

fn group_size<'a>(input: &'a ModelInput, alias: &str) -> Result<&'a CartesianSize, ModelError> {
    input
        .group_sizes
        .get(alias)
        .ok_or_else(|| ModelError::MissingGroupSize {
            alias: alias.to_string(),
        })
}

fn label_size<'a>(input: &'a ModelInput, alias: &str) -> Result<&'a CartesianSize, ModelError> {
    input
        .set_label_sizes
        .get(alias)
        .ok_or_else(|| ModelError::MissingLabelSize {
            alias: alias.to_string(),
        })
}

/// Objective: minimize the bounding box extents plus every set's own
/// extents, and pin the bounding box to the origin.
pub fn apply_objective(
    data: &ClassifiedDataSet,
    _input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    model.objective.extend([
        ObjectiveTerm::plus("br_x2"),
        ObjectiveTerm::minus("br_x1"),
        ObjectiveTerm::plus("br_y2"),
        ObjectiveTerm::minus("br_y1"),
    ]);
    model.generals.extend(BOUNDING_BOX.map(String::from));

    for alias in data.sets.keys() {
        model.objective.push(ObjectiveTerm::plus(set_var(alias, "x2")));
        model.objective.push(ObjectiveTerm::minus(set_var(alias, "x1")));
        model.objective.push(ObjectiveTerm::plus(set_var(alias, "y2")));
        model.objective.push(ObjectiveTerm::minus(set_var(alias, "y1")));
    }

    model.push(Constraint::new(
        vec![("br_x1".to_string(), 1.0)],
        ConstraintOp::Eq,
        0.0,
    ));
    model.push(Constraint::new(
        vec![("br_y1".to_string(), 1.0)],
        ConstraintOp::Eq,
        0.0,
    ));
    Ok(())
}

/// Squareness penalty: a free variable lower-bounded by the bounding box
/// extent difference in both directions, so minimization drives it to
/// the absolute difference. The `square` variable exists only while this
/// family is enabled.
pub fn apply_squareness(
    _data: &ClassifiedDataSet,
    _input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    model.objective.push(ObjectiveTerm::plus("square"));
    model.generals.insert("square".to_string());

    model.push(Constraint::new(
        vec![
            ("br_x2".to_string(), 1.0),
            ("br_y2".to_string(), -1.0),
            ("square".to_string(), -1.0),
        ],
        ConstraintOp::Le,
        0.0,
    ));
    model.push(Constraint::new(
        vec![
            ("br_y2".to_string(), 1.0),
            ("br_x2".to_string(), -1.0),
            ("square".to_string(), -1.0),
        ],
        ConstraintOp::Le,
        0.0,
    ));
    Ok(())
}

/// Every rectangle coordinate is an integer variable.
pub fn apply_variable_domains(
    data: &ClassifiedDataSet,
    _input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    for alias in data.sets.keys() {
        for coord in COORDS {
            model.generals.insert(set_var(alias, coord));
        }
    }
    for alias in data.groups.keys() {
        for coord in COORDS {
            model.generals.insert(group_var(alias, coord));
        }
    }
    Ok(())
}

/// Every set rectangle lies inside the global bounding box.
pub fn apply_set_bounding_box(
    data: &ClassifiedDataSet,
    _input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    for alias in data.sets.keys() {
        model.push(Constraint::new(
            vec![(set_var(alias, "x1"), 1.0), ("br_x1".to_string(), -1.0)],
            ConstraintOp::Ge,
            0.0,
        ));
        model.push(Constraint::new(
            vec![(set_var(alias, "y1"), 1.0), ("br_y1".to_string(), -1.0)],
            ConstraintOp::Ge,
            0.0,
        ));
        model.push(Constraint::new(
            vec![("br_x2".to_string(), 1.0), (set_var(alias, "x2"), -1.0)],
            ConstraintOp::Ge,
            0.0,
        ));
        model.push(Constraint::new(
            vec![("br_y2".to_string(), 1.0), (set_var(alias, "y2"), -1.0)],
            ConstraintOp::Ge,
            0.0,
        ));
    }
    Ok(())
}

/// Pin each group rectangle to its precomputed size.
pub fn apply_group_sizing(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    for alias in data.groups.keys() {
        let size = group_size(input, alias)?;
        model.push(Constraint::new(
            vec![(group_var(alias, "x2"), 1.0), (group_var(alias, "x1"), -1.0)],
            ConstraintOp::Eq,
            size.width,
        ));
        model.push(Constraint::new(
            vec![(group_var(alias, "y2"), 1.0), (group_var(alias, "y1"), -1.0)],
            ConstraintOp::Eq,
            size.height,
        ));
    }
    Ok(())
}

/// Every group sits strictly inside every set of its signature, inset by
/// the margin, with extra headroom at the top edge for the set's label.
pub fn apply_group_inclusion(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    for group in data.groups.values() {
        for alias in &group.inclusion_sets {
            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "x1"), 1.0),
                    (set_var(alias, "x1"), -1.0),
                ],
                ConstraintOp::Ge,
                input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "y1"), 1.0),
                    (set_var(alias, "y1"), -1.0),
                ],
                ConstraintOp::Ge,
                input.group_margin + input.set_label_height,
            ));
            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "x2"), 1.0),
                    (set_var(alias, "x2"), -1.0),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "y2"), 1.0),
                    (set_var(alias, "y2"), -1.0),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
        }
    }
    Ok(())
}

/// Keep each group outside every set of its minimized exclusion list: an
/// inclusive OR over "entirely left / right / above / below", one big-M
/// relaxed inequality per direction, with the indicator sum capped at 3
/// so at least one direction binds.
pub fn apply_group_exclusion(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    let mut applied: BTreeSet<String> = BTreeSet::new();
    let m = big_m(input);

    for group in data.groups.values() {
        for alias in minimized_exclusion_sets(data, group)? {
            let key = format!("{}_outside_{alias}", group.alias);
            if !applied.insert(key) {
                continue;
            }

            let bins: Vec<String> = (1..=4)
                .map(|idx| format!("g_{}_{alias}_h2_b{idx}", group.alias))
                .collect();

            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "x2"), 1.0),
                    (set_var(&alias, "x1"), -1.0),
                    (bins[0].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(&alias, "x2"), 1.0),
                    (group_var(&group.alias, "x1"), -1.0),
                    (bins[1].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (group_var(&group.alias, "y2"), 1.0),
                    (set_var(&alias, "y1"), -1.0),
                    (bins[2].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(&alias, "y2"), 1.0),
                    (group_var(&group.alias, "y1"), -1.0),
                    (bins[3].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                bins.iter().map(|b| (b.clone(), 1.0)).collect(),
                ConstraintOp::Le,
                3.0,
            ));

            model.binaries.extend(bins);
        }
    }
    Ok(())
}

/// Force a consistent overlap ordering between two intersecting sets:
/// for each of the four coordinates, one binary chooses which set leads,
/// and the paired big-M inequalities keep the chosen ordering at least a
/// margin apart. Every binary value is meaningful here, so no
/// cardinality row is needed.
pub fn apply_intersecting_sets(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    let mut applied: BTreeSet<String> = BTreeSet::new();
    let m = big_m(input);

    for set in data.sets.values() {
        for other in &set.intersections {
            if !applied.insert(pair_key(&set.alias, other)) {
                continue;
            }

            for (idx, coord) in ["x2", "x1", "y1", "y2"].iter().enumerate() {
                let bin = format!("s_{}_{other}_h3_b{}", set.alias, idx + 1);

                model.push(Constraint::new(
                    vec![
                        (set_var(&set.alias, coord), 1.0),
                        (set_var(other, coord), -1.0),
                        (bin.clone(), m),
                    ],
                    ConstraintOp::Ge,
                    input.group_margin,
                ));
                model.push(Constraint::new(
                    vec![
                        (set_var(other, coord), 1.0),
                        (set_var(&set.alias, coord), -1.0),
                        (bin.clone(), -m),
                    ],
                    ConstraintOp::Ge,
                    input.group_margin - m,
                ));

                model.binaries.insert(bin);
            }
        }
    }
    Ok(())
}

/// Fully separate two disjoint sets; same disjunction shape as group
/// exclusion applied to the two set rectangles.
pub fn apply_non_intersecting_sets(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    let mut applied: BTreeSet<String> = BTreeSet::new();
    let m = big_m(input);

    for set in data.sets.values() {
        for other in &set.disconnections {
            if !applied.insert(pair_key(&set.alias, other)) {
                continue;
            }

            let bins: Vec<String> = (1..=4)
                .map(|idx| format!("s_{}_{other}_h6_b{idx}", set.alias))
                .collect();

            model.push(Constraint::new(
                vec![
                    (set_var(&set.alias, "x2"), 1.0),
                    (set_var(other, "x1"), -1.0),
                    (bins[0].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(other, "x2"), 1.0),
                    (set_var(&set.alias, "x1"), -1.0),
                    (bins[1].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(&set.alias, "y2"), 1.0),
                    (set_var(other, "y1"), -1.0),
                    (bins[2].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(other, "y2"), 1.0),
                    (set_var(&set.alias, "y1"), -1.0),
                    (bins[3].clone(), -m),
                ],
                ConstraintOp::Le,
                -input.group_margin,
            ));
            model.push(Constraint::new(
                bins.iter().map(|b| (b.clone(), 1.0)).collect(),
                ConstraintOp::Le,
                3.0,
            ));

            model.binaries.extend(bins);
        }
    }
    Ok(())
}

/// Keep the label chips of two intersecting sets apart. Labels anchor at
/// their set's top-left corner, so the disjunction runs over `x1`/`y1`
/// shifted by each label's extent. Label collisions only matter where
/// rectangles can overlap, so other relationships are skipped; no new
/// coordinate variables are introduced.
pub fn apply_set_label_spacing(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    let mut applied: BTreeSet<String> = BTreeSet::new();
    let m = big_m(input);

    for set in data.sets.values() {
        let size = label_size(input, &set.alias)?;

        for other in &set.intersections {
            let other_size = label_size(input, other)?;
            if !applied.insert(pair_key(&set.alias, other)) {
                continue;
            }

            let bins: Vec<String> = (1..=4)
                .map(|idx| format!("l_{}_{other}_h5_b{idx}", set.alias))
                .collect();

            model.push(Constraint::new(
                vec![
                    (set_var(&set.alias, "x1"), 1.0),
                    (set_var(other, "x1"), -1.0),
                    (bins[0].clone(), -m),
                ],
                ConstraintOp::Le,
                -(size.width + input.group_margin),
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(other, "x1"), 1.0),
                    (set_var(&set.alias, "x1"), -1.0),
                    (bins[1].clone(), -m),
                ],
                ConstraintOp::Le,
                -(other_size.width + input.group_margin),
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(&set.alias, "y1"), 1.0),
                    (set_var(other, "y1"), -1.0),
                    (bins[2].clone(), -m),
                ],
                ConstraintOp::Le,
                -(size.height + input.group_margin),
            ));
            model.push(Constraint::new(
                vec![
                    (set_var(other, "y1"), 1.0),
                    (set_var(&set.alias, "y1"), -1.0),
                    (bins[3].clone(), -m),
                ],
                ConstraintOp::Le,
                -(other_size.height + input.group_margin),
            ));
            model.push(Constraint::new(
                bins.iter().map(|b| (b.clone(), 1.0)).collect(),
                ConstraintOp::Le,
                3.0,
            ));

            model.binaries.extend(bins);
        }
    }
    Ok(())
}

/// Nest a set strictly inside its parent. The containment direction is
/// already known, so plain inequalities suffice; the top edge again
/// leaves room for the parent's label.
pub fn apply_fully_contained_sets(
    data: &ClassifiedDataSet,
    input: &ModelInput,
    model: &mut LpModel,
) -> Result<(), ModelError> {
    for set in data.sets.values() {
        let Some(parent) = &set.parent else {
            continue;
        };

        model.push(Constraint::new(
            vec![
                (set_var(&set.alias, "x1"), 1.0),
                (set_var(parent, "x1"), -1.0),
            ],
            ConstraintOp::Ge,
            input.group_margin,
        ));
        model.push(Constraint::new(
            vec![
                (set_var(&set.alias, "y1"), 1.0),
                (set_var(parent, "y1"), -1.0),
            ],
            ConstraintOp::Ge,
            input.group_margin + input.set_label_height,
        ));
        model.push(Constraint::new(
            vec![
                (set_var(&set.alias, "x2"), 1.0),
                (set_var(parent, "x2"), -1.0),
            ],
            ConstraintOp::Le,
            -input.group_margin,
        ));
        model.push(Constraint::new(
            vec![
                (set_var(&set.alias, "y2"), 1.0),
                (set_var(parent, "y2"), -1.0),
            ],
            ConstraintOp::Le,
            -input.group_margin,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_dataset, group_dataset};
    use crate::model::{ModelSettings, build_model};
    use crate::parser::parse_csv;
    use crate::theme::Theme;

    fn input_for(data: &ClassifiedDataSet, settings: ModelSettings) -> ModelInput {
        ModelInput::from_classified(data, &Theme::default(), settings)
    }

    fn classified(csv: &str) -> ClassifiedDataSet {
        classify_dataset(&group_dataset(&parse_csv(csv).unwrap())).unwrap()
    }

    #[test]
    fn big_m_covers_twice_the_summed_group_sides() {
        let data = classified("A,B\na,b\nb,c\n");
        let input = input_for(&data, ModelSettings::default());

        let sides: f64 = input
            .group_sizes
            .values()
            .map(|size| size.width + size.height)
            .sum();
        assert_eq!(big_m(&input), sides * 2.0);
        // Safe bound: no coordinate delta in a sane layout can exceed
        // the total extent of all blocks laid end to end.
        assert!(big_m(&input) >= sides);
    }

    #[test]
    fn bounding_box_is_pinned_to_origin() {
        let data = classified("A,B\na,b\n");
        let model = build_model(&data, &input_for(&data, ModelSettings::default())).unwrap();

        let pinned: Vec<_> = model
            .constraints
            .iter()
            .filter(|c| c.op == ConstraintOp::Eq && c.rhs == 0.0 && c.terms.len() == 1)
            .map(|c| c.terms[0].0.as_str())
            .collect();
        assert!(pinned.contains(&"br_x1"));
        assert!(pinned.contains(&"br_y1"));
    }

    #[test]
    fn disjoint_pair_emits_one_separation_disjunction() {
        // Scenario: {a,b} and {c,d} are disjoint.
        let data = classified("A,B\na,c\nb,d\n");
        let model = build_model(&data, &input_for(&data, ModelSettings::default())).unwrap();

        let h6_bins: Vec<_> = model
            .binaries
            .iter()
            .filter(|name| name.contains("_h6_"))
            .collect();
        assert_eq!(h6_bins.len(), 4, "one disjunction, four indicators");

        let cardinality_rows = model
            .constraints
            .iter()
            .filter(|c| c.rhs == 3.0 && c.terms.iter().all(|(name, _)| name.contains("_h6_")))
            .count();
        assert_eq!(cardinality_rows, 1);
    }

    #[test]
    fn disabled_families_leave_no_trace() {
        let data = classified("A,B\na,c\nb,d\n");
        let settings = ModelSettings {
            squareness: false,
            intersecting_sets: false,
            non_intersecting_sets: false,
            fully_contained_sets: false,
            set_labels: false,
            group_exclusions: false,
        };
        let model = build_model(&data, &input_for(&data, settings)).unwrap();

        assert!(model.binaries.is_empty());
        assert!(!model.generals.contains("square"));
        assert!(model.objective.iter().all(|term| term.variable != "square"));
    }

    #[test]
    fn squareness_adds_two_lower_bounds_and_the_variable() {
        let data = classified("A,B\na,b\n");
        let model = build_model(&data, &input_for(&data, ModelSettings::default())).unwrap();

        assert!(model.generals.contains("square"));
        let bounds = model
            .constraints
            .iter()
            .filter(|c| {
                c.terms
                    .iter()
                    .any(|(name, coeff)| name == "square" && *coeff == -1.0)
            })
            .count();
        assert_eq!(bounds, 2);
    }

    #[test]
    fn intersecting_pair_uses_paired_direction_choices() {
        let data = classified("A,B\na,b\nb,c\n");
        let model = build_model(&data, &input_for(&data, ModelSettings::default())).unwrap();

        let h3_bins: Vec<_> = model
            .binaries
            .iter()
            .filter(|name| name.contains("_h3_"))
            .collect();
        assert_eq!(h3_bins.len(), 4);

        // Each binary appears in exactly two constraints, once relaxed
        // in each direction; there is no cardinality row for h3.
        for bin in &h3_bins {
            let uses = model
                .constraints
                .iter()
                .filter(|c| c.terms.iter().any(|(name, _)| name == *bin))
                .count();
            assert_eq!(uses, 2);
        }
    }

    #[test]
    fn group_exclusion_targets_only_topmost_ancestors() {
        // C inside B inside A; the D-group must be excluded from A only.
        let data = classified("A,B,C,D\na,a,a,d\nb,b,,\nc,,,\n");
        let settings = ModelSettings {
            intersecting_sets: false,
            non_intersecting_sets: false,
            set_labels: false,
            ..ModelSettings::default()
        };
        let model = build_model(&data, &input_for(&data, settings)).unwrap();

        let a_alias = data
            .sets
            .values()
            .find(|set| set.name == "A")
            .unwrap()
            .alias
            .clone();
        let d_group = data
            .groups
            .values()
            .find(|group| group.values.contains("d"))
            .unwrap();

        let d_prefix = format!("g_{}_", d_group.alias);
        let d_bins: Vec<_> = model
            .binaries
            .iter()
            .filter(|name| name.contains("_h2_") && name.starts_with(&d_prefix))
            .collect();
        assert_eq!(d_bins.len(), 4, "one disjunction for the one topmost ancestor");
        for bin in d_bins {
            assert!(
                bin.starts_with(&format!("{d_prefix}{a_alias}_h2_")),
                "exclusion against a non-topmost ancestor: {bin}"
            );
        }
    }

    #[test]
    fn missing_group_size_is_a_hard_error() {
        let data = classified("A,B\na,b\n");
        let mut input = input_for(&data, ModelSettings::default());
        input.group_sizes.clear();

        assert!(matches!(
            build_model(&data, &input),
            Err(ModelError::MissingGroupSize { .. })
        ));
    }

    #[test]
    fn label_spacing_shifts_by_each_labels_extent() {
        let data = classified("Alpha,B\na,b\nb,c\n");
        let settings = ModelSettings {
            group_exclusions: false,
            non_intersecting_sets: false,
            intersecting_sets: false,
            ..ModelSettings::default()
        };
        let input = input_for(&data, settings);
        let model = build_model(&data, &input).unwrap();

        let label_rows: Vec<_> = model
            .constraints
            .iter()
            .filter(|c| c.terms.iter().any(|(name, _)| name.starts_with("l_")))
            .collect();
        // Four separation rows plus the cardinality row.
        assert_eq!(label_rows.len(), 5);

        let widths: Vec<f64> = input
            .set_label_sizes
            .values()
            .map(|size| size.width)
            .collect();
        let offsets: Vec<f64> = label_rows
            .iter()
            .filter(|c| c.rhs != 3.0)
            .map(|c| -c.rhs - input.group_margin)
            .collect();
        for width in widths {
            assert!(
                offsets.iter().any(|offset| (offset - width).abs() < 1e-9),
                "no separation row offset by label width {width}"
            );
        }
    }
}
