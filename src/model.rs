use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constraints;
use crate::dataset::{CartesianSize, ClassifiedDataSet};

/// One signed variable reference in the objective. The objective is the
/// implicit sum of its terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    pub variable: String,
    pub negated: bool,
}

impl ObjectiveTerm {
    pub fn plus(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            negated: false,
        }
    }

    pub fn minus(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            negated: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Le,
    Ge,
    Eq,
}

impl ConstraintOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
        }
    }
}

/// A single linear constraint: the implicit sum of `coefficient *
/// variable` terms compared against `rhs`. Term order is preserved so
/// the encoded model stays deterministic.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: Option<String>,
    pub terms: Vec<(String, f64)>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(terms: Vec<(String, f64)>, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            name: None,
            terms,
            op,
            rhs,
        }
    }
}

/// The MIP artifact handed to the encoder. A variable exists once it is
/// mentioned; anything not listed in `binaries` or `generals` is a
/// continuous non-negative real by the solver's convention.
#[derive(Debug, Clone, Default)]
pub struct LpModel {
    pub objective: Vec<ObjectiveTerm>,
    pub constraints: Vec<Constraint>,
    pub binaries: BTreeSet<String>,
    pub generals: BTreeSet<String>,
}

impl LpModel {
    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }
}

/// Feature toggles trading solve time against visual fidelity. Disabling
/// a family removes its constraints and any variables only it
/// introduces, rather than relaxing bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSettings {
    pub squareness: bool,
    pub intersecting_sets: bool,
    pub non_intersecting_sets: bool,
    pub fully_contained_sets: bool,
    pub set_labels: bool,
    pub group_exclusions: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            squareness: true,
            intersecting_sets: true,
            non_intersecting_sets: true,
            fully_contained_sets: true,
            set_labels: true,
            group_exclusions: true,
        }
    }
}

/// Opaque sizing inputs plus toggles; everything the builder needs
/// besides the classified relationship graph.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub group_sizes: BTreeMap<String, CartesianSize>,
    pub set_label_sizes: BTreeMap<String, CartesianSize>,
    pub group_margin: f64,
    pub set_label_height: f64,
    pub settings: ModelSettings,
}

impl ModelInput {
    /// Assemble the builder's sizing inputs from a classified dataset
    /// and a theme: group blocks measured by the dimension estimator,
    /// label chips measured untruncated (the final set widths are not
    /// known before the solve), margins taken from the theme's spacing.
    pub fn from_classified(
        data: &ClassifiedDataSet,
        theme: &crate::theme::Theme,
        settings: ModelSettings,
    ) -> Self {
        let group_sizes = data
            .groups
            .values()
            .map(|group| {
                (
                    group.alias.clone(),
                    crate::dims::compute_group_dimensions(theme, group).size(),
                )
            })
            .collect();
        let set_label_sizes = data
            .sets
            .values()
            .map(|set| {
                (
                    set.alias.clone(),
                    crate::dims::compute_label_dimensions(theme, &set.name, f64::INFINITY).size(),
                )
            })
            .collect();

        Self {
            group_sizes,
            set_label_sizes,
            group_margin: theme.group_item_spacing,
            set_label_height: (theme.set_label_padding * 2.0 + theme.font_size).floor(),
            settings,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no group size supplied for group {alias}")]
    MissingGroupSize { alias: String },
    #[error("no label size supplied for set {alias}")]
    MissingLabelSize { alias: String },
    #[error(transparent)]
    Classify(#[from] crate::classify::ClassifyError),
}

/// Lower the classified relationship graph into a MIP model.
///
/// Each enabled constraint family is an independent pass appending to
/// the model; passes are order-independent because every auxiliary
/// variable name is derived from the participating aliases and a family
/// id.
pub fn build_model(data: &ClassifiedDataSet, input: &ModelInput) -> Result<LpModel, ModelError> {
    let mut model = LpModel::default();

    constraints::apply_objective(data, input, &mut model)?;
    constraints::apply_variable_domains(data, input, &mut model)?;
    constraints::apply_set_bounding_box(data, input, &mut model)?;
    constraints::apply_group_sizing(data, input, &mut model)?;
    constraints::apply_group_inclusion(data, input, &mut model)?;

    if input.settings.squareness {
        constraints::apply_squareness(data, input, &mut model)?;
    }
    if input.settings.intersecting_sets {
        constraints::apply_intersecting_sets(data, input, &mut model)?;
    }
    if input.settings.non_intersecting_sets {
        constraints::apply_non_intersecting_sets(data, input, &mut model)?;
    }
    if input.settings.set_labels {
        constraints::apply_set_label_spacing(data, input, &mut model)?;
    }
    if input.settings.fully_contained_sets {
        constraints::apply_fully_contained_sets(data, input, &mut model)?;
    }
    if input.settings.group_exclusions {
        constraints::apply_group_exclusion(data, input, &mut model)?;
    }

    Ok(model)
}
