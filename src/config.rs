use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ModelSettings;
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver executable, resolved through PATH unless absolute.
    pub binary: String,
    pub parallel: bool,
    pub presolve: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            binary: "highs".to_string(),
            parallel: true,
            presolve: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub padding: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub settings: ModelSettings,
    pub solver: SolverConfig,
    pub render: RenderConfig,
}

/// On-disk config shape: everything optional so a file can override just
/// the fields it cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    font_family: Option<String>,
    font_size: Option<f64>,
    font_character_width: Option<f64>,
    group_item_spacing: Option<f64>,
    group_marker_columns: Option<usize>,

    squareness: Option<bool>,
    intersecting_sets: Option<bool>,
    non_intersecting_sets: Option<bool>,
    fully_contained_sets: Option<bool>,
    set_labels: Option<bool>,
    group_exclusions: Option<bool>,

    solver_binary: Option<String>,
    solver_parallel: Option<bool>,
    solver_presolve: Option<bool>,

    render_padding: Option<f64>,
    render_background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = parsed.font_character_width {
        config.theme.font_character_width = v;
    }
    if let Some(v) = parsed.group_item_spacing {
        config.theme.group_item_spacing = v;
    }
    if let Some(v) = parsed.group_marker_columns {
        config.theme.group_marker_columns = v;
    }

    if let Some(v) = parsed.squareness {
        config.settings.squareness = v;
    }
    if let Some(v) = parsed.intersecting_sets {
        config.settings.intersecting_sets = v;
    }
    if let Some(v) = parsed.non_intersecting_sets {
        config.settings.non_intersecting_sets = v;
    }
    if let Some(v) = parsed.fully_contained_sets {
        config.settings.fully_contained_sets = v;
    }
    if let Some(v) = parsed.set_labels {
        config.settings.set_labels = v;
    }
    if let Some(v) = parsed.group_exclusions {
        config.settings.group_exclusions = v;
    }

    if let Some(v) = parsed.solver_binary {
        config.solver.binary = v;
    }
    if let Some(v) = parsed.solver_parallel {
        config.solver.parallel = v;
    }
    if let Some(v) = parsed.solver_presolve {
        config.solver.presolve = v;
    }

    if let Some(v) = parsed.render_padding {
        config.render.padding = v;
    }
    if let Some(v) = parsed.render_background {
        config.render.background = v;
    }

    Ok(config)
}
