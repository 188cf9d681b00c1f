use std::collections::BTreeMap;
use std::fs;
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::config::SolverConfig;
use crate::encode::encode_model;
use crate::model::LpModel;

/// Terminal outcome of a solve attempt. Infeasible and unbounded are
/// ordinary results, not errors; the caller's recourse is a rebuild with
/// a smaller dataset or fewer enabled constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

impl SolveStatus {
    fn from_report(report: &str) -> Self {
        match report.trim() {
            "Optimal" => Self::Optimal,
            "Unbounded" => Self::Unbounded,
            _ => Self::Infeasible,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// Primal value per variable name, present when the solve was
    /// optimal.
    pub columns: BTreeMap<String, f64>,
    /// Transport-level failure detail (solver crash, malformed output);
    /// the status is already folded to `Infeasible` when this is set.
    pub diagnostics: Option<String>,
}

impl Solution {
    fn failed(diagnostics: String) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            columns: BTreeMap::new(),
            diagnostics: Some(diagnostics),
        }
    }

    pub fn primal(&self, variable: &str) -> Option<f64> {
        self.columns.get(variable).copied()
    }
}

/// Encode the model, hand it to the external solver binary, and read the
/// solution back. Process failures never escape as errors; they surface
/// as an infeasible solution carrying the failure for diagnostics, so
/// the caller sees one uniform outcome type.
pub fn solve_model(model: &LpModel, config: &SolverConfig) -> Solution {
    match run_solver(&encode_model(model), config) {
        Ok(solution) => solution,
        Err(err) => Solution::failed(format!("{err:#}")),
    }
}

fn run_solver(encoded: &str, config: &SolverConfig) -> Result<Solution> {
    let dir = tempfile::tempdir().context("create solver scratch directory")?;
    let model_path = dir.path().join("model.lp");
    let solution_path = dir.path().join("model.sol");
    fs::write(&model_path, encoded).context("write model file")?;

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let output = Command::new(&config.binary)
        .arg("--parallel")
        .arg(on_off(config.parallel))
        .arg("--presolve")
        .arg(on_off(config.presolve))
        .arg("--model_file")
        .arg(&model_path)
        .arg("--solution_file")
        .arg(&solution_path)
        .output()
        .with_context(|| format!("launch solver {:?}", config.binary))?;

    if !output.status.success() {
        bail!(
            "solver exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let text = fs::read_to_string(&solution_path).context("read solution file")?;
    Ok(parse_solution_text(&text))
}

/// Parse the solver's solution-file dialect: a `Model status` line
/// followed by the status, then `# Columns` / `# Rows` sections of
/// name-value pairs. Only the primal section matters; a MIP has no dual
/// values.
pub fn parse_solution_text(text: &str) -> Solution {
    let mut status = SolveStatus::Infeasible;
    let mut columns = BTreeMap::new();

    let mut collecting_status = false;
    let mut collecting_columns = false;

    for line in text.lines() {
        if line.starts_with("Model status") {
            collecting_status = true;
            collecting_columns = false;
            continue;
        }
        if line.starts_with("# Dual solution values") {
            break;
        }
        if line.starts_with("# Columns") {
            collecting_columns = true;
            continue;
        }
        if line.starts_with("# Rows") {
            collecting_columns = false;
            continue;
        }

        if collecting_status {
            status = SolveStatus::from_report(line);
            collecting_status = false;
            continue;
        }

        if collecting_columns {
            let mut parts = line.split_whitespace();
            if let (Some(name), Some(value)) = (parts.next(), parts.next())
                && let Ok(value) = value.parse::<f64>()
            {
                columns.insert(name.to_string(), value);
            }
        }
    }

    Solution {
        status,
        columns,
        diagnostics: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION_TEXT: &str = "\
Model status
Optimal

# Primal solution values
Feasible
Objective 421
# Columns 4
br_x1 0
br_x2 210
s_abc_x1 10
s_abc_x2 87.5
# Rows 2
row0 0
row1 10

# Dual solution values
None
";

    #[test]
    fn parses_status_and_primal_columns() {
        let solution = parse_solution_text(SOLUTION_TEXT);

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.primal("br_x2"), Some(210.0));
        assert_eq!(solution.primal("s_abc_x2"), Some(87.5));
        assert_eq!(solution.columns.len(), 4);
    }

    #[test]
    fn row_values_are_not_columns() {
        let solution = parse_solution_text(SOLUTION_TEXT);
        assert_eq!(solution.primal("row0"), None);
    }

    #[test]
    fn infeasible_report_has_no_columns_worth_reading() {
        let solution = parse_solution_text("Model status\nInfeasible\n");
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.columns.is_empty());
    }

    #[test]
    fn unknown_status_folds_to_infeasible() {
        let solution = parse_solution_text("Model status\nTime limit reached\n");
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn missing_binary_reports_infeasible_with_diagnostics() {
        let config = SolverConfig {
            binary: "definitely-not-a-real-solver".into(),
            ..SolverConfig::default()
        };
        let solution = solve_model(&LpModel::default(), &config);

        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.diagnostics.is_some());
    }
}
