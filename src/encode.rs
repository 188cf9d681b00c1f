use crate::model::{Constraint, LpModel};

/// Serialize a model into the solver's plain-text LP dialect.
///
/// Variables not listed under `BINARY` or `GENERAL` default to
/// continuous, non-negative, unbounded-above reals; the section layout
/// and term grammar must stay exactly as the solver expects them.
pub fn encode_model(model: &LpModel) -> String {
    let objective = model
        .objective
        .iter()
        .map(|term| {
            if term.negated {
                format!("-{}", term.variable)
            } else {
                term.variable.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" + ");

    let constraints = model
        .constraints
        .iter()
        .map(encode_constraint)
        .collect::<Vec<_>>()
        .join("\n");

    let binaries = model
        .binaries
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let generals = model
        .generals
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    [
        "Minimize".to_string(),
        format!("objective: {objective}"),
        "Subject To".to_string(),
        constraints,
        "BINARY".to_string(),
        binaries,
        "GENERAL".to_string(),
        generals,
        "End".to_string(),
    ]
    .join("\n")
}

fn encode_constraint(constraint: &Constraint) -> String {
    let name = constraint
        .name
        .as_ref()
        .map(|name| format!("{name}: "))
        .unwrap_or_default();

    let terms = constraint
        .terms
        .iter()
        .map(|(variable, coefficient)| format!("{coefficient} {variable}"))
        .collect::<Vec<_>>()
        .join(" + ");

    format!(
        "{name}{terms} {} {}",
        constraint.op.as_str(),
        constraint.rhs
    )
}
