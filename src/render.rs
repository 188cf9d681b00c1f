use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::config::RenderConfig;
use crate::dataset::ClassifiedDataSet;
use crate::dims::{compute_group_dimensions, compute_label_dimensions};
use crate::solver::Solution;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn solved_rect(solution: &Solution, prefix: &str, alias: &str) -> Result<Rect> {
    let read = |coord: &str| {
        let name = format!("{prefix}_{alias}_{coord}");
        solution
            .primal(&name)
            .ok_or_else(|| anyhow!("solution is missing variable {name}"))
    };
    let (x1, y1, x2, y2) = (read("x1")?, read("y1")?, read("x2")?, read("y2")?);
    Ok(Rect {
        x: x1,
        y: y1,
        width: x2 - x1,
        height: y2 - y1,
    })
}

/// Map solved coordinates back onto visuals: one outlined rectangle per
/// set, one titled marker block per group, one label chip per set
/// anchored at the set's top-left corner.
pub fn render_svg(
    data: &ClassifiedDataSet,
    solution: &Solution,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<String> {
    let width = solution
        .primal("br_x2")
        .ok_or_else(|| anyhow!("solution is missing the bounding box"))?
        + config.padding * 2.0;
    let height = solution
        .primal("br_y2")
        .ok_or_else(|| anyhow!("solution is missing the bounding box"))?
        + config.padding * 2.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"{}\" font-size=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({0},{0})\">",
        config.padding
    ));

    for (idx, set) in data.sets.values().enumerate() {
        let variation = theme.variation(idx);
        let rect = solved_rect(solution, "s", &set.alias)
            .with_context(|| format!("set {:?}", set.name))?;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" stroke=\"{}\" fill=\"{}\" fill-opacity=\"{}\"/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            theme.set_border_radius,
            variation.set_outline_color,
            variation.set_background_color,
            variation.set_background_opacity,
        ));
    }

    for group in data.groups.values() {
        let x = solution
            .primal(&format!("g_{}_x1", group.alias))
            .ok_or_else(|| anyhow!("solution is missing group {}", group.alias))?;
        let y = solution
            .primal(&format!("g_{}_y1", group.alias))
            .ok_or_else(|| anyhow!("solution is missing group {}", group.alias))?;
        let dims = compute_group_dimensions(theme, group);

        svg.push_str(&format!("<g transform=\"translate({x:.2},{y:.2})\">"));
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" stroke=\"{}\" fill=\"{}\" fill-opacity=\"{}\"/>",
            dims.width,
            dims.height,
            theme.group_border_radius,
            theme.group_outline_color,
            theme.group_background_color,
            theme.group_background_opacity,
        ));

        for (value, &(tx, ty)) in group.values.iter().zip(&dims.title_offsets) {
            svg.push_str(&format!(
                "<text x=\"{tx:.2}\" y=\"{ty:.2}\" fill=\"{}\">{}</text>",
                theme.group_color,
                escape_xml(value)
            ));
        }

        let marker_colors: Vec<&str> = group
            .labels
            .iter()
            .map(|label| {
                data.sets
                    .values()
                    .position(|set| &set.name == label)
                    .map(|idx| theme.variation(idx).set_background_color.as_str())
                    .unwrap_or(theme.group_outline_color.as_str())
            })
            .collect();
        let mut marker_idx = 0usize;
        for row in &dims.marker_offsets {
            for &(mx, my) in row {
                svg.push_str(&format!(
                    "<circle cx=\"{mx:.2}\" cy=\"{my:.2}\" r=\"{}\" fill=\"{}\"/>",
                    theme.group_marker_size, marker_colors[marker_idx]
                ));
                marker_idx += 1;
            }
        }
        svg.push_str("</g>");
    }

    for (idx, set) in data.sets.values().enumerate() {
        let variation = theme.variation(idx);
        let rect = solved_rect(solution, "s", &set.alias)
            .with_context(|| format!("set {:?}", set.name))?;
        let label = compute_label_dimensions(theme, &set.name, rect.width);

        svg.push_str(&format!(
            "<g transform=\"translate({:.2},{:.2})\">",
            rect.x, rect.y
        ));
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" stroke=\"{}\" fill=\"{}\"/>",
            label.width, label.height, variation.set_outline_color, variation.set_background_color,
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" fill=\"{}\">{}</text>",
            theme.set_label_padding,
            theme.set_label_padding + theme.font_size,
            variation.set_label_color,
            escape_xml(&label.label)
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</g></svg>");
    Ok(svg)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme.font_family.clone();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_dataset, group_dataset};
    use crate::model::{ModelInput, ModelSettings, build_model};
    use crate::parser::parse_csv;
    use crate::solver::{SolveStatus, parse_solution_text};
    use std::collections::BTreeMap;

    /// Fake a solved layout by walking the model's variables and
    /// assigning every rectangle a spot on a simple diagonal.
    fn synthetic_solution(variables: impl IntoIterator<Item = String>) -> Solution {
        let mut columns: BTreeMap<String, f64> = BTreeMap::new();
        columns.insert("br_x1".to_string(), 0.0);
        columns.insert("br_y1".to_string(), 0.0);
        columns.insert("br_x2".to_string(), 600.0);
        columns.insert("br_y2".to_string(), 400.0);

        let mut slot = 0.0;
        for name in variables {
            columns.entry(name.clone()).or_insert_with(|| {
                slot += 10.0;
                if name.ends_with("_x2") || name.ends_with("_y2") {
                    slot + 150.0
                } else {
                    slot
                }
            });
        }

        let mut solution = parse_solution_text("Model status\nOptimal\n");
        solution.columns = columns;
        assert_eq!(solution.status, SolveStatus::Optimal);
        solution
    }

    #[test]
    fn renders_sets_groups_and_labels() {
        let data =
            classify_dataset(&group_dataset(&parse_csv("Alpha,Beta\na,b\nb,c\n").unwrap()))
                .unwrap();
        let input = ModelInput::from_classified(&data, &Theme::default(), ModelSettings::default());
        let model = build_model(&data, &input).unwrap();
        let solution = synthetic_solution(model.generals.iter().cloned());

        let svg = render_svg(&data, &solution, &Theme::default(), &RenderConfig::default())
            .unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("Alpha"));
        assert!(svg.contains("Beta"));
        // Three groups, each with a marker block.
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn missing_coordinates_are_an_error() {
        let data =
            classify_dataset(&group_dataset(&parse_csv("A,B\na,b\n").unwrap())).unwrap();
        let solution = parse_solution_text("Model status\nOptimal\n");

        assert!(
            render_svg(&data, &solution, &Theme::default(), &RenderConfig::default()).is_err()
        );
    }
}
