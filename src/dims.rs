use crate::dataset::{CartesianSize, ClassifiedGroup};
use crate::theme::Theme;

/// Fixed footprint of one group's visual block: the value titles on the
/// left, a marker grid (one dot per member set) on the right.
#[derive(Debug, Clone)]
pub struct GroupDimensions {
    pub width: f64,
    pub height: f64,
    pub title_offsets: Vec<(f64, f64)>,
    pub marker_offsets: Vec<Vec<(f64, f64)>>,
}

impl GroupDimensions {
    pub fn size(&self) -> CartesianSize {
        CartesianSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelDimensions {
    pub label: String,
    pub width: f64,
    pub height: f64,
}

impl LabelDimensions {
    pub fn size(&self) -> CartesianSize {
        CartesianSize {
            width: self.width,
            height: self.height,
        }
    }
}

fn title_offset(theme: &Theme, title_idx: usize) -> (f64, f64) {
    (
        theme.group_item_spacing,
        ((title_idx as f64 + 1.0) * (theme.font_size + theme.group_item_spacing)).ceil(),
    )
}

/// Marker offsets are relative to the marker grid; the caller shifts x
/// by the titles area width.
fn marker_offset(theme: &Theme, row_idx: usize, column_idx: usize) -> (f64, f64) {
    let step = theme.group_marker_spacing + theme.group_marker_size * 2.0;
    (
        (theme.group_marker_size / 2.0 + column_idx as f64 * step).ceil(),
        (theme.group_item_spacing + theme.group_marker_size / 2.0 + row_idx as f64 * step).ceil(),
    )
}

pub fn compute_group_dimensions(theme: &Theme, group: &ClassifiedGroup) -> GroupDimensions {
    let columns = theme.group_marker_columns.max(1);
    let marker_rows = group.labels.len().div_ceil(columns);

    let max_title_length = group
        .values
        .iter()
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(0);

    let titles_width =
        theme.group_item_spacing * 2.0 + theme.font_character_width * max_title_length as f64;
    let titles_height = group.values.len() as f64 * theme.font_size
        + (group.values.len() + 1) as f64 * theme.group_item_spacing;

    let max_markers_y = marker_offset(theme, marker_rows.saturating_sub(1), 0).1;
    let max_markers_x = marker_offset(theme, 0, columns - 1).0;
    let total_markers_height = max_markers_y + theme.group_marker_size / 2.0 + theme.group_item_spacing;

    let width =
        (titles_width + max_markers_x + theme.group_marker_size / 2.0 + theme.group_item_spacing)
            .ceil();
    let height = titles_height.max(total_markers_height).ceil();

    let title_offsets = (0..group.values.len())
        .map(|idx| title_offset(theme, idx))
        .collect();

    let labels: Vec<&String> = group.labels.iter().collect();
    let marker_offsets = labels
        .chunks(columns)
        .enumerate()
        .map(|(row_idx, row)| {
            (0..row.len())
                .map(|marker_idx| {
                    let (x, y) = marker_offset(theme, row_idx, marker_idx);
                    (titles_width + x, y)
                })
                .collect()
        })
        .collect();

    GroupDimensions {
        width,
        height,
        title_offsets,
        marker_offsets,
    }
}

/// Size a set's label chip, truncating the text with an ellipsis when it
/// cannot fit inside `max_width`. Pass `f64::INFINITY` when the final
/// set width is not yet known (as the model builder does).
pub fn compute_label_dimensions(theme: &Theme, label: &str, max_width: f64) -> LabelDimensions {
    let height = theme.font_size + theme.set_label_padding * 2.0;
    let max_content_width = max_width - theme.set_label_padding * 2.0;
    let max_text_width = if max_content_width.is_finite() {
        (max_content_width / theme.font_character_width).floor() as usize
    } else {
        usize::MAX
    };

    let label_chars = label.chars().count();
    if label_chars > max_text_width {
        let truncated: String = label
            .chars()
            .take(max_text_width.saturating_sub(3))
            .chain("...".chars())
            .collect();
        let width = truncated.chars().count() as f64 * theme.font_character_width
            + theme.set_label_padding * 2.0;
        return LabelDimensions {
            label: truncated,
            width,
            height,
        };
    }

    LabelDimensions {
        label: label.to_string(),
        width: label_chars as f64 * theme.font_character_width + theme.set_label_padding * 2.0,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn group(labels: &[&str], values: &[&str]) -> ClassifiedGroup {
        ClassifiedGroup::new(
            labels.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            values.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        )
    }

    #[test]
    fn group_block_grows_with_titles_and_markers() {
        let theme = Theme::default();
        let small = compute_group_dimensions(&theme, &group(&["A"], &["x"]));
        let tall = compute_group_dimensions(&theme, &group(&["A"], &["x", "y", "z"]));
        let wide = compute_group_dimensions(&theme, &group(&["A"], &["a very long member"]));

        assert!(tall.height > small.height);
        assert!(wide.width > small.width);
        assert_eq!(tall.title_offsets.len(), 3);
    }

    #[test]
    fn markers_wrap_into_rows_and_sit_right_of_titles() {
        let theme = Theme::default();
        let dims = compute_group_dimensions(&theme, &group(&["A", "B", "C"], &["x"]));

        // Two columns means three markers fill one full row plus one.
        assert_eq!(dims.marker_offsets.len(), 2);
        assert_eq!(dims.marker_offsets[0].len(), 2);
        assert_eq!(dims.marker_offsets[1].len(), 1);

        let titles_width = theme.group_item_spacing * 2.0 + theme.font_character_width;
        for row in &dims.marker_offsets {
            for &(x, _) in row {
                assert!(x >= titles_width);
            }
        }
    }

    #[test]
    fn label_fits_without_truncation_when_unbounded() {
        let theme = Theme::default();
        let dims = compute_label_dimensions(&theme, "Power Plant", f64::INFINITY);

        assert_eq!(dims.label, "Power Plant");
        assert_eq!(dims.height, theme.font_size + theme.set_label_padding * 2.0);
    }

    #[test]
    fn label_truncates_with_ellipsis() {
        let theme = Theme::default();
        let dims = compute_label_dimensions(&theme, "An Extremely Long Set Name", 100.0);

        assert!(dims.label.ends_with("..."));
        assert!(dims.width <= 100.0);
    }
}
