use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    /// Average glyph advance for the theme font; drives every text-width
    /// estimate, so it should match a monospace face.
    pub font_character_width: f64,

    pub group_item_spacing: f64,
    pub group_marker_spacing: f64,
    pub group_marker_size: f64,
    pub group_marker_columns: usize,
    pub group_outline_color: String,
    pub group_color: String,
    pub group_background_color: String,
    pub group_background_opacity: f64,

    pub set_border_radius: f64,
    pub set_label_padding: f64,
    pub group_border_radius: f64,

    pub color_variations: Vec<ColorVariation>,
}

/// Per-set color assignment; sets cycle through the list in arena order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorVariation {
    pub set_outline_color: String,
    pub set_label_color: String,
    pub set_background_color: String,
    pub set_background_opacity: f64,
}

/// Material design shade-900 colors, dark enough to outline and label
/// against a white canvas.
const VARIATION_COLORS: [&str; 18] = [
    "#FF6F00", "#0D47A1", "#263238", "#3E2723", "#006064", "#BF360C", "#311B92", "#1B5E20",
    "#1A237E", "#01579B", "#33691E", "#827717", "#E65100", "#880E4F", "#4A148C", "#B71C1C",
    "#004D40", "#F57F17",
];

impl Theme {
    pub fn roboto_mono() -> Self {
        Self {
            font_family: "'Roboto Mono', monospace".to_string(),
            font_size: 16.0,
            font_character_width: 9.6,

            group_item_spacing: 10.0,
            group_marker_spacing: 3.0,
            group_marker_size: 5.0,
            group_marker_columns: 2,
            group_outline_color: "#000000".to_string(),
            group_color: "#000000".to_string(),
            group_background_color: "#FFFFFF".to_string(),
            group_background_opacity: 0.05,

            set_border_radius: 5.0,
            set_label_padding: 5.0,
            group_border_radius: 5.0,

            color_variations: VARIATION_COLORS
                .iter()
                .map(|color| ColorVariation {
                    set_outline_color: color.to_string(),
                    set_label_color: "#FFFFFF".to_string(),
                    set_background_color: color.to_string(),
                    set_background_opacity: 0.05,
                })
                .collect(),
        }
    }

    pub fn variation(&self, index: usize) -> &ColorVariation {
        &self.color_variations[index % self.color_variations.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::roboto_mono()
    }
}
