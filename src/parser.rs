use anyhow::{Result, bail};

use crate::dataset::DataSet;

/// Parse column-per-label CSV into a [`DataSet`].
///
/// The header row names the labels; each column below it lists that
/// label's values. Columns are independent, so rows carry no meaning and
/// short rows / blank cells are fine.
pub fn parse_csv(input: &str) -> Result<DataSet> {
    let adjusted = input.replace('\r', "");
    let mut lines = adjusted.lines();

    let Some(header) = lines.next() else {
        bail!("empty input, expected a header row of labels");
    };

    let labels: Vec<String> = header.split(',').map(|l| l.trim().to_string()).collect();
    if labels.iter().any(|l| l.is_empty()) {
        bail!("blank label in header row");
    }

    let mut data = DataSet::default();
    for label in &labels {
        data.labels.insert(label.clone());
        data.labels_with_data.entry(label.clone()).or_default();
    }

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        for (idx, cell) in line.split(',').enumerate() {
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            let Some(label) = labels.get(idx) else {
                bail!("row has more cells than the header has labels: {line:?}");
            };

            data.values.insert(value.to_string());
            data.labels_with_data
                .get_mut(label)
                .expect("label column seeded above")
                .insert(value.to_string());
            data.data_with_labels
                .entry(value.to_string())
                .or_default()
                .insert(label.clone());
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_columns_into_both_directions() {
        let data = parse_csv("A,B\na,b\nc,\n").unwrap();

        assert_eq!(data.labels.len(), 2);
        assert_eq!(data.values.len(), 3);
        assert!(data.labels_with_data["A"].contains("a"));
        assert!(data.labels_with_data["A"].contains("c"));
        assert!(data.labels_with_data["B"].contains("b"));
        assert!(data.data_with_labels["a"].contains("A"));
        assert!(data.is_consistent());
    }

    #[test]
    fn shared_values_map_to_every_column_they_appear_in() {
        let data = parse_csv("A,B\nx,x\ny,\n").unwrap();

        assert_eq!(data.data_with_labels["x"].len(), 2);
        assert_eq!(data.data_with_labels["y"].len(), 1);
    }

    #[test]
    fn skips_blank_cells_and_crlf() {
        let data = parse_csv("A,B\r\na,\r\n,b\r\n").unwrap();

        assert_eq!(data.values.len(), 2);
        assert!(!data.values.contains(""));
        assert!(data.is_consistent());
    }

    #[test]
    fn rejects_empty_input_and_blank_labels() {
        assert!(parse_csv("").is_err());
        assert!(parse_csv("A,,C\na,b,c").is_err());
    }

    #[test]
    fn rejects_rows_wider_than_header() {
        assert!(parse_csv("A,B\na,b,c").is_err());
    }
}
