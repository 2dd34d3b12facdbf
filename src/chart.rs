use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt;

/// The four chart shapes the UI offers. One dispatch point builds them
/// all; the variants only differ in trace type and axis roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartKind {
    fn title(&self, x: &str, y: &str) -> String {
        match self {
            ChartKind::Bar => format!("Bar Chart: {} vs {}", x, y),
            ChartKind::Line => format!("Line Chart: {} vs {}", x, y),
            ChartKind::Pie => format!("Pie Chart: {}", y),
            ChartKind::Scatter => format!("Scatter Plot: {} vs {}", x, y),
        }
    }
}

/// Column picks for a chart. For bar/line/scatter these are the x and y
/// axes; for pie, `x_column` names the slices and `y_column` their values.
#[derive(Debug, Deserialize)]
pub struct ChartSelection {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
}

#[derive(Debug)]
pub enum ChartError {
    EmptyResult,
    UnknownColumn(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::EmptyResult => write!(f, "No rows to chart"),
            ChartError::UnknownColumn(name) => {
                write!(f, "Column '{}' is not in the result set", name)
            }
        }
    }
}

impl Error for ChartError {}

/// Builds a plotly-style `{data, layout}` document from a result set and a
/// column selection. Recomputed on every UI interaction; nothing is kept.
pub fn build_spec(
    selection: &ChartSelection,
    columns: &[String],
    rows: &[Vec<Value>],
) -> Result<Value, ChartError> {
    if rows.is_empty() {
        return Err(ChartError::EmptyResult);
    }

    let x_values = column_values(&selection.x_column, columns, rows)?;
    let y_values = column_values(&selection.y_column, columns, rows)?;

    let trace = match selection.kind {
        ChartKind::Bar => json!({
            "type": "bar",
            "x": x_values,
            "y": y_values,
        }),
        ChartKind::Line => json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": x_values,
            "y": y_values,
        }),
        ChartKind::Pie => json!({
            "type": "pie",
            "labels": x_values,
            "values": y_values,
        }),
        ChartKind::Scatter => json!({
            "type": "scatter",
            "mode": "markers",
            "x": x_values,
            "y": y_values,
        }),
    };

    Ok(json!({
        "data": [trace],
        "layout": {
            "title": selection.kind.title(&selection.x_column, &selection.y_column),
        },
    }))
}

fn column_values(
    name: &str,
    columns: &[String],
    rows: &[Vec<Value>],
) -> Result<Vec<Value>, ChartError> {
    let index = columns
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))?;

    Ok(rows
        .iter()
        .map(|row| row.get(index).cloned().unwrap_or(Value::Null))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<String>, Vec<Vec<Value>>) {
        let columns = vec!["city".to_string(), "population".to_string()];
        let rows = vec![
            vec![json!("Lyon"), json!(522969)],
            vec![json!("Nantes"), json!(320732)],
        ];
        (columns, rows)
    }

    #[test]
    fn bar_chart_is_keyed_on_the_chosen_columns() {
        let (columns, rows) = sample();
        let selection = ChartSelection {
            kind: ChartKind::Bar,
            x_column: "city".to_string(),
            y_column: "population".to_string(),
        };

        let spec = build_spec(&selection, &columns, &rows).expect("spec");
        assert_eq!(spec["data"][0]["type"], "bar");
        assert_eq!(spec["data"][0]["x"], json!(["Lyon", "Nantes"]));
        assert_eq!(spec["data"][0]["y"], json!([522969, 320732]));
        assert_eq!(
            spec["layout"]["title"],
            "Bar Chart: city vs population"
        );
    }

    #[test]
    fn pie_chart_uses_labels_and_values() {
        let (columns, rows) = sample();
        let selection = ChartSelection {
            kind: ChartKind::Pie,
            x_column: "city".to_string(),
            y_column: "population".to_string(),
        };

        let spec = build_spec(&selection, &columns, &rows).expect("spec");
        assert_eq!(spec["data"][0]["type"], "pie");
        assert_eq!(spec["data"][0]["labels"], json!(["Lyon", "Nantes"]));
        assert_eq!(spec["data"][0]["values"], json!([522969, 320732]));
        assert_eq!(spec["layout"]["title"], "Pie Chart: population");
    }

    #[test]
    fn line_and_scatter_share_the_scatter_trace() {
        let (columns, rows) = sample();
        for (kind, mode) in [(ChartKind::Line, "lines+markers"), (ChartKind::Scatter, "markers")] {
            let selection = ChartSelection {
                kind,
                x_column: "city".to_string(),
                y_column: "population".to_string(),
            };
            let spec = build_spec(&selection, &columns, &rows).expect("spec");
            assert_eq!(spec["data"][0]["type"], "scatter");
            assert_eq!(spec["data"][0]["mode"], mode);
        }
    }

    #[test]
    fn empty_result_sets_are_refused() {
        let (columns, _) = sample();
        let selection = ChartSelection {
            kind: ChartKind::Bar,
            x_column: "city".to_string(),
            y_column: "population".to_string(),
        };
        assert!(matches!(
            build_spec(&selection, &columns, &[]),
            Err(ChartError::EmptyResult)
        ));
    }

    #[test]
    fn unknown_columns_are_refused() {
        let (columns, rows) = sample();
        let selection = ChartSelection {
            kind: ChartKind::Scatter,
            x_column: "city".to_string(),
            y_column: "altitude".to_string(),
        };
        assert!(matches!(
            build_spec(&selection, &columns, &rows),
            Err(ChartError::UnknownColumn(name)) if name == "altitude"
        ));
    }
}
