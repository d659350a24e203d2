//! Spreadsheet export of a simulation and its results.
//!
//! Produces a fixed five-sheet workbook: the submitted input values, the
//! per-concentration % change and qNet table, the voltage traces (wide and
//! long form), and the PK/PD curves. The workbook is plain data (sheet
//! names plus rows of cells); rendering to a binary spreadsheet format is a
//! downstream concern, but a CSV rendering is provided for direct download.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Sheet names, in workbook order.
pub const SHEET_INPUT_VALUES: &str = "Input Values";
pub const SHEET_CHANGE_AND_QNET: &str = "% Change and qNet";
pub const SHEET_VOLTAGE_TRACES: &str = "Voltage Traces";
pub const SHEET_VOLTAGE_TRACES_PLOT: &str = "Voltage Traces Plot";
pub const SHEET_PKPD: &str = "PKPD";

/// A cell is a JSON scalar; `Null` renders as an empty cell.
pub type Row = Vec<Value>;

#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// Everything the input sheet needs from the simulation record, already
/// joined with catalog names.
#[derive(Debug, Clone)]
pub struct SimulationSummary<'a> {
    pub title: &'a str,
    pub notes: &'a str,
    pub model_name: &'a str,
    pub pacing_frequency: f64,
    pub maximum_pacing_time: f64,
    pub ion_current_type: &'a str,
    pub ion_units: &'a str,
    /// Human-readable description of the concentration specification,
    /// e.g. `"Range 0 - 100 µM, 4 intermediate points (log scale)"`.
    pub concentration_detail: String,
    pub ion_currents: Vec<IonCurrentSummary<'a>>,
}

#[derive(Debug, Clone)]
pub struct IonCurrentSummary<'a> {
    pub name: &'a str,
    pub value: f64,
    pub hill_coefficient: f64,
    pub saturation_level: f64,
    pub spread_of_uncertainty: Option<f64>,
}

/// Assemble the five-sheet workbook from the simulation summary and its
/// stored result payloads. Absent payloads produce header-only sheets.
pub fn build_workbook(
    summary: &SimulationSummary<'_>,
    voltage_results: Option<&Value>,
    q_net: Option<&Value>,
    voltage_traces: Option<&Value>,
    pkpd_results: Option<&Value>,
) -> Workbook {
    Workbook {
        sheets: vec![
            input_values_sheet(summary),
            change_and_qnet_sheet(voltage_results, q_net),
            series_wide_sheet(SHEET_VOLTAGE_TRACES, "Time (ms)", voltage_traces),
            traces_plot_sheet(voltage_traces),
            series_wide_sheet(SHEET_PKPD, "Time (hours)", pkpd_results),
        ],
    }
}

/// Render a workbook as CSV: one block per sheet, sheet name on its own
/// line, blank line between sheets.
pub fn workbook_to_csv(workbook: &Workbook) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for sheet in &workbook.sheets {
        writer
            .write_record([sheet.name.as_str()])
            .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;
        for row in &sheet.rows {
            // Zero-field records are not writable; spacer rows become a
            // single empty field.
            let cells: Vec<String> = if row.is_empty() {
                vec![String::new()]
            } else {
                row.iter().map(render_cell).collect()
            };
            writer
                .write_record(&cells)
                .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;
        }
        writer
            .write_record([""])
            .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Spreadsheet(e.to_string()))
}

// ---------------------------------------------------------------------------
// Individual sheets
// ---------------------------------------------------------------------------

fn input_values_sheet(summary: &SimulationSummary<'_>) -> Sheet {
    let mut rows: Vec<Row> = vec![
        vec!["Title".into(), summary.title.into()],
        vec!["Notes".into(), summary.notes.into()],
        vec!["Model".into(), summary.model_name.into()],
        vec!["Pacing frequency (Hz)".into(), num(summary.pacing_frequency)],
        vec!["Maximum pacing time (mins)".into(), num(summary.maximum_pacing_time)],
        vec!["Ion current type".into(), summary.ion_current_type.into()],
        vec!["Ion current units".into(), summary.ion_units.into()],
        vec!["Concentrations".into(), summary.concentration_detail.clone().into()],
        Vec::new(),
        vec![
            "Current".into(),
            "Value".into(),
            "Hill coefficient".into(),
            "Saturation level".into(),
            "Spread of uncertainty".into(),
        ],
    ];
    for current in &summary.ion_currents {
        rows.push(vec![
            current.name.into(),
            num(current.value),
            num(current.hill_coefficient),
            num(current.saturation_level),
            current.spread_of_uncertainty.map_or(Value::Null, num),
        ]);
    }
    Sheet { name: SHEET_INPUT_VALUES.to_string(), rows }
}

fn change_and_qnet_sheet(voltage_results: Option<&Value>, q_net: Option<&Value>) -> Sheet {
    let header: Row = vec![
        "Concentration (µM)".into(),
        "Δ APD90 (%)".into(),
        "Δ APD90 lower".into(),
        "Δ APD90 upper".into(),
        "qNet (C/F)".into(),
        "qNet lower".into(),
        "qNet upper".into(),
    ];

    let apd90 = metric_points(voltage_results, "delta_apd90");
    let qnet = metric_points(q_net, "qnet");

    let mut concentrations: Vec<f64> = apd90
        .iter()
        .map(|(c, _)| *c)
        .chain(qnet.iter().map(|(c, _)| *c))
        .collect();
    concentrations.sort_by(|a, b| a.total_cmp(b));
    concentrations.dedup();

    let mut rows = vec![header];
    for c in concentrations {
        let a = lookup(&apd90, c);
        let q = lookup(&qnet, c);
        rows.push(vec![
            num(c),
            a.map_or(Value::Null, |p| num(p.median)),
            a.and_then(|p| p.lower).map_or(Value::Null, num),
            a.and_then(|p| p.upper).map_or(Value::Null, num),
            q.map_or(Value::Null, |p| num(p.median)),
            q.and_then(|p| p.lower).map_or(Value::Null, num),
            q.and_then(|p| p.upper).map_or(Value::Null, num),
        ]);
    }
    Sheet { name: SHEET_CHANGE_AND_QNET.to_string(), rows }
}

/// Wide table for a named-series payload: first column is the x axis, one
/// further column per series.
fn series_wide_sheet(sheet_name: &str, x_label: &str, payload: Option<&Value>) -> Sheet {
    let series = named_series(payload);

    let mut header: Row = vec![x_label.into()];
    for (name, _) in &series {
        header.push(name.as_str().into());
    }

    let mut xs: Vec<f64> = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(x, _)| *x))
        .collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.dedup();

    let mut rows = vec![header];
    for x in xs {
        let mut row: Row = vec![num(x)];
        for (_, points) in &series {
            let value = points
                .iter()
                .find(|(px, _)| *px == x)
                .map(|(_, py)| num(*py))
                .unwrap_or(Value::Null);
            row.push(value);
        }
        rows.push(row);
    }
    Sheet { name: sheet_name.to_string(), rows }
}

/// Long-form companion to the voltage traces sheet, one point per row.
/// This is the sheet the spreadsheet application's chart is built from.
fn traces_plot_sheet(voltage_traces: Option<&Value>) -> Sheet {
    let mut rows: Vec<Row> = vec![vec![
        "Trace".into(),
        "Time (ms)".into(),
        "Membrane voltage (mV)".into(),
    ]];
    for (name, points) in named_series(voltage_traces) {
        for (x, y) in points {
            rows.push(vec![name.as_str().into(), num(x), num(y)]);
        }
    }
    Sheet { name: SHEET_VOLTAGE_TRACES_PLOT.to_string(), rows }
}

// ---------------------------------------------------------------------------
// Payload access helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct MetricPoint {
    median: f64,
    lower: Option<f64>,
    upper: Option<f64>,
}

/// Extract `(concentration, point)` pairs from a `[{c, <key>}]` payload,
/// accepting plain numbers or `[lower, median, upper]` triples.
fn metric_points(payload: Option<&Value>, key: &str) -> Vec<(f64, MetricPoint)> {
    let Some(entries) = payload.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let c = entry.get("c")?.as_f64()?;
            match entry.get(key)? {
                Value::Number(n) => Some((
                    c,
                    MetricPoint { median: n.as_f64()?, lower: None, upper: None },
                )),
                Value::Array(triple) if triple.len() == 3 => Some((
                    c,
                    MetricPoint {
                        median: triple[1].as_f64()?,
                        lower: triple[0].as_f64(),
                        upper: triple[2].as_f64(),
                    },
                )),
                _ => None,
            }
        })
        .collect()
}

fn lookup(points: &[(f64, MetricPoint)], c: f64) -> Option<MetricPoint> {
    points.iter().find(|(pc, _)| *pc == c).map(|(_, p)| *p)
}

/// Extract `(name, [(x, y)])` pairs from a named-series payload
/// (`[{name, series: [{name, value}]}]`), points sorted by x.
fn named_series(payload: Option<&Value>) -> Vec<(String, Vec<(f64, f64)>)> {
    let Some(entries) = payload.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.to_string();
            let mut points: Vec<(f64, f64)> = entry
                .get("series")?
                .as_array()?
                .iter()
                .filter_map(|p| Some((p.get("name")?.as_f64()?, p.get("value")?.as_f64()?)))
                .collect();
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Some((name, points))
        })
        .collect()
}

fn num(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn render_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> SimulationSummary<'static> {
        SimulationSummary {
            title: "test sim",
            notes: "some notes",
            model_name: "O'Hara-Rudy-CiPA",
            pacing_frequency: 0.05,
            maximum_pacing_time: 5.0,
            ion_current_type: "pIC50",
            ion_units: "-log(M)",
            concentration_detail: "Range 0 - 100 µM, 4 intermediate points (log scale)".to_string(),
            ion_currents: vec![
                IonCurrentSummary {
                    name: "IKr",
                    value: 4.37,
                    hill_coefficient: 1.0,
                    saturation_level: 0.0,
                    spread_of_uncertainty: None,
                },
                IonCurrentSummary {
                    name: "INa",
                    value: 44.716,
                    hill_coefficient: 1.0,
                    saturation_level: 0.0,
                    spread_of_uncertainty: Some(0.2),
                },
            ],
        }
    }

    #[test]
    fn workbook_has_five_sheets_in_order() {
        let workbook = build_workbook(&summary(), None, None, None, None);
        let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                SHEET_INPUT_VALUES,
                SHEET_CHANGE_AND_QNET,
                SHEET_VOLTAGE_TRACES,
                SHEET_VOLTAGE_TRACES_PLOT,
                SHEET_PKPD,
            ]
        );
    }

    #[test]
    fn input_sheet_lists_currents_with_optional_spread() {
        let workbook = build_workbook(&summary(), None, None, None, None);
        let sheet = &workbook.sheets[0];
        let ikr = sheet.rows.iter().find(|r| r.first() == Some(&json!("IKr"))).unwrap();
        assert_eq!(ikr[4], Value::Null);
        let ina = sheet.rows.iter().find(|r| r.first() == Some(&json!("INa"))).unwrap();
        assert_eq!(ina[4], json!(0.2));
    }

    #[test]
    fn change_sheet_merges_metrics_by_concentration() {
        let voltage_results = json!([
            {"c": 1.0, "delta_apd90": [2.0, 5.0, 9.0]},
            {"c": 10.0, "delta_apd90": 15.0}
        ]);
        let q_net = json!([{"c": 10.0, "qnet": 0.03}]);
        let workbook =
            build_workbook(&summary(), Some(&voltage_results), Some(&q_net), None, None);
        let sheet = &workbook.sheets[1];
        // header + two concentration rows
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[1][0], json!(1.0));
        assert_eq!(sheet.rows[1][1], json!(5.0));
        assert_eq!(sheet.rows[1][2], json!(2.0));
        assert_eq!(sheet.rows[1][4], Value::Null);
        assert_eq!(sheet.rows[2][0], json!(10.0));
        assert_eq!(sheet.rows[2][2], Value::Null);
        assert_eq!(sheet.rows[2][4], json!(0.03));
    }

    #[test]
    fn traces_sheet_is_wide_by_trace_name() {
        let traces = json!([
            {"name": "0 µM", "series": [{"name": 0.0, "value": -85.2}, {"name": 1.0, "value": -84.9}]},
            {"name": "100 µM", "series": [{"name": 1.0, "value": -80.1}]}
        ]);
        let workbook = build_workbook(&summary(), None, None, Some(&traces), None);
        let sheet = &workbook.sheets[2];
        assert_eq!(sheet.rows[0], vec![json!("Time (ms)"), json!("0 µM"), json!("100 µM")]);
        assert_eq!(sheet.rows[1], vec![json!(0.0), json!(-85.2), Value::Null]);
        assert_eq!(sheet.rows[2], vec![json!(1.0), json!(-84.9), json!(-80.1)]);
    }

    #[test]
    fn plot_sheet_is_long_form() {
        let traces = json!([
            {"name": "0 µM", "series": [{"name": 0.0, "value": -85.2}]}
        ]);
        let workbook = build_workbook(&summary(), None, None, Some(&traces), None);
        let sheet = &workbook.sheets[3];
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1], vec![json!("0 µM"), json!(0.0), json!(-85.2)]);
    }

    #[test]
    fn csv_rendering_includes_sheet_names_and_blank_separators() {
        let workbook = build_workbook(&summary(), None, None, None, None);
        let csv = workbook_to_csv(&workbook).unwrap();
        assert!(csv.starts_with("Input Values\n"));
        assert!(csv.contains("% Change and qNet\n"));
        assert!(csv.contains("Title,test sim\n"));
        assert!(csv.contains("PKPD\n"));
    }
}
