//! Chart-ready series for the result page.
//!
//! Reshapes the stored engine payloads into the plot library's series
//! format: `{label, data: [[x, y], ...]}` objects, with uncertainty bands
//! expressed as an invisible lower series and a filled upper series linked
//! through `id`/`fillBetween`.

use serde::Serialize;
use serde_json::Value;

/// Series label for the Δ APD90 percent-change chart.
pub const APD90_LABEL: &str = "Δ APD90";
/// Series label for the qNet chart.
pub const QNET_LABEL: &str = "qNet";

/// Fill opacity for uncertainty bands.
const BAND_FILL: f64 = 0.2;

/// One plottable series.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "fillBetween", skip_serializing_if = "Option::is_none")]
    pub fill_between: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineStyle>,
}

/// Line rendering options for band series.
#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub show: bool,
    #[serde(rename = "lineWidth")]
    pub line_width: f64,
    pub fill: f64,
}

/// The full payload consumed by the result page charts.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub adp90: Vec<Series>,
    pub qnet: Vec<Series>,
    pub traces: Vec<Series>,
}

/// Assemble chart data from the stored result payloads.
///
/// Missing payloads produce a single empty series for the concentration
/// charts (the front end checks the first series' data length to decide
/// whether to show a chart) and no series for the voltage traces.
pub fn chart_data(
    voltage_results: Option<&Value>,
    q_net: Option<&Value>,
    voltage_traces: Option<&Value>,
) -> ChartData {
    ChartData {
        adp90: concentration_series(voltage_results, "delta_apd90", APD90_LABEL),
        qnet: concentration_series(q_net, "qnet", QNET_LABEL),
        traces: trace_series(voltage_traces),
    }
}

/// One series per named voltage trace, x = time (ms), y = membrane voltage.
pub fn trace_series(voltage_traces: Option<&Value>) -> Vec<Series> {
    let Some(entries) = voltage_traces.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let points = entry.get("series")?.as_array()?;
            let mut data: Vec<[f64; 2]> = points
                .iter()
                .filter_map(|p| {
                    let x = p.get("name")?.as_f64()?;
                    let y = p.get("value")?.as_f64()?;
                    Some([x, y])
                })
                .collect();
            data.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Some(plain_series(Some(name.to_string()), data))
        })
        .collect()
}

/// Build the series set for a per-concentration metric (`delta_apd90` or
/// `qnet`): a median line, plus a fill band when any value carries an
/// `[lower, median, upper]` uncertainty triple.
fn concentration_series(payload: Option<&Value>, value_key: &str, label: &str) -> Vec<Series> {
    let mut median: Vec<[f64; 2]> = Vec::new();
    let mut lower: Vec<[f64; 2]> = Vec::new();
    let mut upper: Vec<[f64; 2]> = Vec::new();
    let mut has_band = false;

    if let Some(entries) = payload.and_then(Value::as_array) {
        for entry in entries {
            let Some(c) = entry.get("c").and_then(Value::as_f64) else {
                continue;
            };
            match entry.get(value_key) {
                Some(Value::Number(n)) => {
                    if let Some(y) = n.as_f64() {
                        median.push([c, y]);
                        lower.push([c, y]);
                        upper.push([c, y]);
                    }
                }
                Some(Value::Array(triple)) if triple.len() == 3 => {
                    let lo = triple[0].as_f64();
                    let mid = triple[1].as_f64();
                    let hi = triple[2].as_f64();
                    if let (Some(lo), Some(mid), Some(hi)) = (lo, mid, hi) {
                        median.push([c, mid]);
                        lower.push([c, lo]);
                        upper.push([c, hi]);
                        has_band = true;
                    }
                }
                _ => {}
            }
        }
    }

    for points in [&mut median, &mut lower, &mut upper] {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }

    let series_id = value_key.to_string();
    let mut series = vec![Series {
        label: Some(label.to_string()),
        data: median,
        id: Some(series_id.clone()),
        fill_between: None,
        lines: None,
    }];

    if has_band {
        let lower_id = format!("{series_id}_lower");
        series.push(Series {
            label: None,
            data: lower,
            id: Some(lower_id.clone()),
            fill_between: None,
            lines: Some(LineStyle { show: true, line_width: 0.0, fill: 0.0 }),
        });
        series.push(Series {
            label: None,
            data: upper,
            id: Some(format!("{series_id}_upper")),
            fill_between: Some(lower_id),
            lines: Some(LineStyle { show: true, line_width: 0.0, fill: BAND_FILL }),
        });
    }

    series
}

fn plain_series(label: Option<String>, data: Vec<[f64; 2]>) -> Series {
    Series { label, data, id: None, fill_between: None, lines: None }
}
