//! Chart model handed to the browser.
//!
//! A chart is a plain data description (labels, values, series); drawing it
//! is left to the front-end charting library. Constructors validate the
//! shape of the data and return a message describing what is wrong, which
//! the caller turns into a render error for the owning panel.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// Number of decimals shown for pie percentages.
pub const PIE_PERCENT_DECIMALS: u32 = 1;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Category → value.
    Bar,
    /// Time → value, one line per series.
    Line,
    /// Category → share of the whole.
    Pie,
}

// ---------------------------------------------------------------------------
// Bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Build a bar chart, keeping the input order.
    pub fn new<I>(x_label: &str, y_label: &str, bars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let bars = bars
            .into_iter()
            .map(|(label, value)| {
                ensure_finite(&label, value)?;
                Ok(Bar { label, value })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(Self {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            bars,
        })
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: NaiveDate,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl LineChart {
    /// A single-series time chart. An empty input yields no series at all.
    pub fn single<I>(x_label: &str, y_label: &str, name: &str, points: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = points
            .into_iter()
            .map(|(x, y)| {
                ensure_finite(&x.to_string(), y)?;
                Ok(Point { x, y })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let series = if points.is_empty() {
            Vec::new()
        } else {
            vec![Series {
                name: name.to_string(),
                points,
            }]
        };

        Ok(Self {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series,
        })
    }

    /// One series per group, in order of first appearance.
    pub fn grouped<I>(x_label: &str, y_label: &str, rows: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (NaiveDate, String, f64)>,
    {
        let mut groups: IndexMap<String, Vec<Point>> = IndexMap::new();
        for (x, group, y) in rows {
            ensure_finite(&format!("{group} @ {x}"), y)?;
            groups.entry(group).or_default().push(Point { x, y });
        }

        Ok(Self {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: groups
                .into_iter()
                .map(|(name, points)| Series { name, points })
                .collect(),
        })
    }

    /// Total number of points across all series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Share of the whole, rounded so that all slices add up to 100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub slices: Vec<Slice>,
}

impl PieChart {
    /// Build a proportion chart from non-negative amounts.
    ///
    /// A non-empty input whose total is zero has no meaningful proportions
    /// and is rejected.
    pub fn from_amounts<I>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let entries: Vec<(String, f64)> = entries.into_iter().collect();
        for (label, value) in &entries {
            ensure_finite(label, *value)?;
            if *value < 0.0 {
                return Err(format!("'{label}' has a negative amount ({value})"));
            }
        }

        if entries.is_empty() {
            return Ok(Self { slices: Vec::new() });
        }

        let values: Vec<f64> = entries.iter().map(|(_, v)| *v).collect();
        if values.iter().sum::<f64>() <= 0.0 {
            return Err("all amounts are zero; proportions are undefined".to_string());
        }

        let percents = largest_remainder_percentages(&values, PIE_PERCENT_DECIMALS);
        let slices = entries
            .into_iter()
            .zip(percents)
            .map(|((label, value), percent)| Slice {
                label,
                value,
                percent,
            })
            .collect();

        Ok(Self { slices })
    }
}

/// Round each value's share of the total to `decimals` places so that the
/// rounded shares add up to exactly 100.
///
/// Uses the largest-remainder method: every share is floored, then the
/// missing units go to the shares with the largest fractional parts. Equal
/// fractions are resolved by position, so the result is stable across runs.
/// Returns zeros when the total is not positive.
pub fn largest_remainder_percentages(values: &[f64], decimals: u32) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return vec![0.0; values.len()];
    }

    let scale = 10u64.pow(decimals);
    let units = 100 * scale;

    let quotas: Vec<f64> = values.iter().map(|v| v / total * units as f64).collect();
    let mut floors: Vec<u64> = quotas.iter().map(|q| q.floor() as u64).collect();

    let assigned: u64 = floors.iter().sum();
    let missing = units.saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = quotas[a] - quotas[a].floor();
        let frac_b = quotas[b] - quotas[b].floor();
        frac_b.total_cmp(&frac_a).then(a.cmp(&b))
    });
    for &idx in order.iter().take(missing) {
        floors[idx] += 1;
    }

    floors
        .into_iter()
        .map(|units| units as f64 / scale as f64)
        .collect()
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Bar(BarChart),
    Line(LineChart),
    Pie(PieChart),
}

impl Chart {
    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bar(c) => c.bars.is_empty(),
            Self::Line(c) => c.point_count() == 0,
            Self::Pie(c) => c.slices.is_empty(),
        }
    }
}

fn ensure_finite(label: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("'{label}' has a non-finite value ({value})"))
    }
}
