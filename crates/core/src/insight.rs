//! One-line textual insights shown under each chart.

use crate::catalog::QueryId;
use crate::chart::{BarChart, Chart, LineChart, PieChart};

/// Describe the most notable point of a chart, or `None` when it is empty.
pub fn for_chart(query: QueryId, chart: &Chart) -> Option<String> {
    match chart {
        Chart::Bar(bar) => bar_leader(query, bar),
        Chart::Line(line) => line_peak(query, line),
        Chart::Pie(pie) => pie_largest(pie),
    }
}

fn bar_leader(query: QueryId, chart: &BarChart) -> Option<String> {
    let top = chart
        .bars
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))?;

    let text = match query {
        QueryId::ManufacturerRatings => format!(
            "{} has the highest average customer rating ({:.2}).",
            top.label, top.value
        ),
        QueryId::TopSpeeds => format!(
            "The {} is the fastest model with a top speed of {}.",
            top.label,
            trim_number(top.value)
        ),
        QueryId::DealershipSales => format!(
            "{} leads all dealerships with {} sales.",
            top.label,
            trim_number(top.value)
        ),
        QueryId::CategoryDiscounts => format!(
            "{} cars carry the deepest average discount ({:.2}).",
            top.label, top.value
        ),
        _ => format!("{} leads with {}.", top.label, trim_number(top.value)),
    };
    Some(text)
}

fn line_peak(query: QueryId, chart: &LineChart) -> Option<String> {
    let (series, peak) = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(move |p| (s, p)))
        .max_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(b.x.cmp(&a.x)))?;

    let month = peak.x.format("%B %Y");
    let text = if chart.series.len() > 1 {
        format!(
            "Peak: {} in {month} with {} sales.",
            series.name,
            trim_number(peak.y)
        )
    } else if query == QueryId::MonthlySales {
        format!(
            "Sales peaked in {month} at {} across {} month(s) shown.",
            trim_number(peak.y),
            chart.point_count()
        )
    } else {
        format!("Peak in {month}: {}.", trim_number(peak.y))
    };
    Some(text)
}

fn pie_largest(chart: &PieChart) -> Option<String> {
    let top = chart
        .slices
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value).then(b.label.cmp(&a.label)))?;
    Some(format!(
        "{} is the largest category at {:.1}% of all models.",
        top.label, top.percent
    ))
}

/// Render whole numbers without a fractional part.
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}
