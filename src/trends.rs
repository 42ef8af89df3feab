//! Descriptive series computed once from the static datasets.
//!
//! Every series is chart-ready: grouped keys are sorted numerically when they
//! parse as numbers and lexically otherwise, and rows whose value cell is
//! blank or unparseable are skipped.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{parse_number, Dataset};
use crate::errors::{DashError, DashResult};

/// Group key ordered numerically when both sides parse as numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey(String);

impl GroupKey {
    fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        // "6" and "6.0" land in the same group
        let text = match parse_number(raw) {
            Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
            _ => raw.to_string(),
        };
        Some(Self(text))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (parse_number(&self.0), parse_number(&other.0)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub key: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMean {
    pub source: String,
    pub destination: String,
    pub mean: f64,
}

/// Mean value per (row, column) cell; `None` where no rows fall in the cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCount {
    pub key: String,
    pub hue: String,
    pub count: usize,
}

/// Five-number summary with 1.5 IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub key: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub key: String,
    pub counts: Vec<usize>,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn group_stats(keys: &[&str], values: &[Option<f64>]) -> Vec<GroupStat> {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values) {
        if let (Some(key), Some(value)) = (GroupKey::new(key), value) {
            groups.entry(key).or_default().push(*value);
        }
    }
    groups
        .into_iter()
        .map(|(key, acc)| GroupStat {
            key: key.0,
            count: acc.count,
            mean: acc.mean(),
            min: acc.min,
            max: acc.max,
        })
        .collect()
}

fn counts(keys: &[&str]) -> Vec<Count> {
    let mut groups: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for key in keys.iter().filter_map(|k| GroupKey::new(k)) {
        *groups.entry(key).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(key, count)| Count { key: key.0, count })
        .collect()
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn box_stats(key: String, mut values: Vec<f64>) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let inside = values
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence);
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);

    Some(BoxStats {
        key,
        count: values.len(),
        min: values[0],
        q1,
        median: quantile(&values, 0.5),
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers: values
            .iter()
            .filter(|v| **v < low_fence || **v > high_fence)
            .count(),
    })
}

fn histogram(keys: &[&str], values: &[Option<f64>], bins: usize) -> Histogram {
    let pairs: Vec<(GroupKey, f64)> = keys
        .iter()
        .zip(values)
        .filter_map(|(k, v)| Some((GroupKey::new(k)?, (*v)?)))
        .collect();

    if pairs.is_empty() || bins == 0 {
        return Histogram {
            edges: Vec::new(),
            series: Vec::new(),
        };
    }

    let lo = pairs.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let hi = pairs.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    // Halved so the span stays finite for values near f64::MAX.
    let half_span = hi / 2.0 - lo / 2.0;
    let edges = (0..=bins)
        .map(|i| {
            let t = i as f64 / bins as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect();

    let mut series: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (key, value) in pairs {
        // the last bin is closed on the right
        let bin = if half_span > 0.0 {
            let t = (value / 2.0 - lo / 2.0) / half_span;
            ((t * bins as f64) as usize).min(bins - 1)
        } else {
            0
        };
        series.entry(key).or_insert_with(|| vec![0; bins])[bin] += 1;
    }

    Histogram {
        edges,
        series: series
            .into_iter()
            .map(|(key, counts)| HistogramSeries { key: key.0, counts })
            .collect(),
    }
}

pub mod columns {
    pub const PRICE: &str = "Price";
    pub const TOTAL_STOPS: &str = "Total_Stops";
    pub const JOURNEY_MONTH: &str = "Journey_Month";
    pub const JOURNEY_DAY: &str = "Journey_Day";
    pub const DURATION_MINS: &str = "Duration_mins";
    pub const AIRLINE: &str = "Airline";
    pub const SOURCE: &str = "Source";
    pub const DESTINATION: &str = "Destination";

    pub const SATISFACTION: &str = "satisfaction";
    pub const AGE: &str = "Age";
    pub const FLIGHT_DISTANCE: &str = "Flight Distance";
    pub const GENDER: &str = "Gender";
}

/// Flight price trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTrends {
    pub rows: usize,
    pub by_stops: Vec<GroupStat>,
    pub monthly: Vec<GroupStat>,
    pub duration_vs_price: Vec<Point>,
    pub month_day_heatmap: Heatmap,
    pub by_route: Vec<RouteMean>,
    pub daily: Vec<GroupStat>,
    pub by_airline: Vec<GroupStat>,
}

impl PriceTrends {
    pub fn compute(dataset: &Dataset) -> DashResult<Self> {
        use columns::*;

        let price = dataset.numeric(PRICE)?;
        let months = dataset.text(JOURNEY_MONTH)?;
        let days = dataset.text(JOURNEY_DAY)?;
        let sources = dataset.text(SOURCE)?;
        let destinations = dataset.text(DESTINATION)?;

        let duration_vs_price = dataset
            .numeric(DURATION_MINS)?
            .into_iter()
            .zip(&price)
            .filter_map(|(x, y)| Some(Point { x: x?, y: (*y)? }))
            .collect();

        Ok(Self {
            rows: dataset.len(),
            by_stops: group_stats(&dataset.text(TOTAL_STOPS)?, &price),
            monthly: group_stats(&months, &price),
            duration_vs_price,
            month_day_heatmap: heatmap(&months, &days, &price),
            by_route: route_means(&sources, &destinations, &price),
            daily: group_stats(&days, &price),
            by_airline: group_stats(&dataset.text(AIRLINE)?, &price),
        })
    }
}

fn heatmap(rows: &[&str], cols: &[&str], values: &[Option<f64>]) -> Heatmap {
    let mut cells: BTreeMap<(GroupKey, GroupKey), Accumulator> = BTreeMap::new();
    for ((r, c), v) in rows.iter().zip(cols).zip(values) {
        if let (Some(r), Some(c), Some(v)) = (GroupKey::new(r), GroupKey::new(c), v) {
            cells.entry((r, c)).or_default().push(*v);
        }
    }

    let mut row_keys: Vec<GroupKey> = cells.keys().map(|(r, _)| r.clone()).collect();
    row_keys.dedup();
    let mut col_keys: Vec<GroupKey> = cells.keys().map(|(_, c)| c.clone()).collect();
    col_keys.sort();
    col_keys.dedup();

    let grid = row_keys
        .iter()
        .map(|r| {
            col_keys
                .iter()
                .map(|c| cells.get(&(r.clone(), c.clone())).map(Accumulator::mean))
                .collect()
        })
        .collect();

    Heatmap {
        rows: row_keys.into_iter().map(|k| k.0).collect(),
        columns: col_keys.into_iter().map(|k| k.0).collect(),
        cells: grid,
    }
}

fn route_means(sources: &[&str], destinations: &[&str], values: &[Option<f64>]) -> Vec<RouteMean> {
    let mut routes: BTreeMap<(GroupKey, GroupKey), Accumulator> = BTreeMap::new();
    for ((s, d), v) in sources.iter().zip(destinations).zip(values) {
        if let (Some(s), Some(d), Some(v)) = (GroupKey::new(s), GroupKey::new(d), v) {
            routes.entry((s, d)).or_default().push(*v);
        }
    }
    routes
        .into_iter()
        .map(|((s, d), acc)| RouteMean {
            source: s.0,
            destination: d.0,
            mean: acc.mean(),
        })
        .collect()
}

/// Passenger satisfaction trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionTrends {
    pub rows: usize,
    pub satisfaction_counts: Vec<Count>,
    pub age_by_satisfaction: Vec<BoxStats>,
    pub flight_distance: Histogram,
    pub gender_by_satisfaction: Vec<CrossCount>,
}

impl SatisfactionTrends {
    pub fn compute(dataset: &Dataset, histogram_bins: usize) -> DashResult<Self> {
        use columns::*;

        if histogram_bins == 0 {
            return Err(DashError::config("histogram_bins must be positive"));
        }

        let labels = dataset.text(SATISFACTION)?;
        let ages = dataset.numeric(AGE)?;

        let mut by_label: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
        for (label, age) in labels.iter().zip(&ages) {
            if let (Some(label), Some(age)) = (GroupKey::new(label), age) {
                by_label.entry(label).or_default().push(*age);
            }
        }

        let mut crossed: BTreeMap<(GroupKey, GroupKey), usize> = BTreeMap::new();
        for (gender, label) in dataset.text(GENDER)?.iter().zip(&labels) {
            if let (Some(g), Some(l)) = (GroupKey::new(gender), GroupKey::new(label)) {
                *crossed.entry((g, l)).or_default() += 1;
            }
        }

        Ok(Self {
            rows: dataset.len(),
            satisfaction_counts: counts(&labels),
            age_by_satisfaction: by_label
                .into_iter()
                .filter_map(|(k, v)| box_stats(k.0, v))
                .collect(),
            flight_distance: histogram(&labels, &dataset.numeric(FLIGHT_DISTANCE)?, histogram_bins),
            gender_by_satisfaction: crossed
                .into_iter()
                .map(|((g, l), count)| CrossCount {
                    key: g.0,
                    hue: l.0,
                    count,
                })
                .collect(),
        })
    }
}
