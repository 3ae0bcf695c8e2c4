use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as deserialized, before any narrowing. Every field is
/// optional so short or partially-filled rows still load.
#[derive(Debug, Deserialize)]
pub struct RawCsvRow {
    pub date: Option<String>,
    pub duration_hours: Option<String>,
    pub polycount: Option<String>,
    pub messages_sent: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

/// A parsed row of the original table. `None` means the cell was empty or
/// failed to parse as the expected type; the missing-value metrics count
/// these before the clean step discards them.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub date: Option<String>,
    pub duration_hours: Option<f64>,
    pub polycount: Option<u64>,
    pub messages_sent: Option<u64>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

/// A clean-table row: the three key numeric fields are guaranteed present.
/// String fields stay optional; metrics over them skip missing values.
#[derive(Debug, Clone)]
pub struct Record {
    pub date: Option<String>,
    pub duration_hours: f64,
    pub polycount: u64,
    pub messages_sent: u64,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// `duration_hours` rounded half-to-even; grouping key only.
    pub duration_rounded: i64,
}

/// The closed set of report metrics. Declaration order is display order and
/// the row order the comparator aligns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    DaysObserved,
    TotalIncidents,
    MeanDurationHours,
    TotalDurationHours,
    DurationRangeHours,
    TopSubCategory,
    BottomSubCategory,
    PeakDate,
    QuietestDate,
    PctOverOneHour,
    CategoryCount,
    SubCategoryCount,
    MissingPolycount,
    MissingPolycountPct,
}

impl MetricName {
    pub fn label(self) -> &'static str {
        match self {
            MetricName::DaysObserved => "Days observed",
            MetricName::TotalIncidents => "Total shortage incidents",
            MetricName::MeanDurationHours => "Average shortage duration (hours)",
            MetricName::TotalDurationHours => "Total shortage hours",
            MetricName::DurationRangeHours => "Shortage hours range",
            MetricName::TopSubCategory => "Sub-category with most shortages",
            MetricName::BottomSubCategory => "Sub-category with fewest shortages",
            MetricName::PeakDate => "Date with most shortages",
            MetricName::QuietestDate => "Date with fewest shortages",
            MetricName::PctOverOneHour => "Open for more than an hour (%)",
            MetricName::CategoryCount => "Distinct categories",
            MetricName::SubCategoryCount => "Distinct sub-categories",
            MetricName::MissingPolycount => "Missing polycount values",
            MetricName::MissingPolycountPct => "Missing polycount (%)",
        }
    }
}

/// Metric values are either numeric or a label (a category or date name);
/// the comparator pattern-matches on this instead of coercing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(i64),
    Number(f64),
    Label(String),
}

/// Ordered metric-name/value pairs for one dataset. Extremum metrics are
/// absent entirely when their source subset is empty.
#[derive(Debug, Clone)]
pub struct MetricReport {
    pub entries: Vec<(MetricName, MetricValue)>,
}

impl MetricReport {
    pub fn get(&self, name: MetricName) -> Option<&MetricValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// One comparator row. `None` deltas mark non-numeric cases (label metrics,
/// NaN sentinels, or a zero baseline for the percent delta).
#[derive(Debug, Clone)]
pub struct Comparison {
    pub name: MetricName,
    pub t0: MetricValue,
    pub t1: MetricValue,
    pub delta: Option<f64>,
    pub pct_delta: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "T0")]
    #[tabled(rename = "T0")]
    pub t0: String,
    #[serde(rename = "T1")]
    #[tabled(rename = "T1")]
    pub t1: String,
    #[serde(rename = "Delta")]
    #[tabled(rename = "Delta")]
    pub delta: String,
    #[serde(rename = "DeltaPct")]
    #[tabled(rename = "DeltaPct")]
    pub delta_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HourlyMessagesRow {
    #[serde(rename = "RoundedHour")]
    #[tabled(rename = "RoundedHour")]
    pub rounded_hour: i64,
    #[serde(rename = "MessagesSent")]
    #[tabled(rename = "MessagesSent")]
    pub messages_sent: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HourlyShortagesRow {
    #[serde(rename = "RoundedHour")]
    #[tabled(rename = "RoundedHour")]
    pub rounded_hour: i64,
    #[serde(rename = "TotalIncidents")]
    #[tabled(rename = "TotalIncidents")]
    pub total_incidents: String,
}
