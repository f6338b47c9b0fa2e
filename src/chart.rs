use crate::analysis::{AmortizationPoint, AnalysisResult, ChartData};
use crate::types::Color;
use std::fmt;

/// The named charts a report can carry, one page each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartId {
    DebtBreakdown,
    IncomeExpenses,
    NetWorth,
    Amortization,
}

impl ChartId {
    pub const FIXED_ORDER: [ChartId; 4] = [
        ChartId::DebtBreakdown,
        ChartId::IncomeExpenses,
        ChartId::NetWorth,
        ChartId::Amortization,
    ];

    /// DOM region id the chart is mounted under in the client.
    pub fn region_id(self) -> &'static str {
        match self {
            ChartId::DebtBreakdown => "debt-breakdown-chart",
            ChartId::IncomeExpenses => "income-expenses-chart",
            ChartId::NetWorth => "net-worth-chart",
            ChartId::Amortization => "amortization-chart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::DebtBreakdown => "Debt Breakdown",
            ChartId::IncomeExpenses => "Income vs Expenses",
            ChartId::NetWorth => "Net Worth Composition",
            ChartId::Amortization => "Loan Amortization",
        }
    }

    pub fn from_region_id(raw: &str) -> Option<ChartId> {
        ChartId::FIXED_ORDER
            .into_iter()
            .find(|chart| chart.region_id() == raw)
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.region_id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Color,
    /// (x, y) pairs in ascending x.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Pie: share of a whole.
    CategoryBreakdown(Vec<Category>),
    /// Bars side by side.
    Comparison(Vec<Category>),
    /// Lines over a numeric x axis.
    TimeSeries(Vec<Series>),
}

impl ChartKind {
    pub fn is_plottable(&self) -> bool {
        match self {
            ChartKind::CategoryBreakdown(categories) => {
                categories.iter().any(|c| c.value > 0.0)
            }
            ChartKind::Comparison(categories) => categories.iter().any(|c| c.value != 0.0),
            ChartKind::TimeSeries(series) => series.iter().any(|s| !s.points.is_empty()),
        }
    }

    /// Legend rows printed beneath the chart image: label, swatch color, value.
    pub fn legend(&self) -> Vec<(String, Color, f64)> {
        match self {
            ChartKind::CategoryBreakdown(categories) | ChartKind::Comparison(categories) => {
                categories
                    .iter()
                    .enumerate()
                    .map(|(idx, c)| (c.label.clone(), palette(idx), c.value))
                    .collect()
            }
            ChartKind::TimeSeries(series) => series
                .iter()
                .map(|s| {
                    let last = s.points.last().map(|p| p.1).unwrap_or(0.0);
                    (s.label.clone(), s.color, last)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: ChartId,
    pub kind: ChartKind,
}

const PALETTE: [(u8, u8, u8); 8] = [
    (59, 130, 246),
    (239, 68, 68),
    (34, 197, 94),
    (234, 179, 8),
    (168, 85, 247),
    (20, 184, 166),
    (249, 115, 22),
    (100, 116, 139),
];

pub fn palette(index: usize) -> Color {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    Color::rgb8(r, g, b)
}

/// Charts present in `result`, in `order`. Absent or empty data yields no spec.
pub fn chart_specs(result: &AnalysisResult, order: &[ChartId]) -> Vec<ChartSpec> {
    let Some(data) = result.chart_data.as_ref() else {
        return Vec::new();
    };
    order
        .iter()
        .filter_map(|id| chart_kind(data, *id).map(|kind| ChartSpec { id: *id, kind }))
        .collect()
}

pub fn chart_kind(data: &ChartData, id: ChartId) -> Option<ChartKind> {
    match id {
        ChartId::DebtBreakdown => data
            .debt_breakdown
            .as_ref()
            .map(|m| ChartKind::CategoryBreakdown(categories(m))),
        ChartId::IncomeExpenses => data
            .income_vs_expenses
            .as_ref()
            .map(|m| ChartKind::Comparison(categories(m))),
        ChartId::NetWorth => data
            .net_worth_composition
            .as_ref()
            .map(|m| ChartKind::Comparison(categories(m))),
        ChartId::Amortization => data.loan_amortization.as_ref().map(|rows| {
            ChartKind::TimeSeries(vec![
                series(rows, "Principal Paid", palette(0), |row| row.principal_paid),
                series(rows, "Interest Paid", palette(1), |row| row.interest_paid),
                series(rows, "Remaining Balance", palette(2), |row| row.remaining_balance),
            ])
        }),
    }
}

fn series(
    rows: &[AmortizationPoint],
    label: &str,
    color: Color,
    pick: fn(&AmortizationPoint) -> f64,
) -> Series {
    Series {
        label: label.to_string(),
        color,
        points: rows.iter().map(|row| (row.year, pick(row))).collect(),
    }
}

fn categories(entries: &[(String, f64)]) -> Vec<Category> {
    entries
        .iter()
        .map(|(label, value)| Category {
            label: humanize(label),
            value: *value,
        })
        .collect()
}

// "credit_card" -> "Credit Card"
fn humanize(raw: &str) -> String {
    raw.split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
