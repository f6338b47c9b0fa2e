//! Normalization of the backend analysis payload.
//!
//! The backend hands back model output that may be a JSON object, a JSON
//! string holding an object, or an object wrapped in a record/LLM envelope.
//! `normalize` resolves all of that once, so the composer only ever sees
//! explicit `Option` sections.
//!
//! Two payload shapes exist. The v1 analysis nests every section under its
//! own key (`credit_risk_analysis`, `loan_metrics`, ...). The v2 record
//! (`GET /v2/loan-analyses/{id}`) is flat: the same fields sit at the top
//! level next to the customer columns, and the chart series are top-level
//! JSON fields that may themselves arrive string-encoded.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub summary: Option<Summary>,
    pub credit_risk: Option<CreditRiskAnalysis>,
    pub financial_metrics: Option<FinancialMetrics>,
    pub loan_metrics: Option<LoanMetrics>,
    pub property_analysis: Option<PropertyAnalysis>,
    pub economic_factors: Option<EconomicFactors>,
    pub chart_data: Option<ChartData>,
    pub customer_profile: Option<CustomerProfile>,
    pub parse_error: Option<String>,
}

/// Applicant columns shown in the report's customer summary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomerProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub customer_age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub annual_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub overall_assessment: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_concerns: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreditRiskAnalysis {
    #[serde(default, deserialize_with = "lenient_number")]
    pub risk_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub approval_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub approval_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinancialMetrics {
    #[serde(default, deserialize_with = "lenient_number")]
    pub debt_to_income_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub loan_to_value_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_utilization: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub savings_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_savings: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_worth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_liabilities: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoanMetrics {
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_payment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_interest_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub break_even_years: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub early_payment_savings: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyAnalysis {
    #[serde(
        default,
        alias = "property_value_growth",
        deserialize_with = "lenient_text"
    )]
    pub property_value_growth_5yr: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub market_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub property_tax_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EconomicFactors {
    #[serde(default, deserialize_with = "lenient_text")]
    pub economic_conditions_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub inflation_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub interest_rate_trend: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartData {
    /// Label/value pairs in payload order.
    #[serde(default, deserialize_with = "lenient_categories")]
    pub debt_breakdown: Option<Vec<(String, f64)>>,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub income_vs_expenses: Option<Vec<(String, f64)>>,
    #[serde(default, deserialize_with = "lenient_categories")]
    pub net_worth_composition: Option<Vec<(String, f64)>>,
    #[serde(default, deserialize_with = "lenient_amortization")]
    pub loan_amortization: Option<Vec<AmortizationPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationPoint {
    pub year: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub remaining_balance: f64,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.overall_assessment.is_none()
            && self.key_strengths.is_empty()
            && self.key_concerns.is_empty()
            && self.recommendations.is_empty()
    }
}

impl AnalysisResult {
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self {
            parse_error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Who and when the report is about; drives the header and the file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSubject {
    pub customer: Option<String>,
    pub analysis_date: Option<NaiveDate>,
}

impl ReportSubject {
    pub fn new(customer: impl Into<String>, analysis_date: Option<NaiveDate>) -> Self {
        Self {
            customer: Some(customer.into()),
            analysis_date,
        }
    }

    /// Reads the identifying fields of an analysis record
    /// (`GET /analyses/{id}` or `GET /v2/loan-analyses/{id}`).
    pub fn from_record(record: &Value) -> Self {
        let Some(object) = record.as_object() else {
            return Self::default();
        };
        let customer = ["customer_phone", "customer_name", "id"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find_map(|value| match value {
                Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            });
        let analysis_date = object
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_date);
        Self {
            customer,
            analysis_date,
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn normalize(raw: &Value) -> AnalysisResult {
    match raw {
        Value::String(text) => normalize_text(text),
        Value::Object(object) => {
            if let Some(inner) = object.get("analysis_result") {
                let mut result = normalize(inner);
                if result.customer_profile.is_none() {
                    result.customer_profile = flat_section(raw);
                }
                return result;
            }
            if let Some(content) = llm_message_content(raw) {
                return normalize(content);
            }
            normalize_object(raw)
        }
        Value::Null => AnalysisResult::parse_failed("analysis result is empty"),
        other => AnalysisResult::parse_failed(format!(
            "analysis result is not an object: {}",
            value_kind(other)
        )),
    }
}

pub fn normalize_text(text: &str) -> AnalysisResult {
    match parse_embedded_json(text) {
        Ok(value) if value.is_string() && value.as_str() == Some(text) => {
            AnalysisResult::parse_failed("analysis result is a bare string")
        }
        Ok(value) => normalize(&value),
        Err(err) => {
            tracing::warn!(error = %err, "analysis result is not valid json");
            AnalysisResult::parse_failed(format!("could not parse analysis result: {err}"))
        }
    }
}

// The backend accepts model output with chatter around the object; recover it
// the same way before giving up.
fn parse_embedded_json(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(err) => {
            let start = text.find('{');
            let end = text.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str::<Value>(&text[start..=end]).map_err(|_| err)
                }
                _ => Err(err),
            }
        }
    }
}

fn llm_message_content(raw: &Value) -> Option<&Value> {
    raw.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")
}

const SECTION_KEYS: [&str; 7] = [
    "summary",
    "credit_risk_analysis",
    "financial_metrics",
    "loan_metrics",
    "property_analysis",
    "economic_factors",
    "chart_data",
];

fn normalize_object(raw: &Value) -> AnalysisResult {
    let nested = SECTION_KEYS.iter().any(|key| raw.get(*key).is_some());
    let mut result = if nested {
        AnalysisResult {
            summary: section(raw, "summary"),
            credit_risk: section(raw, "credit_risk_analysis"),
            financial_metrics: section(raw, "financial_metrics"),
            loan_metrics: section(raw, "loan_metrics"),
            property_analysis: section(raw, "property_analysis"),
            economic_factors: section(raw, "economic_factors"),
            chart_data: section(raw, "chart_data"),
            ..AnalysisResult::default()
        }
    } else {
        // v2 record: every section reads its fields from the top level.
        AnalysisResult {
            credit_risk: flat_section(raw),
            financial_metrics: flat_section(raw),
            loan_metrics: flat_section(raw),
            property_analysis: flat_section(raw),
            economic_factors: flat_section(raw),
            chart_data: flat_section(raw),
            ..AnalysisResult::default()
        }
    };
    result.customer_profile = flat_section(raw);
    if result.summary.as_ref().is_some_and(Summary::is_empty) {
        result.summary = None;
    }
    if let Some(charts) = &result.chart_data {
        if charts.debt_breakdown.is_none()
            && charts.income_vs_expenses.is_none()
            && charts.net_worth_composition.is_none()
            && charts.loan_amortization.is_none()
        {
            result.chart_data = None;
        }
    }
    if result == AnalysisResult::default() {
        tracing::warn!("analysis result has no recognizable sections");
        return AnalysisResult::parse_failed("analysis result has no recognizable sections");
    }
    result
}

// A section whose fields are all absent is treated as missing.
fn flat_section<T>(raw: &Value) -> Option<T>
where
    T: for<'de> Deserialize<'de> + Default + PartialEq,
{
    match T::deserialize(raw) {
        Ok(section) if section != T::default() => Some(section),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "dropping malformed flat section");
            None
        }
    }
}

fn section<T>(raw: &Value, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = raw.get(key)?;
    if !value.is_object() {
        tracing::debug!(section = key, kind = value_kind(value), "section is not an object");
        return None;
    }
    match T::deserialize(value) {
        Ok(section) => Some(section),
        Err(err) => {
            tracing::debug!(section = key, error = %err, "dropping malformed section");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, '$' | '%' | ',' | ' '))
                .collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

// JSON columns of the v2 record can come back as strings holding JSON.
fn decode_json_column(value: Option<Value>) -> Option<Value> {
    match value {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') || trimmed.starts_with('{') {
                serde_json::from_str(trimmed)
                    .ok()
                    .or(Some(Value::String(text)))
            } else {
                Some(Value::String(text))
            }
        }
        other => other,
    }
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = decode_json_column(Option::<Value>::deserialize(deserializer)?);
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(text_from_value).collect(),
        Some(other) => text_from_value(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

fn lenient_categories<'de, D>(deserializer: D) -> Result<Option<Vec<(String, f64)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = decode_json_column(Option::<Value>::deserialize(deserializer)?);
    let Some(Value::Object(entries)) = value else {
        return Ok(None);
    };
    let categories: Vec<(String, f64)> = entries
        .iter()
        .filter_map(|(label, value)| number_from_value(value).map(|v| (label.clone(), v)))
        .collect();
    Ok((!categories.is_empty()).then_some(categories))
}

fn lenient_amortization<'de, D>(deserializer: D) -> Result<Option<Vec<AmortizationPoint>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = decode_json_column(Option::<Value>::deserialize(deserializer)?);
    let Some(Value::Array(rows)) = value else {
        return Ok(None);
    };
    let field = |row: &Value, key: &str| row.get(key).and_then(number_from_value);
    let mut points: Vec<AmortizationPoint> = rows
        .iter()
        .filter_map(|row| {
            Some(AmortizationPoint {
                year: field(row, "year")?,
                principal_paid: field(row, "principal_paid").unwrap_or(0.0),
                interest_paid: field(row, "interest_paid").unwrap_or(0.0),
                remaining_balance: field(row, "remaining_balance").unwrap_or(0.0),
            })
        })
        .collect();
    points.sort_by(|a, b| a.year.total_cmp(&b.year));
    Ok((!points.is_empty()).then_some(points))
}
