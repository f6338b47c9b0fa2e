use crate::analysis::{AnalysisResult, CustomerProfile, ReportSubject, Summary};
use crate::canvas::{BlockRole, Canvas, Document, Section};
use crate::capture::{
    CaptureRecord, CaptureRequest, CaptureState, ChartSource, capture_with_timeout, fit_image,
};
use crate::chart::{ChartId, ChartKind, ChartSpec, chart_specs};
use crate::cursor::LayoutCursor;
use crate::debug::DebugLogger;
use crate::font::FontFace;
use crate::format;
use crate::metrics::DocumentMetrics;
use crate::text_flow::{
    Column, DrawLine, TextStyle, render_block, render_key_value, render_list,
};
use crate::types::{Color, Margins, Pt, Size};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: Size,
    pub margins: Margins,
    pub title: String,
    pub title_size: Pt,
    pub heading_size: Pt,
    pub body_size: Pt,
    pub line_height: f32,
    pub section_gap: Pt,
    pub chart_pixels: (u32, u32),
    pub capture_timeout: Duration,
    pub chart_order: Vec<ChartId>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins::all_mm(20.0),
            title: "Credit Risk Analysis Report".to_string(),
            title_size: Pt::from_i32(20),
            heading_size: Pt::from_i32(14),
            body_size: Pt::from_i32(12),
            line_height: 1.2,
            section_gap: Pt::from_i32(10),
            chart_pixels: (1200, 800),
            capture_timeout: Duration::from_secs(10),
            chart_order: ChartId::FIXED_ORDER.to_vec(),
        }
    }
}

impl LayoutConfig {
    pub fn column(&self) -> Column {
        Column::new(
            self.margins.left,
            self.page_size.width - self.margins.horizontal(),
        )
    }

    fn style(&self, face: FontFace, size: Pt) -> TextStyle {
        TextStyle::new(face, size, size * self.line_height)
    }

    pub fn title_style(&self) -> TextStyle {
        self.style(FontFace::HelveticaBold, self.title_size)
    }

    pub fn heading_style(&self) -> TextStyle {
        self.style(FontFace::HelveticaBold, self.heading_size)
    }

    pub fn body_style(&self) -> TextStyle {
        self.style(FontFace::Helvetica, self.body_size)
    }
}

/// Composer stages, visited once each and in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Summary,
    Metrics,
    Chart(usize),
    Finalized,
}

pub struct ComposedReport {
    pub document: Document,
    pub metrics: DocumentMetrics,
    pub captures: Vec<CaptureRecord>,
}

const MUTED: (u8, u8, u8) = (100, 116, 139);
const RULE: (u8, u8, u8) = (203, 213, 225);
const NOTICE: (u8, u8, u8) = (185, 28, 28);

pub fn risk_color(score: f64) -> Color {
    if score >= 80.0 {
        Color::rgb8(22, 163, 74)
    } else if score >= 60.0 {
        Color::rgb8(217, 119, 6)
    } else {
        Color::rgb8(220, 38, 38)
    }
}

struct Composer<'a> {
    config: &'a LayoutConfig,
    canvas: Canvas,
    cursor: LayoutCursor,
    column: Column,
    stage: Stage,
    last_page: usize,
    metrics: DocumentMetrics,
    captures: Vec<CaptureRecord>,
    debug: Option<Arc<DebugLogger>>,
}

/// Lays out `result` into pages and captures its charts, one at a time.
pub async fn compose<S: ChartSource>(
    config: &LayoutConfig,
    result: &AnalysisResult,
    subject: &ReportSubject,
    source: &S,
    debug: Option<Arc<DebugLogger>>,
) -> ComposedReport {
    let mut composer = Composer {
        config,
        canvas: Canvas::new(config.page_size),
        cursor: LayoutCursor::new(config.page_size.height, config.margins),
        column: config.column(),
        stage: Stage::Init,
        last_page: 0,
        metrics: DocumentMetrics::default(),
        captures: Vec::new(),
        debug,
    };

    let layout_start = Instant::now();
    composer.header(subject);
    if let Some(profile) = &result.customer_profile {
        composer.customer_summary(profile);
    }
    if let Some(error) = &result.parse_error {
        composer.notice(error);
    }
    composer.enter(Stage::Summary);
    if let Some(summary) = &result.summary {
        composer.summary(summary);
    }
    composer.enter(Stage::Metrics);
    composer.metrics_sections(result);
    composer.metrics.layout_ms += layout_start.elapsed().as_secs_f64() * 1000.0;

    for (index, spec) in chart_specs(result, &config.chart_order).iter().enumerate() {
        composer.enter(Stage::Chart(index));
        composer.chart(spec, source).await;
    }

    composer.finalize()
}

impl Composer<'_> {
    fn enter(&mut self, stage: Stage) {
        debug_assert!(stage > self.stage, "stages only move forward");
        tracing::debug!(from = ?self.stage, to = ?stage, "composer stage");
        self.stage = stage;
    }

    fn log_page_break(&self, from_page: usize, to_page: usize, reason: &str, section: Section) {
        tracing::debug!(from_page, to_page, reason, ?section, "page break");
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        logger.log_event(
            "report.page_break",
            json!({
                "code": "PAGE_BREAK_TRIGGER",
                "reason": reason,
                "from_page": from_page + 1,
                "to_page": to_page + 1,
                "section": format!("{section:?}"),
            }),
        );
        logger.increment("report.page_break", 1);
    }

    fn draw_lines(&mut self, lines: &[DrawLine], section: Section) {
        for line in lines {
            if line.page_index > self.last_page {
                self.log_page_break(self.last_page, line.page_index, "content_overflow", section);
                self.last_page = line.page_index;
            }
            self.canvas.draw_line(line);
        }
    }

    // Keeps a heading together with the first line of its body.
    fn keep_with_next(&mut self, height: Pt, section: Section) {
        if self.cursor.is_fresh() || self.cursor.remaining_height() >= height {
            return;
        }
        let from = self.cursor.page_index();
        self.cursor.force_new_page();
        self.log_page_break(from, self.cursor.page_index(), "keep_with_next", section);
        self.last_page = self.cursor.page_index();
    }

    fn heading(&mut self, section: Section, text: &str) {
        let heading = self.config.heading_style();
        let body = self.config.body_style();
        self.cursor.skip(self.config.section_gap);
        self.keep_with_next(heading.line_height + body.line_height, section);
        let lines = render_block(&mut self.cursor, text, &heading, self.column);
        self.emit(section, BlockRole::Heading, &lines);
    }

    fn body_lines(&mut self, section: Section, lines: Vec<DrawLine>) {
        self.emit(section, BlockRole::Body, &lines);
    }

    // Opens the block on the page of its first line.
    fn emit(&mut self, section: Section, role: BlockRole, lines: &[DrawLine]) {
        let Some(first) = lines.first() else {
            return;
        };
        self.canvas.goto_page(first.page_index);
        self.canvas.begin_block(section, role);
        self.draw_lines(lines, section);
        self.canvas.end_block();
    }

    fn header(&mut self, subject: &ReportSubject) {
        let title = self.config.title_style();
        let muted = self.config.body_style().with_color(rgb(MUTED));

        let lines = render_block(&mut self.cursor, &self.config.title, &title, self.column);
        self.emit(Section::Header, BlockRole::Heading, &lines);

        let mut rows = Vec::new();
        if let Some(customer) = &subject.customer {
            rows.push(render_key_value(
                &mut self.cursor,
                "Customer",
                customer,
                &muted,
                self.column,
            ));
        }
        if let Some(date) = subject.analysis_date {
            rows.push(render_key_value(
                &mut self.cursor,
                "Analysis Date",
                &date.format("%Y-%m-%d").to_string(),
                &muted,
                self.column,
            ));
        }
        if !rows.is_empty() {
            self.body_lines(Section::Header, rows);
        }

        // Rule under the header.
        let gap = self.config.section_gap / 2;
        let placed = self.cursor.reserve(gap);
        self.canvas.goto_page(placed.page_index);
        self.canvas.set_fill_color(rgb(RULE));
        self.canvas.draw_rect(
            self.column.x,
            placed.y + gap / 2,
            self.column.width,
            Pt::from_f32(0.75),
        );
    }

    fn customer_summary(&mut self, profile: &CustomerProfile) {
        let rows = collect_rows([
            ("Name", profile.customer_name.clone()),
            ("Age", profile.customer_age.map(format::years)),
            ("Occupation", profile.job_title.clone()),
            ("Company", profile.company.clone()),
            ("Annual Income", profile.annual_income.map(format::currency)),
            ("Credit Score", profile.credit_score.map(format::plain)),
        ]);
        self.key_value_section(Section::CustomerSummary, "Customer Summary", rows);
    }

    fn notice(&mut self, error: &str) {
        tracing::warn!(error, "analysis result unavailable; rendering notice only");
        let style = self.config.body_style().with_color(rgb(NOTICE));
        self.cursor.skip(self.config.section_gap);
        let line = render_key_value(
            &mut self.cursor,
            "Notice",
            "Could not parse analysis result",
            &style,
            self.column,
        );
        self.body_lines(Section::Notice, vec![line]);
    }

    fn summary(&mut self, summary: &Summary) {
        let body = self.config.body_style();
        if let Some(text) = &summary.overall_assessment {
            self.heading(Section::Assessment, "Overall Assessment");
            let lines = render_block(&mut self.cursor, text, &body, self.column);
            self.body_lines(Section::Assessment, lines);
        }
        let lists = [
            (Section::Strengths, "Key Strengths", &summary.key_strengths),
            (Section::Concerns, "Key Concerns", &summary.key_concerns),
            (
                Section::Recommendations,
                "Recommendations",
                &summary.recommendations,
            ),
        ];
        for (section, title, items) in lists {
            if items.iter().all(|item| item.trim().is_empty()) {
                continue;
            }
            self.heading(section, title);
            let lines = render_list(&mut self.cursor, items, &body, self.column);
            self.body_lines(section, lines);
        }
    }

    fn metrics_sections(&mut self, result: &AnalysisResult) {
        let body = self.config.body_style();
        if let Some(risk) = &result.credit_risk {
            let mut rows: Vec<(&str, String, Option<Color>)> = Vec::new();
            if let Some(score) = risk.risk_score {
                rows.push((
                    "Risk Score",
                    format!("{}/100", format::plain(score)),
                    Some(risk_color(score)),
                ));
            }
            if let Some(probability) = risk.approval_probability {
                rows.push(("Approval Probability", format::percent(probability), None));
            }
            if let Some(recommendation) = &risk.approval_recommendation {
                rows.push(("Recommendation", recommendation.clone(), None));
            }
            self.key_value_section(Section::CreditRisk, "Credit Risk Analysis", rows);

            if risk.risk_factors.iter().any(|f| !f.trim().is_empty()) {
                self.heading(Section::RiskFactors, "Risk Factors");
                let lines = render_list(&mut self.cursor, &risk.risk_factors, &body, self.column);
                self.body_lines(Section::RiskFactors, lines);
            }
        }

        if let Some(m) = &result.financial_metrics {
            let rows = collect_rows([
                ("Debt-to-Income Ratio", m.debt_to_income_ratio.map(format::percent)),
                ("Loan-to-Value Ratio", m.loan_to_value_ratio.map(format::percent)),
                ("Credit Utilization", m.credit_utilization.map(format::percent)),
                ("Savings Rate", m.savings_rate.map(format::percent)),
                ("Monthly Savings", m.monthly_savings.map(format::currency)),
                ("Net Worth", m.net_worth.map(format::currency)),
                ("Total Assets", m.total_assets.map(format::currency)),
                ("Total Liabilities", m.total_liabilities.map(format::currency)),
            ]);
            self.key_value_section(Section::FinancialMetrics, "Financial Metrics", rows);
        }

        if let Some(m) = &result.loan_metrics {
            let rows = collect_rows([
                ("Monthly Payment", m.monthly_payment.map(format::currency)),
                ("Total Interest Paid", m.total_interest_paid.map(format::currency)),
                ("Break-even Period", m.break_even_years.map(format::years)),
                ("Early Payment Savings", m.early_payment_savings.map(format::currency)),
            ]);
            self.key_value_section(Section::LoanMetrics, "Loan Metrics", rows);
        }

        if let Some(p) = &result.property_analysis {
            let rows = collect_rows([
                ("5-Year Value Growth", p.property_value_growth_5yr.clone()),
                ("Market Risk", p.market_risk.clone()),
                ("Property Tax Rate", p.property_tax_rate.map(format::percent)),
            ]);
            self.key_value_section(Section::PropertyAnalysis, "Property Analysis", rows);
        }

        if let Some(e) = &result.economic_factors {
            let rows = collect_rows([
                ("Economic Conditions Risk", e.economic_conditions_risk.clone()),
                ("Inflation Rate", e.inflation_rate.map(format::percent)),
                ("Interest Rate Trend", e.interest_rate_trend.clone()),
            ]);
            self.key_value_section(Section::EconomicFactors, "Economic Factors", rows);
        }
    }

    fn key_value_section(
        &mut self,
        section: Section,
        title: &str,
        rows: Vec<(&str, String, Option<Color>)>,
    ) {
        if rows.is_empty() {
            return;
        }
        self.heading(section, title);
        let body = self.config.body_style();
        let lines = rows
            .into_iter()
            .map(|(label, value, color)| {
                let style = color.map(|c| body.with_color(c)).unwrap_or(body);
                render_key_value(&mut self.cursor, label, &value, &style, self.column)
            })
            .collect();
        self.body_lines(section, lines);
    }

    async fn chart<S: ChartSource>(&mut self, spec: &ChartSpec, source: &S) {
        let (width_px, height_px) = self.config.chart_pixels;
        let request = CaptureRequest::new(spec, width_px, height_px);
        let started = Instant::now();
        let (result, record) =
            capture_with_timeout(source, &request, self.config.capture_timeout).await;
        self.metrics.capture_ms += started.elapsed().as_secs_f64() * 1000.0;
        self.log_capture(&record);
        self.captures.push(record);

        let image = match result {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(chart = %spec.id, error = %err, "chart capture failed; skipping page");
                self.metrics.charts_skipped += 1;
                return;
            }
        };
        self.metrics.charts_captured += 1;

        let layout_start = Instant::now();
        let section = Section::Chart(spec.id);
        let from = self.cursor.page_index();
        self.cursor.force_new_page();
        self.log_page_break(from, self.cursor.page_index(), "chart_page", section);
        self.last_page = self.cursor.page_index();

        let heading = self.config.heading_style();
        let body = self.config.body_style();
        let lines = render_block(&mut self.cursor, spec.id.title(), &heading, self.column);
        self.emit(section, BlockRole::Heading, &lines);
        self.cursor.skip(self.config.section_gap / 2);

        // Legend rows are capped at half the page so the image keeps the rest.
        let legend = spec.kind.legend();
        let max_rows = (self.cursor.content_height() / 2)
            .to_milli_i64()
            .checked_div(body.line_height.to_milli_i64())
            .unwrap_or(0)
            .max(1) as usize;
        let legend: Vec<_> = legend.into_iter().take(max_rows).collect();
        let legend_height = body.line_height * legend.len() as i32 + self.config.section_gap / 2;

        let available = Size::new(
            self.column.width,
            (self.cursor.remaining_height() - legend_height).max(Pt::from_i32(1)),
        );
        let fitted = fit_image(image.width(), image.height(), available);
        let placed = self.cursor.reserve(fitted.height);
        let resource_id = format!("Im{}", self.metrics.charts_captured);
        let x = self.column.x + (self.column.width - fitted.width) / 2;
        self.canvas.goto_page(placed.page_index);
        self.canvas.begin_block(section, BlockRole::Body);
        self.canvas
            .draw_image(x, placed.y, fitted.width, fitted.height, resource_id.clone());
        self.canvas.register_image(resource_id, image);
        self.canvas.end_block();

        self.cursor.skip(self.config.section_gap / 2);
        self.legend(section, &spec.kind, legend, &body);
        self.metrics.layout_ms += layout_start.elapsed().as_secs_f64() * 1000.0;
    }

    fn legend(
        &mut self,
        section: Section,
        kind: &ChartKind,
        entries: Vec<(String, Color, f64)>,
        body: &TextStyle,
    ) {
        let swatch = body.size.mul_ratio(7, 10);
        let text_column = Column::new(
            self.column.x + swatch + Pt::from_i32(6),
            self.column.width - swatch - Pt::from_i32(6),
        );
        let label_suffix = match kind {
            ChartKind::TimeSeries(_) => " (final)",
            _ => "",
        };
        self.canvas.begin_block(section, BlockRole::Body);
        for (label, color, value) in entries {
            let line = render_key_value(
                &mut self.cursor,
                &format!("{label}{label_suffix}"),
                &format::currency(value),
                body,
                text_column,
            );
            self.canvas.goto_page(line.page_index);
            self.canvas.set_fill_color(color);
            self.canvas
                .draw_rect(self.column.x, line.baseline - swatch, swatch, swatch);
            self.draw_lines(std::slice::from_ref(&line), section);
        }
        self.canvas.end_block();
    }

    fn log_capture(&self, record: &CaptureRecord) {
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        let (state, error) = match &record.state {
            CaptureState::Failed(err) => ("failed", Some(err.to_string())),
            CaptureState::Resolved { .. } => ("resolved", None),
            _ => ("pending", None),
        };
        logger.log_event(
            "report.capture",
            json!({
                "chart": record.chart.region_id(),
                "state": state,
                "error": error,
                "elapsed_ms": record.elapsed_ms,
            }),
        );
        logger.increment(&format!("report.capture.{state}"), 1);
    }

    fn finalize(mut self) -> ComposedReport {
        self.enter(Stage::Finalized);
        let document = self.canvas.finish();
        self.metrics.count_pages(&document);
        if let Some(logger) = self.debug.as_deref() {
            logger.increment("report.pages", document.page_count() as u64);
        }
        ComposedReport {
            document,
            metrics: self.metrics,
            captures: self.captures,
        }
    }
}

fn collect_rows<const N: usize>(
    rows: [(&'static str, Option<String>); N],
) -> Vec<(&'static str, String, Option<Color>)> {
    rows.into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v, None)))
        .collect()
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::rgb8(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize;
    use crate::canvas::Command;
    use crate::capture::OffscreenCharts;
    use serde_json::json;

    #[tokio::test]
    async fn absent_sections_leave_no_blocks() {
        let result = normalize(&json!({
            "loan_metrics": {"monthly_payment": 1843.21}
        }));
        let config = LayoutConfig::default();
        let report = compose(
            &config,
            &result,
            &ReportSubject::default(),
            &OffscreenCharts,
            None,
        )
        .await;
        let doc = &report.document;
        assert_eq!(doc.page_count(), 1);
        assert_eq!(
            doc.section_order(),
            vec![Section::Header, Section::LoanMetrics]
        );
        assert_eq!(
            doc.lines(Section::LoanMetrics, BlockRole::Body),
            vec!["Monthly Payment: $1,843.21"]
        );
        assert!(report.captures.is_empty());
    }

    #[tokio::test]
    async fn heading_is_not_left_alone_at_page_bottom() {
        let mut config = LayoutConfig::default();
        config.page_size = Size::from_mm(120.0, 110.0);
        config.margins = Margins::all_mm(10.0);
        let result = normalize(&json!({
            "summary": {
                "key_strengths": [
                    "one", "two", "three", "four", "five", "six",
                    "seven", "eight", "nine", "ten", "eleven"
                ],
                "recommendations": ["keep going"]
            }
        }));
        let report = compose(
            &config,
            &result,
            &ReportSubject::default(),
            &OffscreenCharts,
            None,
        )
        .await;
        let doc = &report.document;
        for section in [Section::Strengths, Section::Recommendations] {
            let heading_pages: Vec<usize> = doc
                .lines_with_pages(section, BlockRole::Heading)
                .iter()
                .map(|(page, _)| *page)
                .collect();
            let first_body = doc.lines_with_pages(section, BlockRole::Body)[0].0;
            assert_eq!(heading_pages, vec![first_body]);
        }
        // The heading alone would still fit under the strengths list.
        assert_eq!(
            doc.pages_with(Section::Recommendations),
            vec![1]
        );
        assert_eq!(doc.pages_with(Section::Strengths), vec![0]);
    }

    #[tokio::test]
    async fn metric_sections_render_every_row() {
        let result = normalize(&json!({
            "credit_risk_analysis": {
                "risk_score": 72,
                "approval_probability": 81,
                "approval_recommendation": "Approve with conditions"
            },
            "financial_metrics": {
                "debt_to_income_ratio": 28.5,
                "monthly_savings": 850,
                "net_worth": 130000,
                "total_assets": 410000,
                "total_liabilities": 280000
            },
            "property_analysis": {
                "property_value_growth_5yr": "12-18%",
                "market_risk": "Moderate",
                "property_tax_rate": 1.2
            },
            "economic_factors": {
                "economic_conditions_risk": "Low",
                "inflation_rate": 3.1,
                "interest_rate_trend": "Stable"
            }
        }));
        let config = LayoutConfig::default();
        let report = compose(
            &config,
            &result,
            &ReportSubject::default(),
            &OffscreenCharts,
            None,
        )
        .await;
        let doc = &report.document;
        assert_eq!(
            doc.section_order(),
            vec![
                Section::Header,
                Section::CreditRisk,
                Section::FinancialMetrics,
                Section::PropertyAnalysis,
                Section::EconomicFactors,
            ]
        );
        assert_eq!(
            doc.lines(Section::CreditRisk, BlockRole::Body),
            vec![
                "Risk Score: 72/100",
                "Approval Probability: 81%",
                "Recommendation: Approve with conditions",
            ]
        );
        assert_eq!(
            doc.lines(Section::FinancialMetrics, BlockRole::Body),
            vec![
                "Debt-to-Income Ratio: 28.5%",
                "Monthly Savings: $850.00",
                "Net Worth: $130,000.00",
                "Total Assets: $410,000.00",
                "Total Liabilities: $280,000.00",
            ]
        );
        assert_eq!(
            doc.lines(Section::PropertyAnalysis, BlockRole::Body),
            vec![
                "5-Year Value Growth: 12-18%",
                "Market Risk: Moderate",
                "Property Tax Rate: 1.2%",
            ]
        );
        assert_eq!(
            doc.lines(Section::EconomicFactors, BlockRole::Body),
            vec![
                "Economic Conditions Risk: Low",
                "Inflation Rate: 3.1%",
                "Interest Rate Trend: Stable",
            ]
        );

        // Each row is drawn in the fill color set last before it.
        let mut fill = Color::BLACK;
        let mut row_colors = Vec::new();
        for cmd in &doc.pages[0].commands {
            match cmd {
                Command::SetFillColor(color) => fill = *color,
                Command::DrawString { text, .. } if text.starts_with("Risk Score:") => {
                    row_colors.push(("score", fill))
                }
                Command::DrawString { text, .. } if text.starts_with("Approval Probability:") => {
                    row_colors.push(("probability", fill))
                }
                _ => {}
            }
        }
        assert_eq!(
            row_colors,
            vec![("score", risk_color(72.0)), ("probability", Color::BLACK)]
        );
    }

    #[tokio::test]
    async fn customer_summary_follows_the_header() {
        let result = normalize(&json!({
            "customer_name": "Jane Roe",
            "customer_age": 34,
            "job_title": "Software Engineer",
            "annual_income": "95000.00",
            "credit_score": 742,
            "risk_score": 78
        }));
        let config = LayoutConfig::default();
        let report = compose(
            &config,
            &result,
            &ReportSubject::default(),
            &OffscreenCharts,
            None,
        )
        .await;
        let doc = &report.document;
        assert_eq!(
            doc.section_order(),
            vec![Section::Header, Section::CustomerSummary, Section::CreditRisk]
        );
        assert_eq!(
            doc.lines(Section::CustomerSummary, BlockRole::Heading),
            vec!["Customer Summary"]
        );
        assert_eq!(
            doc.lines(Section::CustomerSummary, BlockRole::Body),
            vec![
                "Name: Jane Roe",
                "Age: 34 years",
                "Occupation: Software Engineer",
                "Annual Income: $95,000.00",
                "Credit Score: 742",
            ]
        );
    }

    #[test]
    fn risk_bands() {
        assert_eq!(risk_color(92.0), Color::rgb8(22, 163, 74));
        assert_eq!(risk_color(80.0), Color::rgb8(22, 163, 74));
        assert_eq!(risk_color(65.0), Color::rgb8(217, 119, 6));
        assert_eq!(risk_color(12.0), Color::rgb8(220, 38, 38));
    }
}
