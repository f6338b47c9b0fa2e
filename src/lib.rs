#![recursion_limit = "256"]

mod analysis;
mod canvas;
mod capture;
mod chart;
mod composer;
mod cursor;
mod debug;
mod error;
mod finalize;
mod font;
mod format;
mod metrics;
mod pdf;
mod raster;
mod text_flow;
mod types;

pub use analysis::{
    AmortizationPoint, AnalysisResult, ChartData, CreditRiskAnalysis, CustomerProfile,
    EconomicFactors, FinancialMetrics, LoanMetrics, PropertyAnalysis, ReportSubject, Summary,
    normalize, normalize_text,
};
pub use canvas::{BlockRole, Canvas, Command, Document, Page, Section};
pub use capture::{
    CaptureRecord, CaptureRequest, CaptureState, ChartSource, OffscreenCharts,
    capture_with_timeout, fit_image,
};
pub use chart::{Category, ChartId, ChartKind, ChartSpec, Series, chart_specs};
pub use composer::{LayoutConfig, Stage, risk_color};
pub use cursor::{LayoutCursor, Reservation};
pub use error::{CaptureError, ReportError};
pub use finalize::{ReportArtifact, report_file_name};
pub use font::{FontFace, sanitize_text};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use raster::{RasterImage, render_chart};
pub use text_flow::{
    Column, DrawLine, TextStyle, render_block, render_key_value, render_list, wrap_lines,
};
pub use types::{Color, Margins, Pt, Size, mm};

use debug::DebugLogger;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const MAX_CHART_PIXELS: u32 = 8192;

/// Report generator. One generation runs at a time per engine; a second call
/// while one is in flight is rejected rather than queued.
pub struct ReportEngine {
    config: LayoutConfig,
    debug: Option<Arc<DebugLogger>>,
    in_flight: AtomicBool,
}

#[derive(Clone)]
pub struct ReportEngineBuilder {
    config: LayoutConfig,
    debug_path: Option<std::path::PathBuf>,
}

// Clears the in-flight flag however generation ends, including when the
// caller drops the future mid-capture.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReportEngine {
    pub fn builder() -> ReportEngineBuilder {
        ReportEngineBuilder::new()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Builds the document for `analysis`, capturing charts through `source`
    /// one after another, and serializes it to PDF.
    pub async fn generate<S: ChartSource>(
        &self,
        analysis: &AnalysisResult,
        subject: &ReportSubject,
        source: &S,
    ) -> Result<ReportArtifact, ReportError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::warn!("rejecting report generation: another one is in flight");
            return Err(ReportError::GenerationInProgress);
        };

        let composed =
            composer::compose(&self.config, analysis, subject, source, self.debug.clone()).await;
        let mut metrics = composed.metrics;

        let write_start = Instant::now();
        let output = pdf::document_to_pdf(&composed.document, &self.config.title)?;
        metrics.write_ms = write_start.elapsed().as_secs_f64() * 1000.0;
        metrics.record_content_sizes(&output.content_sizes);
        metrics.total_bytes = output.bytes.len();

        let file_name = report_file_name(subject);
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(&file_name);
            logger.flush();
        }
        tracing::info!(
            file_name = %file_name,
            pages = composed.document.page_count(),
            bytes = output.bytes.len(),
            charts_captured = metrics.charts_captured,
            charts_skipped = metrics.charts_skipped,
            "report generated"
        );
        Ok(ReportArtifact::new(
            file_name,
            output.bytes,
            composed.document,
            metrics,
            composed.captures,
        ))
    }

    /// Same as [`generate`](Self::generate) with headless chart plotting.
    ///
    /// Plotting runs on Tokio's blocking pool, so this must be awaited inside
    /// a Tokio runtime; awaiting it elsewhere panics.
    pub async fn generate_offscreen(
        &self,
        analysis: &AnalysisResult,
        subject: &ReportSubject,
    ) -> Result<ReportArtifact, ReportError> {
        self.generate(analysis, subject, &OffscreenCharts).await
    }

    /// Normalizes an analysis record as returned by the backend and renders it.
    pub async fn generate_from_record<S: ChartSource>(
        &self,
        record: &serde_json::Value,
        source: &S,
    ) -> Result<ReportArtifact, ReportError> {
        let analysis = normalize(record);
        let subject = ReportSubject::from_record(record);
        self.generate(&analysis, &subject, source).await
    }
}

impl Default for ReportEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.margins = margins;
        self
    }

    pub fn margin_all_mm(mut self, value: f32) -> Self {
        self.config.margins = Margins::all_mm(value);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn title_font_size(mut self, size: f32) -> Self {
        self.config.title_size = Pt::from_f32(size);
        self
    }

    pub fn heading_font_size(mut self, size: f32) -> Self {
        self.config.heading_size = Pt::from_f32(size);
        self
    }

    pub fn body_font_size(mut self, size: f32) -> Self {
        self.config.body_size = Pt::from_f32(size);
        self
    }

    /// Line box height as a multiple of the font size.
    pub fn line_height(mut self, factor: f32) -> Self {
        self.config.line_height = factor;
        self
    }

    pub fn section_gap(mut self, gap: f32) -> Self {
        self.config.section_gap = Pt::from_f32(gap);
        self
    }

    pub fn chart_resolution(mut self, width_px: u32, height_px: u32) -> Self {
        self.config.chart_pixels = (width_px, height_px);
        self
    }

    pub fn capture_timeout(mut self, timeout: Duration) -> Self {
        self.config.capture_timeout = timeout;
        self
    }

    pub fn chart_order(mut self, order: impl IntoIterator<Item = ChartId>) -> Self {
        self.config.chart_order = order.into_iter().collect();
        self
    }

    pub fn debug_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ReportEngine, ReportError> {
        let config = &self.config;
        let invalid = |message: String| Err(ReportError::InvalidConfiguration(message));
        if config.page_size.width <= config.margins.horizontal() {
            return invalid(format!(
                "margins ({}pt) leave no column on a {}pt wide page",
                config.margins.horizontal().to_f32(),
                config.page_size.width.to_f32()
            ));
        }
        if config.page_size.height <= config.margins.vertical() {
            return invalid(format!(
                "margins ({}pt) leave no content area on a {}pt tall page",
                config.margins.vertical().to_f32(),
                config.page_size.height.to_f32()
            ));
        }
        for (name, size) in [
            ("title", config.title_size),
            ("heading", config.heading_size),
            ("body", config.body_size),
        ] {
            if size <= Pt::ZERO {
                return invalid(format!("{name} font size must be positive"));
            }
        }
        if !config.line_height.is_finite() || config.line_height < 1.0 {
            return invalid(format!(
                "line height factor must be >= 1.0, got {}",
                config.line_height
            ));
        }
        let (width_px, height_px) = config.chart_pixels;
        if width_px == 0 || height_px == 0 || width_px > MAX_CHART_PIXELS || height_px > MAX_CHART_PIXELS
        {
            return invalid(format!(
                "chart resolution {width_px}x{height_px} outside 1..={MAX_CHART_PIXELS}"
            ));
        }
        if config.capture_timeout.is_zero() {
            return invalid("capture timeout must be non-zero".to_string());
        }
        let mut seen = Vec::with_capacity(config.chart_order.len());
        for chart in &config.chart_order {
            if seen.contains(chart) {
                return invalid(format!("chart {chart} listed twice in chart order"));
            }
            seen.push(*chart);
        }

        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        Ok(ReportEngine {
            config: self.config,
            debug,
            in_flight: AtomicBool::new(false),
        })
    }
}
