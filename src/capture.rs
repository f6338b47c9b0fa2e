//! Asynchronous chart capture.
//!
//! A [`ChartSource`] turns a chart request into a raster. The built-in
//! [`OffscreenCharts`] plots the chart data headlessly; hosts that own a live
//! view can implement the trait themselves. Every capture goes through
//! [`capture_with_timeout`], and a failed or late capture only costs that
//! chart's page.

use crate::chart::{ChartId, ChartKind, ChartSpec};
use crate::error::CaptureError;
use crate::raster::{RasterImage, render_chart};
use crate::types::{Pt, Size};
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub width_px: u32,
    pub height_px: u32,
}

impl CaptureRequest {
    pub fn new(spec: &ChartSpec, width_px: u32, height_px: u32) -> Self {
        Self {
            chart: spec.id,
            kind: spec.kind.clone(),
            width_px,
            height_px,
        }
    }
}

pub trait ChartSource {
    /// Resolves once the chart has been fully rendered.
    fn capture(
        &self,
        request: &CaptureRequest,
    ) -> impl Future<Output = Result<RasterImage, CaptureError>> + Send;
}

/// Headless plotting on the blocking pool. Needs a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffscreenCharts;

impl ChartSource for OffscreenCharts {
    async fn capture(&self, request: &CaptureRequest) -> Result<RasterImage, CaptureError> {
        if !request.kind.is_plottable() {
            return Err(CaptureError::EmptySeries(request.chart));
        }
        let kind = request.kind.clone();
        let (width, height) = (request.width_px, request.height_px);
        tokio::task::spawn_blocking(move || render_chart(&kind, width, height))
            .await
            .map_err(|err| CaptureError::Render(format!("render task failed: {err}")))?
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Requested,
    Pending,
    Resolved { width: u32, height: u32 },
    Failed(CaptureError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub chart: ChartId,
    pub state: CaptureState,
    pub elapsed_ms: f64,
}

impl CaptureRecord {
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, CaptureState::Resolved { .. })
    }
}

/// Runs one capture through `Requested -> Pending -> Resolved | Failed`.
pub async fn capture_with_timeout<S: ChartSource>(
    source: &S,
    request: &CaptureRequest,
    timeout: Duration,
) -> (Result<RasterImage, CaptureError>, CaptureRecord) {
    let mut record = CaptureRecord {
        chart: request.chart,
        state: CaptureState::Requested,
        elapsed_ms: 0.0,
    };
    let started = Instant::now();
    record.state = CaptureState::Pending;
    let result = match tokio::time::timeout(timeout, source.capture(request)).await {
        Ok(result) => result,
        Err(_) => Err(CaptureError::TimedOut(timeout)),
    };
    record.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    record.state = match &result {
        Ok(image) => CaptureState::Resolved {
            width: image.width(),
            height: image.height(),
        },
        Err(err) => CaptureState::Failed(err.clone()),
    };
    (result, record)
}

/// Largest size with the source's aspect ratio that fits the available box.
/// Width-first: the image spans the column unless that makes it too tall.
pub fn fit_image(source_width: u32, source_height: u32, available: Size) -> Size {
    if source_width == 0 || source_height == 0 {
        return Size::new(Pt::ZERO, Pt::ZERO);
    }
    let (sw, sh) = reduce(source_width, source_height);
    let height = available.width.mul_ratio(sh, sw);
    if height <= available.height {
        return Size::new(available.width, height);
    }
    Size::new(available.height.mul_ratio(sw, sh), available.height)
}

// Keeps the ratio inside i32 for `Pt::mul_ratio`.
fn reduce(width: u32, height: u32) -> (i32, i32) {
    let divisor = gcd(width, height).max(1);
    let (mut w, mut h) = (width / divisor, height / divisor);
    while w > i32::MAX as u32 || h > i32::MAX as u32 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }
    (w as i32, h as i32)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Category;

    fn bars() -> ChartSpec {
        ChartSpec {
            id: ChartId::IncomeExpenses,
            kind: ChartKind::Comparison(vec![
                Category {
                    label: "Income".to_string(),
                    value: 6000.0,
                },
                Category {
                    label: "Expenses".to_string(),
                    value: 4200.0,
                },
            ]),
        }
    }

    struct Never;

    impl ChartSource for Never {
        fn capture(
            &self,
            _request: &CaptureRequest,
        ) -> impl Future<Output = Result<RasterImage, CaptureError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn offscreen_capture_resolves_at_requested_resolution() {
        let request = CaptureRequest::new(&bars(), 320, 200);
        let (result, record) =
            capture_with_timeout(&OffscreenCharts, &request, Duration::from_secs(5)).await;
        let image = result.expect("captured");
        assert_eq!((image.width(), image.height()), (320, 200));
        assert_eq!(
            record.state,
            CaptureState::Resolved {
                width: 320,
                height: 200
            }
        );
    }

    #[tokio::test]
    async fn empty_series_fails_with_chart_id() {
        let spec = ChartSpec {
            id: ChartId::NetWorth,
            kind: ChartKind::Comparison(Vec::new()),
        };
        let request = CaptureRequest::new(&spec, 100, 100);
        let (result, record) =
            capture_with_timeout(&OffscreenCharts, &request, Duration::from_secs(5)).await;
        assert_eq!(result, Err(CaptureError::EmptySeries(ChartId::NetWorth)));
        assert!(!record.is_resolved());
    }

    #[tokio::test]
    async fn hanging_source_times_out() {
        let request = CaptureRequest::new(&bars(), 100, 100);
        let timeout = Duration::from_millis(20);
        let (result, record) = capture_with_timeout(&Never, &request, timeout).await;
        assert_eq!(result, Err(CaptureError::TimedOut(timeout)));
        assert_eq!(
            record.state,
            CaptureState::Failed(CaptureError::TimedOut(timeout))
        );
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let column = Size::new(Pt::from_f32(481.89), Pt::from_f32(700.0));
        let fitted = fit_image(1200, 800, column);
        assert_eq!(fitted.width, column.width);
        assert_eq!(
            fitted.height.to_milli_i64(),
            column.width.mul_ratio(2, 3).to_milli_i64()
        );

        let short = Size::new(Pt::from_i32(400), Pt::from_i32(100));
        let fitted = fit_image(1200, 800, short);
        assert_eq!(fitted.height, Pt::from_i32(100));
        assert_eq!(fitted.width.to_milli_i64(), 150_000);

        for (w, h) in [(1200u32, 800u32), (640, 480), (1000, 333), (333, 1000)] {
            let fitted = fit_image(w, h, column);
            let lhs = fitted.width.to_milli_i64() as i128 * h as i128;
            let rhs = fitted.height.to_milli_i64() as i128 * w as i128;
            // One milli-point of rounding on either side.
            assert!((lhs - rhs).abs() <= (w.max(h) as i128));
            assert!(fitted.width <= column.width && fitted.height <= column.height);
        }
    }
}
