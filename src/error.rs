use crate::chart::ChartId;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ReportError {
    GenerationInProgress,
    InvalidConfiguration(String),
    Pdf(String),
    Image(String),
    Io(std::io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::GenerationInProgress => {
                write!(f, "a report generation is already in progress")
            }
            ReportError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            ReportError::Pdf(message) => write!(f, "pdf write error: {}", message),
            ReportError::Image(message) => write!(f, "image encode error: {}", message),
            ReportError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(value: std::io::Error) -> Self {
        ReportError::Io(value)
    }
}

// Recoverable per-chart failure. The composer logs it and skips the chart page.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    RegionNotFound(ChartId),
    EmptySeries(ChartId),
    Render(String),
    TimedOut(Duration),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::RegionNotFound(chart) => {
                write!(f, "chart region not found: {}", chart.region_id())
            }
            CaptureError::EmptySeries(chart) => {
                write!(f, "chart has no plottable values: {}", chart.region_id())
            }
            CaptureError::Render(message) => write!(f, "chart render failed: {}", message),
            CaptureError::TimedOut(after) => {
                write!(f, "chart capture timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for CaptureError {}
