use crate::canvas::{Command, Document};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub command_count: usize,
    pub line_count: usize,
    pub image_count: usize,
    pub content_bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub layout_ms: f64,
    pub capture_ms: f64,
    pub write_ms: f64,
    pub charts_captured: usize,
    pub charts_skipped: usize,
    pub total_bytes: usize,
}

impl DocumentMetrics {
    pub(crate) fn count_pages(&mut self, document: &Document) {
        self.pages = document
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| PageMetrics {
                page_number: index + 1,
                command_count: page.commands.len(),
                line_count: page
                    .commands
                    .iter()
                    .filter(|cmd| matches!(cmd, Command::DrawString { .. }))
                    .count(),
                image_count: page
                    .commands
                    .iter()
                    .filter(|cmd| matches!(cmd, Command::DrawImage { .. }))
                    .count(),
                content_bytes: 0,
            })
            .collect();
    }

    pub(crate) fn record_content_sizes(&mut self, sizes: &[usize]) {
        for (page, size) in self.pages.iter_mut().zip(sizes) {
            page.content_bytes = *size;
        }
    }
}
