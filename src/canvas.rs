use crate::chart::ChartId;
use crate::font::FontFace;
use crate::raster::RasterImage;
use crate::text_flow::DrawLine;
use crate::types::{Color, Pt, Size};
use std::collections::BTreeMap;

/// Report sections, as tagged in the page command streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Header,
    CustomerSummary,
    Notice,
    Assessment,
    Strengths,
    Concerns,
    Recommendations,
    CreditRisk,
    RiskFactors,
    FinancialMetrics,
    LoanMetrics,
    PropertyAnalysis,
    EconomicFactors,
    Chart(ChartId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRole {
    Heading,
    Body,
}

// Coordinates are page-local from the top-left corner; `y` of a string is its
// baseline. The PDF writer flips them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetFont {
        face: FontFace,
        size: Pt,
    },
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: String,
    },
    // Non-rendered structure markers. Ignored by the PDF writer.
    BeginBlock {
        section: Section,
        role: BlockRole,
    },
    EndBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
    pub images: BTreeMap<String, RasterImage>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.pages.iter().any(|page| {
            page.commands.iter().any(|cmd| {
                matches!(cmd, Command::BeginBlock { section: s, .. } if *s == section)
            })
        })
    }

    /// Text drawn inside `section` blocks with `role`, in document order.
    pub fn lines(&self, section: Section, role: BlockRole) -> Vec<&str> {
        self.lines_with_pages(section, role)
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    pub fn lines_with_pages(&self, section: Section, role: BlockRole) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        for (index, page) in self.pages.iter().enumerate() {
            let mut inside = false;
            for cmd in &page.commands {
                match cmd {
                    Command::BeginBlock { section: s, role: r } => {
                        inside = *s == section && *r == role;
                    }
                    Command::EndBlock => inside = false,
                    Command::DrawString { text, .. } if inside => out.push((index, text.as_str())),
                    _ => {}
                }
            }
        }
        out
    }

    /// Pages that carry any block of `section`.
    pub fn pages_with(&self, section: Section) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| {
                page.commands.iter().any(|cmd| {
                    matches!(cmd, Command::BeginBlock { section: s, .. } if *s == section)
                })
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Sections in first-appearance order.
    pub fn section_order(&self) -> Vec<Section> {
        let mut out: Vec<Section> = Vec::new();
        for page in &self.pages {
            for cmd in &page.commands {
                if let Command::BeginBlock { section, .. } = cmd {
                    if !out.contains(section) {
                        out.push(*section);
                    }
                }
            }
        }
        out
    }

    pub fn image_placements(&self) -> Vec<(usize, Pt, Pt, &str)> {
        let mut out = Vec::new();
        for (index, page) in self.pages.iter().enumerate() {
            for cmd in &page.commands {
                if let Command::DrawImage {
                    width,
                    height,
                    resource_id,
                    ..
                } = cmd
                {
                    out.push((index, *width, *height, resource_id.as_str()));
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    font: Option<(FontFace, Pt)>,
}

impl GraphicsState {
    fn initial() -> Self {
        Self {
            fill_color: Color::BLACK,
            font: None,
        }
    }
}

pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    current_state: GraphicsState,
    open_block: Option<(Section, BlockRole)>,
    images: BTreeMap<String, RasterImage>,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::new(),
            current_state: GraphicsState::initial(),
            open_block: None,
            images: BTreeMap::new(),
        }
    }

    pub fn current_page_index(&self) -> usize {
        self.pages.len()
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_font(&mut self, face: FontFace, size: Pt) {
        if self.current_state.font == Some((face, size)) {
            return;
        }
        self.current_state.font = Some((face, size));
        self.current.commands.push(Command::SetFont { face, size });
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        self.current.commands.push(Command::DrawString {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn draw_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.current.commands.push(Command::DrawRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn draw_image(
        &mut self,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: impl Into<String>,
    ) {
        self.current.commands.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            resource_id: resource_id.into(),
        });
    }

    pub fn register_image(&mut self, resource_id: impl Into<String>, image: RasterImage) {
        self.images.insert(resource_id.into(), image);
    }

    /// Positions the canvas on `line`'s page and draws it.
    pub fn draw_line(&mut self, line: &DrawLine) {
        self.goto_page(line.page_index);
        self.set_font(line.style.face, line.style.size);
        self.set_fill_color(line.style.color);
        self.draw_string(line.x, line.baseline, line.text.clone());
    }

    pub fn begin_block(&mut self, section: Section, role: BlockRole) {
        if self.open_block.is_some() {
            self.end_block();
        }
        self.open_block = Some((section, role));
        self.current
            .commands
            .push(Command::BeginBlock { section, role });
    }

    pub fn end_block(&mut self) {
        if self.open_block.take().is_some() {
            self.current.commands.push(Command::EndBlock);
        }
    }

    /// Moves forward to page `index`, emitting any pages in between.
    pub fn goto_page(&mut self, index: usize) {
        while self.current_page_index() < index {
            self.show_page();
        }
    }

    pub fn show_page(&mut self) {
        // A block that spans pages is closed and reopened so each page's
        // stream stays balanced.
        let open = self.open_block;
        if open.is_some() {
            self.current.commands.push(Command::EndBlock);
        }
        let page = std::mem::replace(&mut self.current, Page::new());
        self.pages.push(page);
        self.current_state = GraphicsState::initial();
        if let Some((section, role)) = open {
            self.current
                .commands
                .push(Command::BeginBlock { section, role });
        }
    }

    pub fn finish(mut self) -> Document {
        self.end_block();
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_state_is_deduplicated_per_page() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(FontFace::Helvetica, Pt::from_i32(12));
        canvas.set_font(FontFace::Helvetica, Pt::from_i32(12));
        canvas.set_fill_color(Color::BLACK);
        canvas.draw_string(Pt::ZERO, Pt::from_i32(10), "a");
        canvas.show_page();
        canvas.set_font(FontFace::Helvetica, Pt::from_i32(12));
        canvas.draw_string(Pt::ZERO, Pt::from_i32(10), "b");
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].commands.len(), 2);
        assert!(matches!(doc.pages[1].commands[0], Command::SetFont { .. }));
    }

    #[test]
    fn blocks_spanning_pages_stay_balanced() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.begin_block(Section::Assessment, BlockRole::Body);
        canvas.draw_string(Pt::ZERO, Pt::from_i32(10), "one");
        canvas.goto_page(2);
        canvas.draw_string(Pt::ZERO, Pt::from_i32(10), "two");
        canvas.end_block();
        let doc = canvas.finish();
        assert_eq!(doc.page_count(), 3);
        for page in &doc.pages {
            let opens = page
                .commands
                .iter()
                .filter(|c| matches!(c, Command::BeginBlock { .. }))
                .count();
            let closes = page
                .commands
                .iter()
                .filter(|c| matches!(c, Command::EndBlock))
                .count();
            assert_eq!(opens, closes);
        }
        assert_eq!(
            doc.lines_with_pages(Section::Assessment, BlockRole::Body),
            vec![(0, "one"), (2, "two")]
        );
        assert_eq!(doc.pages_with(Section::Assessment), vec![0, 1, 2]);
    }

    #[test]
    fn empty_canvas_still_has_one_page() {
        let doc = Canvas::new(Size::letter()).finish();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.section_order().is_empty());
    }
}
