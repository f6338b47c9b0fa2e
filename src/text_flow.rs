use crate::cursor::LayoutCursor;
use crate::font::{BULLET, FontFace, sanitize_text, width_to_units};
use crate::types::{Color, Pt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: Pt,
    pub line_height: Pt,
    pub color: Color,
}

impl TextStyle {
    pub fn new(face: FontFace, size: Pt, line_height: Pt) -> Self {
        Self {
            face,
            size,
            line_height,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn measure(&self, text: &str) -> Pt {
        self.face.measure_text_width(self.size, text)
    }
}

/// One positioned line of text. `x`/`baseline` are page-local, measured from
/// the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawLine {
    pub page_index: usize,
    pub x: Pt,
    pub baseline: Pt,
    pub text: String,
    pub style: TextStyle,
}

/// Horizontal column the renderer writes into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: Pt,
    pub width: Pt,
}

impl Column {
    pub fn new(x: Pt, width: Pt) -> Self {
        Self { x, width }
    }
}

const LIST_MARKER: &str = "\u{2022}  ";
const ELLIPSIS: &str = "...";

/// Wraps prose into the column and reserves one line box per wrapped line.
pub fn render_block(
    cursor: &mut LayoutCursor,
    text: &str,
    style: &TextStyle,
    column: Column,
) -> Vec<DrawLine> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    wrap_lines(text, style.face, style.size, column.width)
        .into_iter()
        .map(|line| place_line(cursor, line, column.x, style))
        .collect()
}

/// Bulleted list. The marker goes on the first wrapped line of each item;
/// continuation lines start at the item's text column.
pub fn render_list(
    cursor: &mut LayoutCursor,
    items: &[String],
    style: &TextStyle,
    column: Column,
) -> Vec<DrawLine> {
    let indent = style.measure(LIST_MARKER);
    let text_width = (column.width - indent).max(Pt::from_i32(1));
    let mut out = Vec::new();
    for item in items {
        if item.trim().is_empty() {
            continue;
        }
        let lines = wrap_lines(item, style.face, style.size, text_width);
        for (idx, line) in lines.into_iter().enumerate() {
            if idx == 0 {
                let mut marked = String::with_capacity(LIST_MARKER.len() + line.len());
                marked.push_str(LIST_MARKER);
                marked.push_str(&line);
                out.push(place_line(cursor, marked, column.x, style));
            } else {
                out.push(place_line(cursor, line, column.x + indent, style));
            }
        }
    }
    out
}

/// A single `label: value` row, truncated instead of wrapped.
pub fn render_key_value(
    cursor: &mut LayoutCursor,
    label: &str,
    value: &str,
    style: &TextStyle,
    column: Column,
) -> DrawLine {
    let row = sanitize_text(&format!("{label}: {value}"));
    let row = truncate_with_ellipsis(&row, style.face, style.size, column.width);
    place_line(cursor, row, column.x, style)
}

fn place_line(cursor: &mut LayoutCursor, text: String, x: Pt, style: &TextStyle) -> DrawLine {
    let placed = cursor.reserve(style.line_height);
    DrawLine {
        page_index: placed.page_index,
        x,
        baseline: placed.y + style.face.baseline_offset(style.size, style.line_height),
        text,
        style: *style,
    }
}

/// Greedy word wrap in font units, so a line's width is exactly the sum of
/// its words and spaces. Hard line breaks are kept; blank lines survive.
pub fn wrap_lines(text: &str, face: FontFace, size: Pt, max_width: Pt) -> Vec<String> {
    let max_units = width_to_units(max_width.max(Pt::from_i32(1)), size).max(1);
    let space_units = face.measure_units(" ");
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        let segment = sanitize_text(segment.trim_end_matches('\r'));
        if segment.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_units = 0u32;
        for word in segment.split_whitespace() {
            let word_units = face.measure_units(word);
            if !current.is_empty() && current_units + space_units + word_units <= max_units {
                current.push(' ');
                current.push_str(word);
                current_units += space_units + word_units;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_units = 0;
            }
            if word_units > max_units {
                let mut parts = split_long_word(word, face, max_units);
                // The tail of a broken word keeps collecting the next words.
                if let Some(last) = parts.pop() {
                    lines.extend(parts);
                    current_units = face.measure_units(&last);
                    current = last;
                }
            } else {
                current.push_str(word);
                current_units = word_units;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    // Leading/trailing blank lines only add height.
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines
}

fn split_long_word(word: &str, face: FontFace, max_units: u32) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_units = 0u32;
    for ch in word.chars() {
        let w = face.char_units(ch) as u32;
        if !current.is_empty() && current_units + w > max_units {
            parts.push(std::mem::take(&mut current));
            current_units = 0;
        }
        current.push(ch);
        current_units += w;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

pub fn truncate_with_ellipsis(text: &str, face: FontFace, size: Pt, max_width: Pt) -> String {
    let max_units = width_to_units(max_width, size);
    if face.measure_units(text) <= max_units {
        return text.to_string();
    }
    let ellipsis_units = face.measure_units(ELLIPSIS);
    if ellipsis_units >= max_units {
        return ELLIPSIS.to_string();
    }
    let budget = max_units - ellipsis_units;
    let mut used = 0u32;
    let mut out = String::new();
    for ch in text.chars() {
        let w = face.char_units(ch) as u32;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Margins;

    fn body() -> TextStyle {
        TextStyle::new(FontFace::Helvetica, Pt::from_i32(12), Pt::from_f32(14.4))
    }

    #[test]
    fn wrap_fits_every_line_in_column() {
        let text = "The applicant shows a stable employment history with consistent \
                    income growth over the last five years and a moderate debt load.";
        let width = Pt::from_i32(150);
        let lines = wrap_lines(text, FontFace::Helvetica, Pt::from_i32(12), width);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(FontFace::Helvetica.measure_text_width(Pt::from_i32(12), line) <= width);
        }
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn long_word_is_broken_by_character() {
        let word = "x".repeat(80);
        let lines = wrap_lines(&word, FontFace::Helvetica, Pt::from_i32(10), Pt::from_i32(50));
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn hard_breaks_are_preserved() {
        let lines = wrap_lines(
            "first\n\nthird",
            FontFace::Helvetica,
            Pt::from_i32(12),
            Pt::from_i32(400),
        );
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn list_marks_only_first_wrapped_line() {
        let mut cursor = LayoutCursor::new(Pt::from_i32(800), Margins::all(20.0));
        let items = vec![
            "short".to_string(),
            "a much longer item that certainly needs more than one line here".to_string(),
        ];
        let column = Column::new(Pt::from_i32(20), Pt::from_i32(160));
        let lines = render_list(&mut cursor, &items, &body(), column);
        assert!(lines.len() >= 3);
        let marked = lines.iter().filter(|l| l.text.starts_with(BULLET)).count();
        assert_eq!(marked, 2);
        assert!(lines[1].text.starts_with(BULLET));
        assert!(lines[2].x > column.x);
        for pair in lines.windows(2) {
            assert!(pair[1].baseline > pair[0].baseline);
        }
    }

    #[test]
    fn key_value_row_never_wraps() {
        let mut cursor = LayoutCursor::new(Pt::from_i32(800), Margins::all(20.0));
        let style = body();
        let column = Column::new(Pt::from_i32(20), Pt::from_i32(120));
        let before = cursor.vertical_offset();
        let row = render_key_value(
            &mut cursor,
            "Approval Recommendation",
            "Approve with conditions pending employment verification",
            &style,
            column,
        );
        assert!(row.text.ends_with("..."));
        assert!(style.measure(&row.text) <= column.width);
        assert_eq!(cursor.vertical_offset() - before, style.line_height);

        let short = render_key_value(&mut cursor, "Risk Score", "72", &style, column);
        assert_eq!(short.text, "Risk Score: 72");
    }
}
