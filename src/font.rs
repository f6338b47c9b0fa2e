use crate::types::Pt;

// Advance widths (1/1000 em) for WinAnsi codes 32..=126, from the Adobe AFM files
// for the base-14 fonts the PDF writer references. Measuring with these keeps
// wrapped lines identical to what a viewer will draw.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

// WinAnsi 0x95.
pub const BULLET: char = '\u{2022}';
const BULLET_WIDTH: u16 = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    pub fn base_font_name(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontFace::Helvetica => "F1",
            FontFace::HelveticaBold => "F2",
        }
    }

    pub(crate) fn all() -> [FontFace; 2] {
        [FontFace::Helvetica, FontFace::HelveticaBold]
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontFace::Helvetica => &HELVETICA_WIDTHS,
            FontFace::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    // Both faces share the same vertical metrics.
    pub fn ascent(self) -> i16 {
        718
    }

    pub fn descent(self) -> i16 {
        -207
    }

    pub fn char_units(self, ch: char) -> u16 {
        let code = ch as u32;
        if ch == BULLET {
            return BULLET_WIDTH;
        }
        if (32..=126).contains(&code) {
            return self.widths()[(code - 32) as usize];
        }
        // Anything else is drawn as '?' by `sanitize_text`.
        self.widths()[('?' as u32 - 32) as usize]
    }

    pub fn measure_units(self, text: &str) -> u32 {
        text.chars().map(|ch| self.char_units(ch) as u32).sum()
    }

    pub fn measure_text_width(self, font_size: Pt, text: &str) -> Pt {
        units_to_width(self.measure_units(text), font_size)
    }

    // Baseline offset below the top of a line box of `line_height`.
    pub fn baseline_offset(self, font_size: Pt, line_height: Pt) -> Pt {
        let em_box = units_to_width((self.ascent() as i32 - self.descent() as i32) as u32, font_size);
        let leading = (line_height - em_box).max(Pt::ZERO);
        leading / 2 + units_to_width(self.ascent() as u32, font_size)
    }
}

pub fn units_to_width(units: u32, font_size: Pt) -> Pt {
    let units = units.min(i32::MAX as u32) as i32;
    font_size.mul_ratio(units, 1000)
}

pub fn width_to_units(width: Pt, font_size: Pt) -> u32 {
    let size_milli = font_size.to_milli_i64();
    if size_milli <= 0 {
        return 0;
    }
    let width_milli = width.to_milli_i64().max(0) as i128;
    (width_milli * 1000 / size_milli as i128).min(u32::MAX as i128) as u32
}

// Maps text onto the glyphs the base-14 WinAnsi fonts can draw. Measuring and
// encoding both go through this so widths always match the drawn string.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            ' '..='~' | BULLET => out.push(ch),
            '\t' | '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => {
                out.push('-')
            }
            '\u{2026}' => out.push_str("..."),
            '\u{2264}' => out.push_str("<="),
            '\u{2265}' => out.push_str(">="),
            '\n' | '\r' => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

pub(crate) fn encode_winansi(text: &str) -> Vec<u8> {
    sanitize_text(text)
        .chars()
        .map(|ch| if ch == BULLET { 0x95 } else { ch as u8 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_with_afm_widths() {
        let size = Pt::from_f32(10.0);
        // H=722 e=556 l=222 l=222 o=556
        assert_eq!(FontFace::Helvetica.measure_units("Hello"), 2278);
        assert_eq!(
            FontFace::Helvetica.measure_text_width(size, "Hello").to_milli_i64(),
            22_780
        );
        assert!(
            FontFace::HelveticaBold.measure_units("Hello")
                > FontFace::Helvetica.measure_units("Hello")
        );
    }

    #[test]
    fn width_is_additive_over_words() {
        let face = FontFace::Helvetica;
        let joined = face.measure_units("low DTI ratio");
        let parts =
            face.measure_units("low") + face.measure_units(" ") + face.measure_units("DTI ratio");
        assert_eq!(joined, parts);
    }

    #[test]
    fn sanitize_replaces_unsupported_glyphs() {
        assert_eq!(sanitize_text("caf\u{00E9} \u{2014} \u{201C}ok\u{201D}"), "caf? - \"ok\"");
        assert_eq!(encode_winansi("\u{2022} a"), vec![0x95, b' ', b'a']);
    }

    #[test]
    fn units_round_trip_through_width() {
        let size = Pt::from_f32(12.0);
        let width = units_to_width(5000, size);
        assert_eq!(width.to_milli_i64(), 60_000);
        assert_eq!(width_to_units(width, size), 5000);
    }
}
