//! Static font-metric tables for the PDF standard 14 Helvetica family.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em, so a string's width in
//! points is `sum(widths) * size / 1000`. These are exact for the built-in
//! viewer fonts; no font embedding is needed.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.
//! The handful of WinAnsi extras the content uses (bullets, dashes, curly quotes)
//! are looked up separately; anything else falls back to `average_char_width`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

/// Standard 14 faces available without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 4] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
    ];

    /// PostScript name used as the PDF `BaseFont`.
    pub fn pdf_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Resource name inside the page `/Font` dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
            StandardFont::HelveticaOblique => "F3",
            StandardFont::HelveticaBoldOblique => "F4",
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique
        )
    }

    pub fn is_italic(self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaOblique | StandardFont::HelveticaBoldOblique
        )
    }
}

impl FromStr for StandardFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.pdf_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unsupported font '{s}' (expected one of: {})",
                    Self::ALL.map(|f| f.pdf_name()).join(", ")
                )
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [u16; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: u16,
    pub space_width: u16,
    /// Ascender above the baseline, 1/1000 em.
    pub ascent: u16,
    /// Descender below the baseline, 1/1000 em (positive).
    pub descent: u16,
    bold: bool,
}

impl FontMetricTable {
    /// Advance width of one character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' => 1000,
            '\u{2018}' | '\u{2019}' => {
                if self.bold {
                    278
                } else {
                    222
                }
            }
            '\u{201C}' | '\u{201D}' => {
                if self.bold {
                    500
                } else {
                    333
                }
            }
            '\u{00A0}' => self.space_width,
            _ => self.average_char_width,
        }
    }

    /// Rendered width of `s` in points at `size` points.
    pub fn measure_str(&self, s: &str, size: f32) -> f32 {
        let units: u32 = s.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }

    pub fn space_width_pt(&self, size: f32) -> f32 {
        self.space_width as f32 * size / 1000.0
    }

    pub fn ascent_pt(&self, size: f32) -> f32 {
        self.ascent as f32 * size / 1000.0
    }

    pub fn descent_pt(&self, size: f32) -> f32 {
        self.descent as f32 * size / 1000.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica (also used for Helvetica-Oblique, which shares its advances).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
    space_width: 278,
    ascent: 718,
    descent: 207,
    bold: false,
};

/// Helvetica-Bold (also used for Helvetica-BoldOblique).
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    average_char_width: 611,
    space_width: 278,
    ascent: 718,
    descent: 207,
    bold: true,
};

/// Returns the static metric table for a face.
pub fn get_metrics(font: StandardFont) -> &'static FontMetricTable {
    if font.is_bold() {
        &HELVETICA_BOLD_TABLE
    } else {
        &HELVETICA_TABLE
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(StandardFont::Helvetica);
        assert_eq!(metrics.measure_str("", 10.0), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(StandardFont::Helvetica);
        // "Rust" = R(722) + u(556) + s(500) + t(278) = 2056 units
        let width = metrics.measure_str("Rust", 10.0);
        assert!(
            (width - 20.56).abs() < 1e-3,
            "Rust width at 10pt should be 20.56, got {width}"
        );
    }

    #[test]
    fn test_bold_is_wider() {
        let text = "Architected distributed caching layer";
        let regular = get_metrics(StandardFont::Helvetica).measure_str(text, 10.0);
        let bold = get_metrics(StandardFont::HelveticaBold).measure_str(text, 10.0);
        assert!(bold > regular, "bold {bold} should exceed regular {regular}");
    }

    #[test]
    fn test_oblique_shares_regular_widths() {
        let text = "Kubernetes operators";
        assert_eq!(
            get_metrics(StandardFont::HelveticaOblique).measure_str(text, 9.0),
            get_metrics(StandardFont::Helvetica).measure_str(text, 9.0)
        );
    }

    #[test]
    fn test_special_glyph_widths() {
        let metrics = get_metrics(StandardFont::Helvetica);
        assert_eq!(metrics.char_width('•'), 350);
        assert_eq!(metrics.char_width('–'), 556);
        assert_eq!(metrics.char_width('—'), 1000);
        assert_eq!(metrics.char_width('é'), metrics.average_char_width);
    }

    #[test]
    fn test_font_name_parsing() {
        assert_eq!(
            "helvetica-bold".parse::<StandardFont>().unwrap(),
            StandardFont::HelveticaBold
        );
        let err = "Comic Sans".parse::<StandardFont>().unwrap_err();
        assert!(err.contains("Helvetica-Oblique"));
    }

    #[test]
    fn test_resource_names_unique() {
        let mut names: Vec<&str> = StandardFont::ALL.iter().map(|f| f.resource_name()).collect();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
