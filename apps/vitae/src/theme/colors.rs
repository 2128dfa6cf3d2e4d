//! Semantic color roles and the resolved color table.

use std::fmt;

use serde::{Serialize, Serializer};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to 0.0..=1.0, the form PDF color operators take.
    pub fn unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// `RRGGBB` without the leading hash (DOCX `w:color`).
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Semantic color slots every theme fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorRole {
    Name,
    Title,
    SectionHeader,
    JobTitle,
    Company,
    Accent,
    CompetencyHeader,
    Subtitle,
    Link,
    DarkText,
    MediumText,
    LightText,
}

impl ColorRole {
    pub const ALL: [ColorRole; 12] = [
        ColorRole::Name,
        ColorRole::Title,
        ColorRole::SectionHeader,
        ColorRole::JobTitle,
        ColorRole::Company,
        ColorRole::Accent,
        ColorRole::CompetencyHeader,
        ColorRole::Subtitle,
        ColorRole::Link,
        ColorRole::DarkText,
        ColorRole::MediumText,
        ColorRole::LightText,
    ];

    /// Key prefix used in scheme files: `NAME` for `NAME_COLOR`.
    pub fn file_key(self) -> &'static str {
        match self {
            ColorRole::Name => "NAME",
            ColorRole::Title => "TITLE",
            ColorRole::SectionHeader => "SECTION_HEADER",
            ColorRole::JobTitle => "JOB_TITLE",
            ColorRole::Company => "COMPANY",
            ColorRole::Accent => "ACCENT",
            ColorRole::CompetencyHeader => "COMPETENCY_HEADER",
            ColorRole::Subtitle => "SUBTITLE",
            ColorRole::Link => "LINK",
            ColorRole::DarkText => "DARK_TEXT",
            ColorRole::MediumText => "MEDIUM_TEXT",
            ColorRole::LightText => "LIGHT_TEXT",
        }
    }

    pub fn from_file_key(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.file_key() == prefix)
    }

    /// Fallback used when a scheme omits this role.
    pub fn default_color(self) -> Rgb {
        match self {
            ColorRole::Name => Rgb::new(0x1F, 0x3A, 0x5F),
            ColorRole::Title => Rgb::new(0x4A, 0x4A, 0x4A),
            ColorRole::SectionHeader => Rgb::new(0x1F, 0x3A, 0x5F),
            ColorRole::JobTitle => Rgb::new(0x2B, 0x2B, 0x2B),
            ColorRole::Company => Rgb::new(0x1F, 0x3A, 0x5F),
            ColorRole::Accent => Rgb::new(0x2E, 0x75, 0xB6),
            ColorRole::CompetencyHeader => Rgb::new(0x1F, 0x3A, 0x5F),
            ColorRole::Subtitle => Rgb::new(0x59, 0x59, 0x59),
            ColorRole::Link => Rgb::new(0x2E, 0x75, 0xB6),
            ColorRole::DarkText => Rgb::new(0x22, 0x22, 0x22),
            ColorRole::MediumText => Rgb::new(0x55, 0x55, 0x55),
            ColorRole::LightText => Rgb::new(0x88, 0x88, 0x88),
        }
    }
}

/// Fully resolved color table. Field order fixes the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorTable {
    pub name: Rgb,
    pub title: Rgb,
    pub section_header: Rgb,
    pub job_title: Rgb,
    pub company: Rgb,
    pub accent: Rgb,
    pub competency_header: Rgb,
    pub subtitle: Rgb,
    pub link: Rgb,
    pub dark_text: Rgb,
    pub medium_text: Rgb,
    pub light_text: Rgb,
}

impl ColorTable {
    /// Builds a table from `lookup`, falling back to role defaults.
    pub fn build(lookup: impl Fn(ColorRole) -> Option<Rgb>) -> Self {
        let pick = |role: ColorRole| lookup(role).unwrap_or_else(|| role.default_color());
        Self {
            name: pick(ColorRole::Name),
            title: pick(ColorRole::Title),
            section_header: pick(ColorRole::SectionHeader),
            job_title: pick(ColorRole::JobTitle),
            company: pick(ColorRole::Company),
            accent: pick(ColorRole::Accent),
            competency_header: pick(ColorRole::CompetencyHeader),
            subtitle: pick(ColorRole::Subtitle),
            link: pick(ColorRole::Link),
            dark_text: pick(ColorRole::DarkText),
            medium_text: pick(ColorRole::MediumText),
            light_text: pick(ColorRole::LightText),
        }
    }

    pub fn get(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Name => self.name,
            ColorRole::Title => self.title,
            ColorRole::SectionHeader => self.section_header,
            ColorRole::JobTitle => self.job_title,
            ColorRole::Company => self.company,
            ColorRole::Accent => self.accent,
            ColorRole::CompetencyHeader => self.competency_header,
            ColorRole::Subtitle => self.subtitle,
            ColorRole::Link => self.link,
            ColorRole::DarkText => self.dark_text,
            ColorRole::MediumText => self.medium_text,
            ColorRole::LightText => self.light_text,
        }
    }

    /// ATS rendering: keep the name color, collapse the rest onto dark and medium text.
    pub fn flattened(&self) -> Self {
        let dark = self.dark_text;
        let medium = self.medium_text;
        Self {
            name: self.name,
            title: medium,
            section_header: dark,
            job_title: dark,
            company: dark,
            accent: medium,
            competency_header: dark,
            subtitle: medium,
            link: dark,
            dark_text: dark,
            medium_text: medium,
            light_text: medium,
        }
    }
}
