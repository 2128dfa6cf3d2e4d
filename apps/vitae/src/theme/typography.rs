//! Type scale: faces plus one integer point size per typographic role.

use serde::Serialize;

use crate::layout::font_metrics::StandardFont;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRole {
    Name,
    Title,
    SectionHeader,
    Company,
    JobTitle,
    MainCompetency,
    SubCompetency,
    Body,
    Bullet,
    CompetencyDetail,
    Footer,
}

impl TypeRole {
    pub const ALL: [TypeRole; 11] = [
        TypeRole::Name,
        TypeRole::Title,
        TypeRole::SectionHeader,
        TypeRole::Company,
        TypeRole::JobTitle,
        TypeRole::MainCompetency,
        TypeRole::SubCompetency,
        TypeRole::Body,
        TypeRole::Bullet,
        TypeRole::CompetencyDetail,
        TypeRole::Footer,
    ];

    /// Scheme-file prefix: `NAME` for `NAME_FONT_SIZE`.
    pub fn file_key(self) -> &'static str {
        match self {
            TypeRole::Name => "NAME",
            TypeRole::Title => "TITLE",
            TypeRole::SectionHeader => "SECTION_HEADER",
            TypeRole::Company => "COMPANY",
            TypeRole::JobTitle => "JOB_TITLE",
            TypeRole::MainCompetency => "MAIN_COMPETENCY",
            TypeRole::SubCompetency => "SUB_COMPETENCY",
            TypeRole::Body => "BODY",
            TypeRole::Bullet => "BULLET",
            TypeRole::CompetencyDetail => "COMPETENCY_DETAIL",
            TypeRole::Footer => "FOOTER",
        }
    }

    pub fn from_file_key(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.file_key() == prefix)
    }
}

/// Point sizes per role. Integers keep the scale exact across formats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSizes {
    pub name: u8,
    pub title: u8,
    pub section_header: u8,
    pub company: u8,
    pub job_title: u8,
    pub main_competency: u8,
    pub sub_competency: u8,
    pub body: u8,
    pub bullet: u8,
    pub competency_detail: u8,
    pub footer: u8,
}

impl TypeSizes {
    pub fn classic() -> Self {
        Self {
            name: 22,
            title: 11,
            section_header: 12,
            company: 10,
            job_title: 10,
            main_competency: 10,
            sub_competency: 9,
            body: 10,
            bullet: 9,
            competency_detail: 9,
            footer: 8,
        }
    }

    pub fn compact() -> Self {
        Self {
            name: 20,
            title: 10,
            section_header: 11,
            company: 9,
            job_title: 9,
            main_competency: 9,
            sub_competency: 8,
            body: 9,
            bullet: 8,
            competency_detail: 8,
            footer: 7,
        }
    }

    pub fn get(&self, role: TypeRole) -> u8 {
        match role {
            TypeRole::Name => self.name,
            TypeRole::Title => self.title,
            TypeRole::SectionHeader => self.section_header,
            TypeRole::Company => self.company,
            TypeRole::JobTitle => self.job_title,
            TypeRole::MainCompetency => self.main_competency,
            TypeRole::SubCompetency => self.sub_competency,
            TypeRole::Body => self.body,
            TypeRole::Bullet => self.bullet,
            TypeRole::CompetencyDetail => self.competency_detail,
            TypeRole::Footer => self.footer,
        }
    }

    pub fn set(&mut self, role: TypeRole, size: u8) {
        let slot = match role {
            TypeRole::Name => &mut self.name,
            TypeRole::Title => &mut self.title,
            TypeRole::SectionHeader => &mut self.section_header,
            TypeRole::Company => &mut self.company,
            TypeRole::JobTitle => &mut self.job_title,
            TypeRole::MainCompetency => &mut self.main_competency,
            TypeRole::SubCompetency => &mut self.sub_competency,
            TypeRole::Body => &mut self.body,
            TypeRole::Bullet => &mut self.bullet,
            TypeRole::CompetencyDetail => &mut self.competency_detail,
            TypeRole::Footer => &mut self.footer,
        };
        *slot = size;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typography {
    pub base_font: StandardFont,
    pub bold_font: StandardFont,
    pub italic_font: StandardFont,
    pub sizes: TypeSizes,
    /// Line height as a multiple of the point size.
    pub leading: f32,
}

impl Typography {
    pub fn size(&self, role: TypeRole) -> f32 {
        self.sizes.get(role) as f32
    }

    /// Baseline-to-baseline distance for a role.
    pub fn line_height(&self, role: TypeRole) -> f32 {
        self.size(role) * self.leading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_sizes() {
        let sizes = TypeSizes::classic();
        assert_eq!(sizes.get(TypeRole::Name), 22);
        assert_eq!(sizes.get(TypeRole::Footer), 8);
    }

    #[test]
    fn test_compact_never_larger_than_classic() {
        let classic = TypeSizes::classic();
        let compact = TypeSizes::compact();
        for role in TypeRole::ALL {
            assert!(
                compact.get(role) <= classic.get(role),
                "{role:?} grew in compact"
            );
        }
    }

    #[test]
    fn test_set_overrides_one_role() {
        let mut sizes = TypeSizes::classic();
        sizes.set(TypeRole::Body, 11);
        assert_eq!(sizes.body, 11);
        assert_eq!(sizes.bullet, 9);
    }

    #[test]
    fn test_file_key_roundtrip() {
        for role in TypeRole::ALL {
            assert_eq!(TypeRole::from_file_key(role.file_key()), Some(role));
        }
    }

    #[test]
    fn test_line_height_uses_leading() {
        let t = Typography {
            base_font: StandardFont::Helvetica,
            bold_font: StandardFont::HelveticaBold,
            italic_font: StandardFont::HelveticaOblique,
            sizes: TypeSizes::classic(),
            leading: 1.2,
        };
        assert!((t.line_height(TypeRole::Body) - 12.0).abs() < 1e-4);
    }
}
