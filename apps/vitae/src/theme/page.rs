//! Page geometry and fixed layout constants, in PDF points (1/72 inch).

use serde::Serialize;

use crate::theme::spacing::SpacingLevel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConstants {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Distance from the page top to the first header baseline's text top.
    pub margin_top: f32,
    /// Distance from the page bottom to the footer rule.
    pub margin_bottom: f32,
    pub header_rule_thickness: f32,
    pub footer_rule_thickness: f32,
    pub section_rule_thickness: f32,
    /// Left indent of bullet text; the bullet glyph sits in this gutter.
    pub bullet_indent: f32,
    /// Footer text baseline below the footer rule.
    pub footer_text_offset: f32,
    /// Gap between the header rule and the first content line.
    pub header_to_content: SpacingLevel,
}

impl LayoutConstants {
    /// US letter with 0.6 inch side margins.
    pub fn letter() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin_left: 43.2,
            margin_right: 43.2,
            margin_top: 36.0,
            margin_bottom: 40.0,
            header_rule_thickness: 0.75,
            footer_rule_thickness: 0.5,
            section_rule_thickness: 0.5,
            bullet_indent: 12.0,
            footer_text_offset: 12.0,
            header_to_content: SpacingLevel::Medium,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn right_edge(&self) -> f32 {
        self.page_width - self.margin_right
    }
}
