//! Document-wide styling, page geometry and header/footer configuration

use serde::{Deserialize, Serialize};

/// Fonts, sizes and heading appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStyling {
    /// Body font family
    pub default_font: String,
    /// Body font size in points
    pub default_font_size: f64,
    /// Heading font family
    pub heading_font: String,
    /// Heading 1 size in points
    pub heading_1_size: f64,
    /// Heading 2 size in points
    pub heading_2_size: f64,
    /// Heading 3 size in points
    pub heading_3_size: f64,
    /// Heading 4 size in points
    pub heading_4_size: f64,
    /// Line spacing multiplier
    pub line_spacing: f64,
    pub heading_1_bold: bool,
    pub heading_2_bold: bool,
    pub heading_3_bold: bool,
    pub heading_4_bold: bool,
    /// Hex colors (e.g. "1F3864")
    pub heading_1_color: Option<String>,
    pub heading_2_color: Option<String>,
    pub heading_3_color: Option<String>,
    pub heading_4_color: Option<String>,
}

impl Default for DocumentStyling {
    fn default() -> Self {
        Self {
            default_font: "Arial".to_string(),
            default_font_size: 11.0,
            heading_font: "Arial".to_string(),
            heading_1_size: 16.0,
            heading_2_size: 14.0,
            heading_3_size: 12.0,
            heading_4_size: 11.0,
            line_spacing: 1.15,
            heading_1_bold: true,
            heading_2_bold: true,
            heading_3_bold: true,
            heading_4_bold: false,
            heading_1_color: None,
            heading_2_color: None,
            heading_3_color: None,
            heading_4_color: None,
        }
    }
}

impl DocumentStyling {
    /// Size, bold flag and color for a heading level (clamped to 1-4)
    pub fn heading(&self, level: u8) -> (f64, bool, Option<&str>) {
        match level.clamp(1, 4) {
            1 => (
                self.heading_1_size,
                self.heading_1_bold,
                self.heading_1_color.as_deref(),
            ),
            2 => (
                self.heading_2_size,
                self.heading_2_bold,
                self.heading_2_color.as_deref(),
            ),
            3 => (
                self.heading_3_size,
                self.heading_3_bold,
                self.heading_3_color.as_deref(),
            ),
            _ => (
                self.heading_4_size,
                self.heading_4_bold,
                self.heading_4_color.as_deref(),
            ),
        }
    }
}

/// Page dimensions and margins, in inches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::letter()
    }
}

impl PageSetup {
    /// US Letter with one-inch margins
    pub fn letter() -> Self {
        Self {
            page_width: 8.5,
            page_height: 11.0,
            margin_top: 1.0,
            margin_bottom: 1.0,
            margin_left: 1.0,
            margin_right: 1.0,
        }
    }

    /// ISO A4 with one-inch margins
    pub fn a4() -> Self {
        Self {
            page_width: 8.27,
            page_height: 11.69,
            ..Self::letter()
        }
    }

    /// Width available to body content, in inches
    pub fn content_width(&self) -> f64 {
        (self.page_width - self.margin_left - self.margin_right).max(0.0)
    }

    /// True when the page is wider than it is tall
    pub fn is_landscape(&self) -> bool {
        self.page_width > self.page_height
    }
}

/// Where page numbers are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNumberPosition {
    #[default]
    FooterRight,
    FooterCenter,
    HeaderRight,
}

impl PageNumberPosition {
    /// True when page numbers go in the footer
    pub fn in_footer(&self) -> bool {
        !matches!(self, PageNumberPosition::HeaderRight)
    }
}

/// Header, footer and page numbering policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFooter {
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub show_page_numbers: bool,
    pub page_number_position: PageNumberPosition,
    /// Render "Page X of Y" instead of "Page X"
    pub include_total_pages: bool,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            header_text: None,
            footer_text: None,
            show_page_numbers: true,
            page_number_position: PageNumberPosition::FooterRight,
            include_total_pages: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styling_defaults() {
        let styling = DocumentStyling::default();
        assert_eq!(styling.heading(1), (16.0, true, None));
        assert_eq!(styling.heading(4), (11.0, false, None));
    }

    #[test]
    fn test_heading_level_clamped() {
        let styling = DocumentStyling::default();
        assert_eq!(styling.heading(0), styling.heading(1));
        assert_eq!(styling.heading(9), styling.heading(4));
    }

    #[test]
    fn test_page_presets() {
        let a4 = PageSetup::a4();
        assert_eq!(a4.page_width, 8.27);
        assert_eq!(a4.margin_left, 1.0);
        assert!((PageSetup::letter().content_width() - 6.5).abs() < f64::EPSILON);
        assert!(!a4.is_landscape());
    }

    #[test]
    fn test_page_number_position_serde() {
        let hf: HeaderFooter =
            serde_json::from_str(r#"{"page_number_position":"header_right"}"#).unwrap();
        assert_eq!(hf.page_number_position, PageNumberPosition::HeaderRight);
        assert!(!hf.page_number_position.in_footer());
        assert!(hf.show_page_numbers);
    }
}
