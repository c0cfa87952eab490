//! Page geometry and styling validator
//!
//! # Diagnostic Codes
//!
//! - `UIF201`: page width not positive
//! - `UIF202`: page height not positive
//! - `UIF203`: negative margin
//! - `UIF204`: margins leave no printable width (warning)
//! - `UIF210`: default font size not positive
//! - `UIF211`: line spacing not positive
//! - `UIF212`: heading size not positive

use trialdoc_uif::UniversalDocument;

use crate::diagnostics::Diagnostic;
use crate::Validator;

/// Validates page setup and styling magnitudes
pub struct LayoutValidator;

impl Validator for LayoutValidator {
    fn code(&self) -> &'static str {
        "UIF2"
    }

    fn name(&self) -> &'static str {
        "page-layout"
    }

    fn validate(&self, doc: &UniversalDocument) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let page = &doc.page_setup;

        if page.page_width <= 0.0 {
            diagnostics.push(
                Diagnostic::error("Page width must be positive")
                    .with_code("UIF201")
                    .with_path("page_setup.page_width"),
            );
        }
        if page.page_height <= 0.0 {
            diagnostics.push(
                Diagnostic::error("Page height must be positive")
                    .with_code("UIF202")
                    .with_path("page_setup.page_height"),
            );
        }

        let margins = [
            ("Top", "margin_top", page.margin_top),
            ("Bottom", "margin_bottom", page.margin_bottom),
            ("Left", "margin_left", page.margin_left),
            ("Right", "margin_right", page.margin_right),
        ];
        for (label, field, value) in margins {
            if value < 0.0 {
                diagnostics.push(
                    Diagnostic::error(format!("{} margin cannot be negative", label))
                        .with_code("UIF203")
                        .with_path(format!("page_setup.{}", field)),
                );
            }
        }

        if page.page_width > 0.0 && page.content_width() <= 0.0 {
            diagnostics.push(
                Diagnostic::warning("Left and right margins leave no printable width")
                    .with_code("UIF204")
                    .with_path("page_setup"),
            );
        }

        let styling = &doc.styling;
        if styling.default_font_size <= 0.0 {
            diagnostics.push(
                Diagnostic::error("Default font size must be positive")
                    .with_code("UIF210")
                    .with_path("styling.default_font_size"),
            );
        }
        if styling.line_spacing <= 0.0 {
            diagnostics.push(
                Diagnostic::error("Line spacing must be positive")
                    .with_code("UIF211")
                    .with_path("styling.line_spacing"),
            );
        }
        for level in 1..=4u8 {
            let (size, _, _) = styling.heading(level);
            if size <= 0.0 {
                diagnostics.push(
                    Diagnostic::error(format!("Heading {} size must be positive", level))
                        .with_code("UIF212")
                        .with_path(format!("styling.heading_{}_size", level)),
                );
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialdoc_uif::PageSetup;

    fn messages(doc: &UniversalDocument) -> Vec<String> {
        LayoutValidator
            .validate(doc)
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(LayoutValidator
            .validate(&UniversalDocument::new("icf", "T"))
            .is_empty());
    }

    #[test]
    fn test_a4_is_valid() {
        let mut doc = UniversalDocument::new("icf", "T");
        doc.page_setup = PageSetup::a4();
        assert!(LayoutValidator.validate(&doc).is_empty());
    }

    #[test]
    fn test_zero_page_size() {
        let mut doc = UniversalDocument::new("icf", "T");
        doc.page_setup.page_width = 0.0;
        doc.page_setup.page_height = -1.0;
        let msgs = messages(&doc);
        assert!(msgs.contains(&"Page width must be positive".to_string()));
        assert!(msgs.contains(&"Page height must be positive".to_string()));
    }

    #[test]
    fn test_negative_margins() {
        let mut doc = UniversalDocument::new("icf", "T");
        doc.page_setup.margin_top = -0.5;
        doc.page_setup.margin_right = -0.1;
        let diags = LayoutValidator.validate(&doc);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].render_message(), "page_setup.margin_top: Top margin cannot be negative");
        assert_eq!(diags[1].message, "Right margin cannot be negative");
    }

    #[test]
    fn test_margins_wider_than_page_warn() {
        let mut doc = UniversalDocument::new("icf", "T");
        doc.page_setup.margin_left = 5.0;
        doc.page_setup.margin_right = 5.0;
        let diags = LayoutValidator.validate(&doc);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_warning());
    }

    #[test]
    fn test_styling_magnitudes() {
        let mut doc = UniversalDocument::new("icf", "T");
        doc.styling.default_font_size = 0.0;
        doc.styling.line_spacing = 0.0;
        doc.styling.heading_3_size = 0.0;
        let msgs = messages(&doc);
        assert_eq!(
            msgs,
            vec![
                "Default font size must be positive",
                "Line spacing must be positive",
                "Heading 3 size must be positive",
            ]
        );
    }
}
