//! Validation of trees loaded from their stored JSON form

use trialdoc_uif::UniversalDocument;
use trialdoc_validate::{validate, Severity};

fn load(json: &str) -> UniversalDocument {
    serde_json::from_str(json).expect("valid UIF JSON")
}

#[test]
fn test_stored_consent_form_is_valid() {
    let doc = load(
        r##"{
            "document_type": "icf",
            "title": "Informed Consent Form",
            "metadata": {"protocol_number": "ABC-123", "sponsor": "Acme Pharma"},
            "sections": [
                {
                    "id": "purpose",
                    "level": 1,
                    "heading": "Purpose of the Study",
                    "content_blocks": [
                        {"type": "paragraph", "content": "This study tests a new drug."},
                        {"type": "bullet_list", "items": ["Visit 1", {"text": "Blood draw", "level": 1}]},
                        {"type": "table", "table": {"headers": ["Visit", "Week"], "rows": [["Screening", "0"]]}}
                    ],
                    "subsections": [
                        {"id": "risks", "level": 2, "heading": "Risks", "content_blocks": []}
                    ]
                }
            ]
        }"##,
    );

    let report = validate(&doc);
    assert!(report.is_valid(), "{:?}", report.error_messages());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_errors_collected_across_tree() {
    let doc = load(
        r##"{
            "document_type": "csr",
            "title": "",
            "page_setup": {"page_width": 0, "margin_left": -1},
            "sections": [
                {"id": "a", "level": 3, "heading": "A", "content_blocks": [
                    {"type": "heading", "content": "Sub"},
                    {"type": "table"}
                ], "subsections": [
                    {"id": "b", "level": 1, "heading": ""}
                ]}
            ]
        }"##,
    );

    let report = validate(&doc);
    assert!(!report.is_valid());

    let errors = report.error_messages();
    let expected = [
        "Document title is required",
        "Invalid document type 'csr'. Must be one of: icf, dmp, sap",
        "sections[0].content_blocks[0]: Heading level must be between 1 and 4",
        "sections[0].content_blocks[1]: Table block requires table data",
        "sections[0].subsections[0]: Subsection level (1) must be greater than parent level (3)",
        "sections[0].subsections[0]: Section heading is required",
        "page_setup.page_width: Page width must be positive",
        "page_setup.margin_left: Left margin cannot be negative",
    ];
    for message in expected {
        assert!(
            errors.iter().any(|e| e == message),
            "missing {:?} in {:?}",
            message,
            errors
        );
    }
    assert_eq!(errors.len(), expected.len());
}

#[test]
fn test_report_serializes_for_json_output() {
    let report = validate(&UniversalDocument::new("dmp", "Data Plan"));
    let json = serde_json::to_value(&report).unwrap();
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], "UIF103");
    assert_eq!(
        report.diagnostics[0].severity,
        Severity::Error
    );
}
