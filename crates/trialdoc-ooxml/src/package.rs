//! Package-level parts: content types, root relationships, document
//! properties and settings

use trialdoc_uif::UniversalDocument;

use crate::relationships::Relationships;
use crate::xml::{escape_xml, W_NS, XML_DECLARATION};

/// Content type of the main document part
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
/// Content type of word/styles.xml
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
/// Content type of word/numbering.xml
pub const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
/// Content type of word/settings.xml
pub const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
/// Content type of a header part
pub const CT_HEADER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
/// Content type of a footer part
pub const CT_FOOTER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
/// Content type of docProps/core.xml
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
/// Content type of docProps/app.xml
pub const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Name written to docProps/app.xml
const APPLICATION: &str = "trialdoc";

/// Serialize `[Content_Types].xml` with one override per part
pub fn content_types_xml(overrides: &[(&str, &str)]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            escape_xml(part),
            content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// Package relationships (`_rels/.rels`)
pub fn root_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
    rels.add("docProps/app.xml", Relationships::TYPE_EXTENDED_PROPERTIES);
    rels
}

/// Core properties from the document title, sponsor and compliance record
pub fn core_xml(doc: &UniversalDocument) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));

    xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&doc.title)));
    if let Some(number) = &doc.metadata.protocol_number {
        xml.push_str(&format!("<dc:subject>{}</dc:subject>", escape_xml(number)));
    }
    if let Some(sponsor) = &doc.metadata.sponsor {
        xml.push_str(&format!("<dc:creator>{}</dc:creator>", escape_xml(sponsor)));
    }
    xml.push_str(&format!(
        "<cp:category>{}</cp:category>",
        escape_xml(&doc.document_type)
    ));
    xml.push_str(&format!(
        "<cp:version>{}</cp:version>",
        escape_xml(&doc.metadata.document_version)
    ));
    xml.push_str(&format!(
        "<cp:contentStatus>{}</cp:contentStatus>",
        escape_xml(&doc.compliance.review_status)
    ));
    if let Some(generated_at) = doc.compliance.generated_at {
        let stamp = generated_at.format("%Y-%m-%dT%H:%M:%SZ");
        xml.push_str(&format!(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{0}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{0}</dcterms:modified>"#,
            stamp
        ));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

/// Extended properties
pub fn app_xml(doc: &UniversalDocument) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#);
    xml.push_str(&format!(
        "<Application>{} {}</Application>",
        APPLICATION,
        crate::VERSION
    ));
    if let Some(sponsor) = &doc.metadata.sponsor {
        xml.push_str(&format!("<Company>{}</Company>", escape_xml(sponsor)));
    }
    xml.push_str("</Properties>");
    xml
}

/// Document settings
pub fn settings_xml() -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:settings xmlns:w="{}">"#, W_NS));
    xml.push_str(r#"<w:defaultTabStop w:val="720"/><w:characterSpacingControl w:val="doNotCompress"/><w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>"#);
    xml.push_str("</w:settings>");
    xml
}
