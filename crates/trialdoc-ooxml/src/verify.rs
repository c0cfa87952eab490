//! Archive verification
//!
//! Re-opens a written container and checks it the way a consumer would:
//! every entry decompresses with a matching CRC, the mandatory parts exist,
//! every XML part is well-formed, and every internal relationship target
//! resolves to a part.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::IntegrityError;
use crate::relationships::{resolve_target, Relationships};
use crate::xml::is_xml_illegal;

/// Parts every rendered document must contain
pub const REQUIRED_PARTS: [&str; 2] = ["[Content_Types].xml", "word/document.xml"];

/// Relationship parts whose targets are checked, with their source part
const CHECKED_RELATIONSHIPS: [(&str, &str); 2] = [
    ("_rels/.rels", ""),
    ("word/_rels/document.xml.rels", "word/document.xml"),
];

/// Verify an in-memory container; returns the sorted part list
pub fn verify_bytes(bytes: &[u8]) -> Result<Vec<String>, IntegrityError> {
    verify_reader(Cursor::new(bytes))
}

/// Verify a container on disk; returns the sorted part list
pub fn verify_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, IntegrityError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| IntegrityError::Unreadable(e.to_string()))?;
    verify_reader(file)
}

fn verify_reader<R: Read + Seek>(reader: R) -> Result<Vec<String>, IntegrityError> {
    let mut zip = ZipArchive::new(reader).map_err(|e| IntegrityError::Unreadable(e.to_string()))?;

    let mut parts: Vec<(String, Vec<u8>)> = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| IntegrityError::Unreadable(e.to_string()))?;
        let name = entry.name().to_string();
        if name.ends_with('/') {
            continue;
        }
        let mut contents = Vec::new();
        // The zip reader checks the CRC once the entry is read to its end
        entry
            .read_to_end(&mut contents)
            .map_err(|e| IntegrityError::CorruptEntry {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        parts.push((name, contents));
    }
    parts.sort_by(|a, b| a.0.cmp(&b.0));

    let missing: Vec<String> = REQUIRED_PARTS
        .iter()
        .filter(|required| !parts.iter().any(|(name, _)| name == *required))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IntegrityError::MissingParts(missing));
    }

    for (name, contents) in &parts {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            check_well_formed(name, contents)?;
        }
    }

    for (rels_part, source_part) in CHECKED_RELATIONSHIPS {
        let Some((_, contents)) = parts.iter().find(|(name, _)| name == rels_part) else {
            continue;
        };
        let rels = Relationships::parse(contents).map_err(|e| IntegrityError::MalformedXml {
            part: rels_part.to_string(),
            reason: e.to_string(),
        })?;
        for (id, rel) in rels.iter() {
            if rel.is_external() {
                continue;
            }
            let target = resolve_target(source_part, &rel.target);
            if !parts.iter().any(|(name, _)| *name == target) {
                return Err(IntegrityError::DanglingRelationship {
                    source_part: rels_part.to_string(),
                    id: id.to_string(),
                    target,
                });
            }
        }
    }

    Ok(parts.into_iter().map(|(name, _)| name).collect())
}

/// Parse a part to the end, requiring balanced elements
fn check_well_formed(part: &str, xml: &[u8]) -> Result<(), IntegrityError> {
    let malformed = |reason: String| IntegrityError::MalformedXml {
        part: part.to_string(),
        reason,
    };

    let text = std::str::from_utf8(xml).map_err(|e| malformed(e.to_string()))?;
    if let Some(ch) = text.chars().find(|&c| is_xml_illegal(c)) {
        return Err(malformed(format!(
            "illegal character U+{:04X}",
            u32::from(ch)
        )));
    }

    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_root = true;
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e.to_string())),
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed(format!("{} unclosed element(s)", depth)));
    }
    if !saw_root {
        return Err(malformed("no root element".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::OoxmlArchive;

    fn minimal() -> OoxmlArchive {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", "<Types/>");
        archive.set_string("word/document.xml", "<w:document xmlns:w=\"x\"><w:body/></w:document>");
        archive
    }

    #[test]
    fn test_minimal_archive_passes() {
        let bytes = minimal().to_bytes().unwrap();
        let parts = verify_bytes(&bytes).unwrap();
        assert_eq!(parts, vec!["[Content_Types].xml", "word/document.xml"]);
    }

    #[test]
    fn test_not_an_archive() {
        let err = verify_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, IntegrityError::Unreadable(_)));
    }

    #[test]
    fn test_missing_document_part() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", "<Types/>");
        let err = verify_bytes(&archive.to_bytes().unwrap()).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::MissingParts(vec!["word/document.xml".to_string()])
        );
    }

    #[test]
    fn test_malformed_xml_part() {
        let mut archive = minimal();
        archive.set_string("word/styles.xml", "<w:styles><w:style></w:styles>");
        let err = verify_bytes(&archive.to_bytes().unwrap()).unwrap_err();
        match err {
            IntegrityError::MalformedXml { part, .. } => assert_eq!(part, "word/styles.xml"),
            other => panic!("expected MalformedXml, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_xml_part() {
        let mut archive = minimal();
        archive.set_string("word/document.xml", "<w:document><w:body>");
        let err = verify_bytes(&archive.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, IntegrityError::MalformedXml { .. }));
    }

    #[test]
    fn test_control_character_in_part_rejected() {
        let mut archive = minimal();
        archive.set_string(
            "word/document.xml",
            "<w:document><w:body><w:t>a\u{B}b</w:t></w:body></w:document>",
        );
        match verify_bytes(&archive.to_bytes().unwrap()).unwrap_err() {
            IntegrityError::MalformedXml { part, reason } => {
                assert_eq!(part, "word/document.xml");
                assert!(reason.contains("U+000B"));
            }
            other => panic!("expected MalformedXml, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_relationship() {
        let mut archive = minimal();
        let mut rels = Relationships::new();
        rels.add("styles.xml", Relationships::TYPE_STYLES);
        archive.set_string("word/_rels/document.xml.rels", rels.to_xml());

        let err = verify_bytes(&archive.to_bytes().unwrap()).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::DanglingRelationship {
                source_part: "word/_rels/document.xml.rels".to_string(),
                id: "rId1".to_string(),
                target: "word/styles.xml".to_string(),
            }
        );
    }

    #[test]
    fn test_external_relationships_ignored() {
        let mut archive = minimal();
        let mut rels = Relationships::new();
        rels.add_with_mode(
            "https://example.org",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink",
            Some("External".to_string()),
        );
        archive.set_string("word/_rels/document.xml.rels", rels.to_xml());
        assert!(verify_bytes(&archive.to_bytes().unwrap()).is_ok());
    }

    #[test]
    fn test_corrupted_entry_detected() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", "<Types/>");
        archive.set_string("word/document.xml", format!("<d>{}</d>", "x".repeat(4096)));
        let mut bytes = archive.to_bytes().unwrap();

        // Flip bytes inside the compressed data of the last entry
        let marker = b"word/document.xml";
        let pos = bytes
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap();
        let data_start = pos + marker.len();
        for b in &mut bytes[data_start + 2..data_start + 6] {
            *b ^= 0xFF;
        }

        assert!(verify_bytes(&bytes).is_err());
    }
}
