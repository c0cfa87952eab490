//! Prompts and response cleanup

use std::sync::OnceLock;

use regex::Regex;

/// Instruction sent as the system message of every batch request
pub const SYSTEM_PROMPT: &str = "You are an expert medical translator specializing in clinical trial documents.
Translate text accurately while preserving numbered markers and formatting.
Output translations directly without explanation or commentary.";

const BATCH_PROMPT: &str = "Translate the following ICF (Informed Consent Form) content to {language}.

RULES:
1. Use plain, simple language (8th grade reading level)
2. Maintain formal, respectful tone for medical consent forms
3. Preserve ALL numbered markers (|||0|||, |||1|||, etc.) EXACTLY
4. DO NOT translate: Protocol numbers, drug codes, abbreviations (ICF, FDA, IRB), organization names
5. Output ONLY the translated content with preserved |||N||| markers

INPUT:
{content}

TRANSLATION:";

const LANGUAGES: [(&str, &str); 10] = [
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese (Simplified)"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("pt", "Portuguese"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
];

/// Display name for a language code; unknown codes are uppercased
pub fn language_name(code: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

/// User message for one batch
pub fn batch_prompt(language: &str, batched_text: &str) -> String {
    BATCH_PROMPT
        .replace("{language}", language)
        .replace("{content}", batched_text)
}

fn wrapper_regex() -> &'static Regex {
    static WRAPPER_RE: OnceLock<Regex> = OnceLock::new();
    WRAPPER_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:here is the |the )?(?:translation(?:\s+in\s+\w+)?|translated text):\s*")
            .expect("wrapper pattern is valid")
    })
}

fn note_regex() -> &'static Regex {
    static NOTE_RE: OnceLock<Regex> = OnceLock::new();
    NOTE_RE.get_or_init(|| {
        Regex::new(r"(?is)\s*[\(\[]note:.*?[\)\]]$").expect("note pattern is valid")
    })
}

/// Strip model chatter from one translated text
///
/// Removes surrounding code fences, a leading `Translation:`-style label
/// and a trailing `(Note: ...)` remark.
pub fn clean_response(text: &str) -> String {
    strip_chatter(text, Chatter::all())
}

/// Clean one translated slot against the text it translates
///
/// Fences, labels and notes are only removed when the source does not
/// carry them itself, and the source's outer whitespace is put back.
pub fn clean_translation(source: &str, translated: &str) -> String {
    let core = strip_chatter(translated, Chatter::absent_from(source));
    if core.is_empty() || source.trim().is_empty() {
        return core;
    }
    let lead = &source[..source.len() - source.trim_start().len()];
    let trail = &source[source.trim_end().len()..];
    format!("{}{}{}", lead, core, trail)
}

/// Which kinds of chatter may be stripped
#[derive(Debug, Clone, Copy)]
struct Chatter {
    fence: bool,
    label: bool,
    note: bool,
}

impl Chatter {
    fn all() -> Self {
        Self {
            fence: true,
            label: true,
            note: true,
        }
    }

    fn absent_from(source: &str) -> Self {
        let source = source.trim();
        Self {
            fence: !source.starts_with("```"),
            label: !wrapper_regex().is_match(source),
            note: !note_regex().is_match(source),
        }
    }
}

fn strip_chatter(text: &str, chatter: Chatter) -> String {
    let mut text = text.trim().to_string();
    if text.is_empty() {
        return text;
    }

    // Only a multi-line block is a fence; "```x```" is content
    if chatter.fence && text.starts_with("```") && text.contains('\n') {
        let mut lines: Vec<&str> = text.lines().skip(1).collect();
        if lines.last().is_some_and(|l| l.trim().starts_with("```")) {
            lines.pop();
        }
        text = lines.join("\n").trim().to_string();
    }

    if chatter.label {
        text = wrapper_regex().replace(&text, "").into_owned();
    }
    if chatter.note {
        text = note_regex().replace(&text, "").into_owned();
    }
    text.trim().to_string()
}
