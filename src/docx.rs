use std::borrow::Cow;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

const DOCUMENT_PART: &str = "word/document.xml";
// The declared size comes from the archive and may be forged.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a word document: {0}")]
    NotAWordDocument(String),
    #[error("bad input: {0}")]
    BadInput(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trim {
    #[default]
    None,
    Leading,
    Trailing,
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub normalize_newlines: bool,
    pub trim: Trim,
}

/// Returns the body text of a DOCX container, one line per paragraph.
pub fn extract(data: &[u8], options: &ExtractOptions) -> Result<Vec<u8>, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|err| ExtractError::NotAWordDocument(format!("uncompress failed: {err}")))?;

    let xml = {
        let mut entry = match archive.by_name(DOCUMENT_PART) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ExtractError::NotAWordDocument(format!(
                    "{DOCUMENT_PART} not found"
                )));
            }
            Err(err) => {
                return Err(ExtractError::BadInput(format!(
                    "failed to open {DOCUMENT_PART}: {err}"
                )));
            }
        };
        let mut xml = Vec::with_capacity(preallocation(entry.size()));
        entry
            .read_to_end(&mut xml)
            .map_err(|err| ExtractError::BadInput(format!("failed to read {DOCUMENT_PART}: {err}")))?;
        xml
    };

    let text = flatten_document_xml(&xml)?;
    debug!(xml_bytes = xml.len(), text_bytes = text.len(), "flattened document body");

    Ok(normalize(&text, options).into_bytes())
}

fn preallocation(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Walks WordprocessingML keeping run text, tabs, breaks and paragraph ends.
/// Tab stops declared inside `w:tabs` are paragraph properties, not text.
pub fn flatten_document_xml(xml: &[u8]) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;
    let mut tab_stops_depth = 0_usize;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|err| {
            ExtractError::BadInput(format!(
                "xml error at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(element) => match element.local_name().as_ref() {
                b"t" => in_text = true,
                b"tabs" => tab_stops_depth += 1,
                b"tab" if tab_stops_depth == 0 => out.push('\t'),
                b"br" => out.push('\n'),
                _ => {}
            },
            Event::Empty(element) => match element.local_name().as_ref() {
                b"tab" if tab_stops_depth == 0 => out.push('\t'),
                b"br" | b"p" => out.push('\n'),
                _ => {}
            },
            Event::End(element) => match element.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => tab_stops_depth = tab_stops_depth.saturating_sub(1),
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|err| ExtractError::BadInput(format!("bad text run: {err}")))?;
                out.push_str(&text);
            }
            Event::CData(data) if in_text => {
                let data = std::str::from_utf8(&data)
                    .map_err(|err| ExtractError::BadInput(format!("bad cdata run: {err}")))?;
                out.push_str(data);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

pub fn normalize(text: &str, options: &ExtractOptions) -> String {
    let text: Cow<'_, str> = if options.normalize_newlines {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    };

    if options.trim == Trim::None {
        return text.into_owned();
    }

    text.split('\n')
        .map(|line| match options.trim {
            Trim::Leading => line.trim_start_matches(is_ascii_space),
            Trim::Trailing => line.trim_end_matches(is_ascii_space),
            Trim::Both => line.trim_matches(is_ascii_space),
            Trim::None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_ascii_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

#[cfg(test)]
pub(crate) mod testing;
