use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Display;
use std::io::{self, BufRead};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::persist::markup::{Attribute, Document, Element, ElementId};
use crate::persist::{ArchiveError, ParseError, ParseErrorKind, StreamError};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

// -----------------------------------------------------------------------------
// DocumentBuilder

/// Builds a [`Document`] from the events of a [`quick_xml::Reader`].
///
/// Input is pulled through a [`BufRead`], so the reader's buffer capacity sets
/// the size of the chunks taken from the underlying stream.
///
/// Whitespace-only text is dropped, CDATA sections are appended to the body
/// verbatim. Comments, processing instructions (the XML declaration) and a
/// DOCTYPE are skipped, as is a leading byte order mark.
///
/// # Examples
///
/// ```
/// use std::io::BufReader;
/// use vc_reflect::persist::markup::DocumentBuilder;
///
/// let text = b"<Reflect Version=\"4\"><Object Type=\"u8\"><![CDATA[7]]></Object></Reflect>";
/// let input = BufReader::with_capacity(8, &text[..]);
///
/// let document = DocumentBuilder::new().parse(input).unwrap();
/// let root = document.root().unwrap();
/// assert_eq!(document[root].attribute("Version"), Some("4"));
///
/// let (_, child) = document.children(root).next().unwrap();
/// assert_eq!(child.tag(), "Object");
/// assert_eq!(child.body(), "7");
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
    open: Vec<ElementId>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `input` to its end.
    ///
    /// Offsets in a [`ParseError`] count bytes from the start of `input`.
    pub fn parse<R: BufRead>(mut self, input: R) -> Result<Document, ArchiveError> {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut buffer = Vec::new();
        loop {
            let start = offset(reader.buffer_position());
            let event = match reader.read_event_into(&mut buffer) {
                Ok(event) => event,
                Err(error) => return Err(reader_error(error, offset_of_error(&reader))),
            };
            let is_eof = matches!(event, Event::Eof);
            self.event(event).map_err(|kind| ParseError::new(start, kind))?;
            if is_eof {
                return Ok(self.document);
            }
            buffer.clear();
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ParseErrorKind> {
        match event {
            Event::Start(start) => self.open(&start, true),
            Event::Empty(start) => self.open(&start, false),
            Event::End(end) => {
                let name = end.name();
                self.close(utf8(name.as_ref())?)
            }
            Event::Text(text) => {
                if text.iter().all(u8::is_ascii_whitespace) {
                    return Ok(());
                }
                let text = text.unescape().map_err(syntax)?;
                self.text(&text)
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                self.text(utf8(&raw)?)
            }
            Event::Eof => self.end(),
            _ => Ok(()),
        }
    }

    fn open(&mut self, start: &BytesStart<'_>, has_content: bool) -> Result<(), ParseErrorKind> {
        let name = start.name();
        let tag = utf8(name.as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(syntax)?;
            attributes.push(Attribute {
                name: utf8(attribute.key.as_ref())?.to_string(),
                value: attribute.unescape_value().map_err(syntax)?.into_owned(),
            });
        }

        let parent = self.open.last().copied();
        if parent.is_none() && self.document.root().is_some() {
            return Err(ParseErrorKind::MultipleRoots);
        }
        let id = self.document.push(Element::new(tag, attributes, parent));
        if has_content {
            self.open.push(id);
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ParseErrorKind> {
        let Some(id) = self.open.pop() else {
            return Err(ParseErrorKind::UnbalancedClose(name.into()));
        };
        let expected = self.document[id].tag();
        if expected != name {
            return Err(ParseErrorKind::MismatchedTag {
                expected: expected.into(),
                found: name.into(),
            });
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), ParseErrorKind> {
        let Some(&id) = self.open.last() else {
            if self.document.is_empty() && text.trim_start_matches(BYTE_ORDER_MARK).trim().is_empty() {
                return Ok(());
            }
            return Err(ParseErrorKind::TextOutsideRoot);
        };
        self.document.element_mut(id).body.push_str(text);
        Ok(())
    }

    fn end(&self) -> Result<(), ParseErrorKind> {
        if !self.open.is_empty() {
            return Err(ParseErrorKind::UnexpectedEof);
        }
        if self.document.root().is_none() {
            return Err(ParseErrorKind::NoRoot);
        }
        Ok(())
    }
}

#[inline]
fn utf8(bytes: &[u8]) -> Result<&str, ParseErrorKind> {
    core::str::from_utf8(bytes).map_err(|_| ParseErrorKind::InvalidUtf8)
}

#[inline]
fn syntax(error: impl Display) -> ParseErrorKind {
    ParseErrorKind::Syntax(error.to_string())
}

#[inline]
fn offset(position: impl TryInto<u64>) -> u64 {
    position.try_into().unwrap_or(u64::MAX)
}

#[inline]
fn offset_of_error<R>(reader: &Reader<R>) -> u64 {
    offset(reader.error_position())
}

fn reader_error(error: quick_xml::Error, offset: u64) -> ArchiveError {
    match error {
        quick_xml::Error::Io(shared) => {
            let error = Arc::try_unwrap(shared).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string()));
            StreamError::Io(error).into()
        }
        error => ParseError::new(offset, syntax(error)).into(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::io::BufReader;

    use super::DocumentBuilder;
    use crate::persist::markup::Document;
    use crate::persist::{ArchiveError, ParseError, ParseErrorKind};

    const SAMPLE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <!-- archive -->\n\
        <Reflect FileFormatVersion=\"4\">\n  \
          <Object Type=\"Mesh\">\n    \
            <Object Type=\"String\" Name=\"name\"><![CDATA[a <b> & ]]]]><![CDATA[> c]]></Object>\n    \
            <Object Type=\"u32\" Name=\"count\">  12 </Object>\n    \
            <Object Type=\"String\" Name=\"note\">x &lt; y &amp;&#65;&#x42;</Object>\n  \
          </Object>\n\
        </Reflect>\n";

    fn parse_in_chunks(text: &str, chunk: usize) -> Document {
        DocumentBuilder::new()
            .parse(BufReader::with_capacity(chunk, text.as_bytes()))
            .unwrap()
    }

    fn error_at(text: &str) -> ParseError {
        match DocumentBuilder::new().parse(text.as_bytes()) {
            Err(ArchiveError::Parse(error)) => error,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    fn error_of(text: &str) -> ParseErrorKind {
        error_at(text).kind
    }

    #[test]
    fn parses_archive_markup() {
        let document = parse_in_chunks(SAMPLE, SAMPLE.len());
        let root = document.root().unwrap();
        assert_eq!(document[root].tag(), "Reflect");
        assert_eq!(document[root].attribute("FileFormatVersion"), Some("4"));
        assert_eq!(document[root].child_count(), 1);

        let (mesh_id, mesh) = document.children(root).next().unwrap();
        assert_eq!(mesh.attribute("Type"), Some("Mesh"));
        assert_eq!(mesh.body(), "");

        let bodies: Vec<_> = document.children(mesh_id).map(|(_, e)| e.body()).collect();
        assert_eq!(bodies, ["a <b> & ]]> c", "  12 ", "x < y &AB"]);
    }

    #[test]
    fn chunk_boundaries_do_not_matter() {
        let whole = parse_in_chunks(SAMPLE, SAMPLE.len());
        for chunk in [1, 2, 3, 5, 7, 13] {
            assert_eq!(parse_in_chunks(SAMPLE, chunk), whole, "chunk size {chunk}");
        }
    }

    #[test]
    fn quoted_angle_brackets_in_attributes() {
        let document = parse_in_chunks("<a b='x>y' c=\"&quot;\"/>", 2);
        let root = &document[document.root().unwrap()];
        assert_eq!(root.attribute("b"), Some("x>y"));
        assert_eq!(root.attribute("c"), Some("\""));
    }

    #[test]
    fn leading_byte_order_mark() {
        let document = parse_in_chunks("\u{FEFF}<?xml version=\"1.0\"?>\n<a>1</a>", 4);
        let root = &document[document.root().unwrap()];
        assert_eq!(root.tag(), "a");
        assert_eq!(root.body(), "1");

        assert_eq!(error_of("<a/>\u{FEFF}"), ParseErrorKind::TextOutsideRoot);
    }

    #[test]
    fn malformed_documents() {
        assert_eq!(error_of("<a><b></a>"), ParseErrorKind::MismatchedTag {
            expected: "b".into(),
            found: "a".into(),
        });
        assert_eq!(error_of("<a/><b/>"), ParseErrorKind::MultipleRoots);
        assert_eq!(error_of("<a>"), ParseErrorKind::UnexpectedEof);
        assert_eq!(error_of("text"), ParseErrorKind::TextOutsideRoot);
        assert_eq!(error_of("   "), ParseErrorKind::NoRoot);
        assert_eq!(error_of("</a>"), ParseErrorKind::UnbalancedClose("a".into()));
        assert!(matches!(error_of("<a><![CDATA[x"), ParseErrorKind::Syntax(_)));
        assert!(matches!(error_of("<a b=c/>"), ParseErrorKind::Syntax(_)));
        assert!(matches!(error_of("<a>&nope;</a>"), ParseErrorKind::Syntax(_)));
    }

    #[test]
    fn error_offsets_are_absolute() {
        let error = match DocumentBuilder::new().parse(BufReader::with_capacity(2, &b"<a></b>"[..])) {
            Err(ArchiveError::Parse(error)) => error,
            other => panic!("expected a parse error, got {other:?}"),
        };
        assert_eq!(error.offset, 3);
        assert_eq!(error_at("<a>\n<b></a>").offset, 7);
    }

    #[test]
    fn large_cdata_body() {
        let body: String = "0123456789abcdef".repeat(1 << 16);
        let text = alloc::format!("<a><![CDATA[{body}]]></a>");
        let document = parse_in_chunks(&text, 4096);
        assert_eq!(document[document.root().unwrap()].body().len(), body.len());
    }
}
