//! Composes the five parser stages into one question: does a multi-line
//! response's top-level `Content-Type` match a filtered media type?
//!
//! The pipeline only ever needs to answer that question — once headers end
//! ([`rfc822::Event::BodyStart`]), the session state machine either streams
//! the origin's original bytes straight through (no match) or switches to
//! emitting `Config::replacement_msg` instead (match). Body bytes themselves
//! never need to pass through this pipeline, so [`MimeFilter::feed`] stops
//! being called once it returns `Some`.

use super::{literal::CaseInsensitiveMatcher, mime, multiline, rfc822, tree::MatcherTree};

const CONTENT_TYPE: &[u8] = b"content-type";

#[derive(Debug)]
pub struct MimeFilter {
    framer: multiline::Framer,
    scanner: rfc822::Scanner,
    name_matcher: CaseInsensitiveMatcher,
    name_fresh: bool,
    matching_content_type: bool,
    value_parser: Option<mime::ValueParser>,
    type_buf: Vec<u8>,
    subtype_buf: Vec<u8>,
    content_type: Option<(String, String)>,
}

impl Default for MimeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeFilter {
    pub fn new() -> Self {
        Self {
            framer: multiline::Framer::new(),
            scanner: rfc822::Scanner::new(),
            name_matcher: CaseInsensitiveMatcher::new(CONTENT_TYPE),
            name_fresh: true,
            matching_content_type: false,
            value_parser: None,
            type_buf: Vec::new(),
            subtype_buf: Vec::new(),
            content_type: None,
        }
    }

    /// Feeds one raw byte from the origin's (still dot-stuffed) response.
    /// Returns `Some(true)` the moment the header block ends and the
    /// message's `Content-Type` matches `tree`, `Some(false)` the moment it
    /// ends without a match (or the message has no body at all), and `None`
    /// while still scanning headers.
    /// The `type/subtype` extracted from the message's `Content-Type`
    /// header, once headers have been fully scanned.
    pub fn content_type(&self) -> Option<(&str, &str)> {
        self.content_type
            .as_ref()
            .map(|(t, s)| (t.as_str(), s.as_str()))
    }

    pub fn feed(&mut self, byte: u8, tree: &MatcherTree) -> Option<bool> {
        for ev in self.framer.feed(byte) {
            match ev {
                multiline::Event::Fin => return Some(false),
                multiline::Event::Byte(b) => {
                    if let Some(decision) = self.feed_scanner(b, tree) {
                        return Some(decision);
                    }
                }
            }
        }
        None
    }

    fn feed_scanner(&mut self, byte: u8, tree: &MatcherTree) -> Option<bool> {
        for ev in self.scanner.feed(byte) {
            match ev {
                rfc822::Event::NameByte(b) => {
                    if self.name_fresh {
                        self.name_matcher.reset();
                        self.name_fresh = false;
                    }
                    self.matching_content_type =
                        matches!(self.name_matcher.feed(b), super::literal::Outcome::Eq);
                }
                rfc822::Event::NameEnd => {
                    self.name_fresh = true;
                    if self.matching_content_type {
                        self.value_parser = Some(mime::ValueParser::new());
                        self.type_buf.clear();
                        self.subtype_buf.clear();
                    }
                    self.matching_content_type = false;
                }
                rfc822::Event::ValueByte(b) => {
                    if let Some(vp) = &mut self.value_parser {
                        for vev in vp.feed(b) {
                            self.collect_mime_event(vev);
                        }
                    }
                }
                rfc822::Event::ValueEnd => {
                    if let Some(mut vp) = self.value_parser.take() {
                        for vev in vp.finish() {
                            self.collect_mime_event(vev);
                        }
                        if !self.type_buf.is_empty() && !self.subtype_buf.is_empty() {
                            self.content_type = Some((
                                String::from_utf8_lossy(&self.type_buf).to_lowercase(),
                                String::from_utf8_lossy(&self.subtype_buf).to_lowercase(),
                            ));
                        }
                    }
                }
                rfc822::Event::BodyStart => {
                    let decision = match &self.content_type {
                        Some((t, s)) => tree.is_match(t, s),
                        None => false,
                    };
                    return Some(decision);
                }
            }
        }
        None
    }

    fn collect_mime_event(&mut self, ev: mime::Event) {
        match ev {
            mime::Event::TypeByte(b) => self.type_buf.push(b),
            mime::Event::SubtypeByte(b) => self.subtype_buf.push(b),
            mime::Event::TypeEnd | mime::Event::SubtypeEnd => {}
        }
    }
}
