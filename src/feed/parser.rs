use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors produced while decoding an RSS document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Well-formed XML, but not an RSS document.
    #[error("no <channel> element found")]
    MissingChannel,
}

/// An RSS channel as it came off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RawItem>,
}

/// One `<item>` of a channel. `pub_date` is left as text for the time parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

impl RawFeed {
    fn set(&mut self, field: &[u8], text: &str) {
        match field {
            b"title" => self.title.push_str(text),
            b"link" => self.link.push_str(text),
            b"description" => self.description.push_str(text),
            _ => {}
        }
    }

    /// Strip the layout whitespace around every field's text.
    fn trim_fields(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.link);
        trim_in_place(&mut self.description);
        for item in &mut self.items {
            trim_in_place(&mut item.title);
            trim_in_place(&mut item.link);
            trim_in_place(&mut item.description);
            trim_in_place(&mut item.pub_date);
        }
    }

    /// Decode HTML entities in the human-readable fields. Feeds commonly
    /// escape markup twice, so `&amp;amp;` arrives here as `&amp;`.
    fn decode_entities(&mut self) {
        decode_in_place(&mut self.title);
        decode_in_place(&mut self.description);
        for item in &mut self.items {
            decode_in_place(&mut item.title);
            decode_in_place(&mut item.description);
        }
    }
}

impl RawItem {
    fn set(&mut self, field: &[u8], text: &str) {
        match field {
            b"title" => self.title.push_str(text),
            b"link" => self.link.push_str(text),
            b"description" => self.description.push_str(text),
            b"pubDate" => self.pub_date.push_str(text),
            _ => {}
        }
    }
}

fn trim_in_place(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}

fn decode_in_place(text: &mut String) {
    if text.contains('&') {
        *text = html_escape::decode_html_entities(text.as_str()).into_owned();
    }
}

/// Decodes an RSS 2.0 document into a [`RawFeed`].
///
/// Only unprefixed `title`, `link`, `description` and `pubDate` children of
/// `<channel>` and `<item>` are read; namespaced elements such as
/// `<atom:link>` and anything else are skipped. Text and CDATA are both
/// accepted. HTML entities in titles and descriptions are decoded before
/// returning.
///
/// # Errors
///
/// [`ParseError::Xml`] for malformed XML, [`ParseError::MissingChannel`]
/// when the document has no `<channel>` element.
pub fn parse_rss(bytes: &[u8]) -> Result<RawFeed, ParseError> {
    // XXE: quick-xml (0.37) never expands <!ENTITY> declarations; only the five
    // XML builtins are resolved by `unescape()`.
    // Text is not trimmed per event: a field split by CDATA keeps the spaces
    // around each piece, and whole fields are trimmed at the end.
    let mut reader = Reader::from_reader(bytes);

    let mut feed = RawFeed::default();
    let mut saw_channel = false;
    // Open element names from the root down
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                let parent = path.last().map(Vec::as_slice);
                match (parent, name.as_slice()) {
                    (_, b"channel") => saw_channel = true,
                    (Some(b"channel"), b"item") => feed.items.push(RawItem::default()),
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                // Stray HTML entities (&nbsp; and friends) are not valid XML;
                // keep the raw text and let the HTML decoder handle them.
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(e) => {
                        tracing::debug!(error = %e, "Keeping unescaped text");
                        String::from_utf8_lossy(&t).into_owned()
                    }
                };
                assign(&mut feed, &path, &text);
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                assign(&mut feed, &path, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(ParseError::Xml("unexpected end of document".to_string()));
    }
    if !saw_channel {
        return Err(ParseError::MissingChannel);
    }

    // Trim first so a decoded &nbsp; at either end survives
    feed.trim_fields();
    feed.decode_entities();
    Ok(feed)
}

/// Route character data to the field named by the innermost open element.
fn assign(feed: &mut RawFeed, path: &[Vec<u8>], text: &str) {
    let [.., parent, field] = path else {
        return;
    };
    match parent.as_slice() {
        b"channel" => feed.set(field, text),
        b"item" => {
            if let Some(item) = feed.items.last_mut() {
                item.set(field, text);
            }
        }
        _ => {}
    }
}
