use crate::error::{Error, Result};
use crate::namespace::{XMLNS_URI, XML_URI};
use crate::token::{QName, RawAttribute, StartElement, Token, TokenSource};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

fn decode(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

struct Frame {
    name: QName,
    bindings_mark: usize,
}

/// Open elements and the `xmlns:prefix` bindings each of them declared.
#[derive(Default)]
struct ScopeStack {
    bindings: Vec<(String, String)>,
    frames: Vec<Frame>,
}

impl ScopeStack {
    fn open(&mut self, name: QName, declarations: Vec<(String, String)>) {
        self.frames.push(Frame {
            name,
            bindings_mark: self.bindings.len(),
        });
        self.bindings.extend(declarations);
    }

    fn close(&mut self, name: QName) -> Result<QName> {
        match self.frames.pop() {
            Some(frame) => {
                self.bindings.truncate(frame.bindings_mark);
                Ok(name)
            }
            None => Err(Error::MalformedXML(format!(
                "Unexpected closing tag {}",
                name
            ))),
        }
    }

    fn innermost(&self) -> Option<&QName> {
        self.frames.last().map(|frame| &frame.name)
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    // An undeclared prefix stands in for its own namespace name.
    fn attribute_namespace(&self, name: &QName) -> Option<String> {
        let prefix = name.prefix.as_deref()?;
        let uri = match prefix {
            "xmlns" => XMLNS_URI,
            "xml" => XML_URI,
            _ => self.resolve(prefix).unwrap_or(prefix),
        };
        Some(uri.to_string())
    }
}

/// [`TokenSource`] reading XML text with `quick_xml`.
///
/// Resolves attribute prefixes against the `xmlns:` declarations in scope,
/// unescapes text and attribute values, and reports `<tag/>` as a start/end pair.
/// Comments are skipped. The XML declaration is reported as a processing instruction.
pub struct XmlTokenizer<B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
    scopes: ScopeStack,
    pending_end: Option<QName>,
}

impl<B: BufRead> XmlTokenizer<B> {
    pub fn new(source: B) -> XmlTokenizer<B> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(false).check_end_names(true);
        XmlTokenizer {
            reader,
            buf: Vec::with_capacity(200),
            scopes: ScopeStack::default(),
            pending_end: None,
        }
    }
}

fn read_start(scopes: &mut ScopeStack, ev: &BytesStart) -> Result<StartElement> {
    let name = QName::parse(&decode(ev.name())?);
    let mut raw = Vec::new();
    let mut declarations = Vec::new();
    for attr in ev.attributes() {
        let attr = attr?;
        let key = QName::parse(&decode(attr.key)?);
        let value = String::from_utf8(attr.unescaped_value()?.into_owned())?;
        if key.prefix.as_deref() == Some("xmlns") {
            declarations.push((key.local.clone(), value.clone()));
        }
        raw.push((key, value));
    }
    scopes.open(name.clone(), declarations);
    let attributes = raw
        .into_iter()
        .map(|(name, value)| RawAttribute {
            namespace: scopes.attribute_namespace(&name),
            name,
            value,
        })
        .collect();
    Ok(StartElement { name, attributes })
}

impl<B: BufRead> TokenSource for XmlTokenizer<B> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(Token::EndElement(self.scopes.close(name)?)));
        }
        loop {
            self.buf.clear();
            let token = match self.reader.read_event(&mut self.buf)? {
                Event::Start(ref ev) => Token::StartElement(read_start(&mut self.scopes, ev)?),
                Event::Empty(ref ev) => {
                    let start = read_start(&mut self.scopes, ev)?;
                    self.pending_end = Some(start.name.clone());
                    Token::StartElement(start)
                }
                Event::End(ref ev) => {
                    let name = QName::parse(&decode(ev.name())?);
                    Token::EndElement(self.scopes.close(name)?)
                }
                Event::Text(ev) => {
                    let text = String::from_utf8(ev.unescaped()?.into_owned())?;
                    if text.is_empty() {
                        continue;
                    }
                    Token::CharData(text)
                }
                // CData content is stored escaped by quick_xml.
                Event::CData(ev) => Token::CharData(String::from_utf8(ev.unescaped()?.into_owned())?),
                Event::PI(ev) => Token::ProcInst(decode(&ev)?),
                // Kept as written, quoting and spacing included.
                Event::Decl(ev) => Token::ProcInst(decode(&ev)?),
                Event::DocType(ev) => Token::Directive(format!("DOCTYPE {}", decode(&ev)?.trim())),
                Event::Comment(_) => continue,
                Event::Eof => {
                    return match self.scopes.innermost() {
                        Some(name) => Err(Error::MalformedXML(format!(
                            "Unclosed element {} at end of input",
                            name
                        ))),
                        None => Ok(None),
                    };
                }
            };
            return Ok(Some(token));
        }
    }
}
