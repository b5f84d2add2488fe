use crate::builder::TreeBuilder;
use crate::document::Document;
use crate::error::Result;
use crate::tokenizer::XmlTokenizer;
use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_8};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Transcodes bytes read from `inner` into UTF-8.
pub(crate) struct DecodeReader<R: Read> {
    decoder: Decoder,
    inner: R,
    undecoded: Vec<u8>,
    undecoded_pos: usize,
    undecoded_cap: usize,
    decoded: Vec<u8>,
    decoded_pos: usize,
    decoded_cap: usize,
    eof: bool,      // inner reader is exhausted
    finished: bool, // decoder is flushed
}

impl<R: Read> DecodeReader<R> {
    pub(crate) fn new(reader: R, decoder: Decoder) -> DecodeReader<R> {
        DecodeReader {
            decoder,
            inner: reader,
            undecoded: vec![0; 4096],
            undecoded_pos: 0,
            undecoded_cap: 0,
            decoded: vec![0; 12288],
            decoded_pos: 0,
            decoded_cap: 0,
            eof: false,
            finished: false,
        }
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let amt = {
            let available = self.fill_buf()?;
            let amt = std::cmp::min(available.len(), buf.len());
            buf[..amt].copy_from_slice(&available[..amt]);
            amt
        };
        self.consume(amt);
        Ok(amt)
    }
}

impl<R: Read> BufRead for DecodeReader<R> {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        // A decode pass may produce no output when input ends mid-character.
        while self.decoded_pos >= self.decoded_cap {
            if self.finished {
                return Ok(&[]);
            }
            if self.undecoded_pos >= self.undecoded_cap && !self.eof {
                let read = self.inner.read(&mut self.undecoded)?;
                self.eof = read == 0;
                self.undecoded_pos = 0;
                self.undecoded_cap = read;
            }
            let (result, read, written) = self.decoder.decode_to_utf8_without_replacement(
                &self.undecoded[self.undecoded_pos..self.undecoded_cap],
                &mut self.decoded,
                self.eof,
            );
            self.undecoded_pos += read;
            self.decoded_pos = 0;
            self.decoded_cap = written;
            match result {
                DecoderResult::Malformed(_, _) => {
                    self.finished = true;
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("input is not valid {}", self.decoder.encoding().name()),
                    ));
                }
                DecoderResult::InputEmpty if self.eof => self.finished = true,
                _ => {}
            }
        }
        Ok(&self.decoded[self.decoded_pos..self.decoded_cap])
    }

    fn consume(&mut self, amt: usize) {
        self.decoded_pos = std::cmp::min(self.decoded_pos + amt, self.decoded_cap);
    }
}

/// Options when parsing xml.
///
/// Setters consume and return the parser, so they chain:
/// ```
/// use xml_dom_builder::DomParser;
///
/// let doc = DomParser::new()
///     .preserve_whitespace(true)
///     .parse_str("<foo> bar </foo>")
///     .unwrap();
/// assert_eq!(doc.root().unwrap().text(&doc), " bar ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomParser {
    preserve_whitespace: bool,
    encoding: &'static Encoding,
}

impl Default for DomParser {
    fn default() -> DomParser {
        DomParser {
            preserve_whitespace: false,
            encoding: UTF_8,
        }
    }
}

impl DomParser {
    pub fn new() -> DomParser {
        DomParser::default()
    }

    /// Keep leading and trailing whitespace of element text. Trimmed by default.
    pub fn preserve_whitespace(mut self, preserve: bool) -> DomParser {
        self.preserve_whitespace = preserve;
        self
    }

    /// Encoding of byte and file input, UTF-8 by default.
    /// The declaration inside the document is not consulted.
    pub fn encoding(mut self, encoding: &'static Encoding) -> DomParser {
        self.encoding = encoding;
        self
    }

    pub fn is_preserving_whitespace(&self) -> bool {
        self.preserve_whitespace
    }

    /// Parses xml string. The configured encoding is ignored, `&str` is always UTF-8.
    ///
    /// # Errors
    ///
    /// Returns Errors from [`DomParser::parse_reader()`].
    pub fn parse_str(&self, text: &str) -> Result<Document> {
        self.parse_buffered(text.as_bytes())
    }

    /// Opens and parses the file at `path`. The file is closed before returning.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Io`]: The file could not be opened or read.
    /// - Errors from [`DomParser::parse_reader()`].
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "parsing file");
        self.parse_reader(file)
    }

    /// Parses xml from reader. The reader is dropped before returning.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::CannotDecode`]: Input is not valid in the configured encoding.
    /// - [`crate::Error::MalformedXML`]: Could not read XML.
    /// - [`crate::Error::Io`]: IO Error
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Document> {
        if self.encoding == UTF_8 {
            self.parse_buffered(BufReader::new(reader))
        } else {
            let decoder = self.encoding.new_decoder_without_bom_handling();
            self.parse_buffered(DecodeReader::new(reader, decoder))
        }
    }

    fn parse_buffered<B: BufRead>(&self, reader: B) -> Result<Document> {
        debug!(preserve_whitespace = self.preserve_whitespace, "parsing document");
        TreeBuilder::new(self.preserve_whitespace).build(XmlTokenizer::new(reader))
    }
}

/// Parses xml string with default settings.
pub fn parse_str(text: &str) -> Result<Document> {
    DomParser::new().parse_str(text)
}

/// Parses the file at `path` with default settings.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DomParser::new().parse_file(path)
}

/// Parses xml from reader with default settings.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    DomParser::new().parse_reader(reader)
}

/// Returns the parsed document, panicking on error.
///
/// For call sites with no recovery path, such as fixtures.
/// ```
/// let doc = xml_dom_builder::must(xml_dom_builder::parse_str("<a/>"));
/// assert_eq!(doc.root().unwrap().name(&doc), "a");
/// ```
///
/// # Panics
///
/// Panics if `result` is an error.
pub fn must(result: Result<Document>) -> Document {
    match result {
        Ok(document) => document,
        Err(err) => panic!("failed to parse XML: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_16LE, WINDOWS_1252};

    #[test]
    fn test_setters_chain() {
        let parser = DomParser::new();
        assert!(!parser.is_preserving_whitespace());
        let parser = parser.preserve_whitespace(true).encoding(WINDOWS_1252);
        assert!(parser.is_preserving_whitespace());
        assert_eq!(parser.encoding, WINDOWS_1252);
    }

    #[test]
    fn test_decode_reader() {
        let (bytes, _, _) = SHIFT_JIS.encode("<a>日本語</a>");
        let mut reader = DecodeReader::new(&bytes[..], SHIFT_JIS.new_decoder_without_bom_handling());
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "<a>日本語</a>");
    }

    #[test]
    fn test_decode_reader_small_reads() {
        // one byte at a time, so characters are split across reads
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }
        let mut bytes = Vec::new();
        for unit in "<é>ü</é>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoder = UTF_16LE.new_decoder_without_bom_handling();
        let mut reader = DecodeReader::new(Trickle(&bytes), decoder);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "<é>ü</é>");
    }

    #[test]
    fn test_parse_with_encoding() {
        let bytes = b"<name>caf\xe9</name>";
        let doc = DomParser::new()
            .encoding(WINDOWS_1252)
            .parse_reader(&bytes[..])
            .unwrap();
        assert_eq!(doc.root().unwrap().text(&doc), "café");
        assert!(matches!(
            DomParser::new().parse_reader(&bytes[..]),
            Err(crate::Error::CannotDecode)
        ));
    }

    #[test]
    fn test_parse_with_invalid_encoding() {
        // 0x82 starts a two-byte Shift_JIS sequence that `<` cannot finish.
        let result = DomParser::new()
            .encoding(SHIFT_JIS)
            .parse_reader(&b"<a>\x82</a>"[..]);
        assert!(matches!(result, Err(crate::Error::CannotDecode)));

        let result = DomParser::new()
            .encoding(SHIFT_JIS)
            .parse_reader(&b"<a>\x82"[..]);
        assert!(matches!(result, Err(crate::Error::CannotDecode)));
    }

    #[test]
    fn test_decode_reader_rejects_malformed() {
        let decoder = UTF_16LE.new_decoder_without_bom_handling();
        // Unpaired high surrogate.
        let mut reader = DecodeReader::new(&b"<\x00\x00\xd8a\x00"[..], decoder);
        let mut out = String::new();
        let err = reader.read_to_string(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    #[should_panic(expected = "failed to parse XML")]
    fn test_must_panics() {
        must(parse_str("<a></b>"));
    }
}
