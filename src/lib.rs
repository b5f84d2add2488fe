//! Builds a navigable DOM tree from XML.
//!
//! Elements keep their local name, their attributes in source order and the
//! character data directly inside them. Attributes in the `xmlns`, `xml`,
//! `xlink` and `xsi` namespaces are always stored under those prefixes.
//!
//! ```
//! use xml_dom_builder::DomParser;
//!
//! let doc = DomParser::new()
//!     .parse_str(r#"<root xmlns:l="http://www.w3.org/1999/xlink" l:href="X"> text </root>"#)
//!     .unwrap();
//! let root = doc.root().unwrap();
//! assert_eq!(root.attribute(&doc, "xlink:href"), Some("X"));
//! assert_eq!(root.text(&doc), "text");
//! ```

mod builder;
mod document;
mod error;
pub mod namespace;
mod parser;
pub mod token;
mod tokenizer;

pub use crate::builder::TreeBuilder;
pub use crate::document::{Attribute, Document, Node};
pub use crate::error::{Error, Result};
pub use crate::parser::{must, parse_file, parse_reader, parse_str, DomParser};
pub use crate::token::{Token, TokenSource};
pub use crate::tokenizer::XmlTokenizer;
