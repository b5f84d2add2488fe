//! Lexical events consumed by [`crate::TreeBuilder`].

use crate::error::Result;
use std::fmt;

/// A possibly prefixed XML name. `xlink:href` -> `prefix: Some("xlink"), local: "href"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new<S: Into<String>>(local: S) -> QName {
        QName {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn prefixed<P: Into<String>, S: Into<String>>(prefix: P, local: S) -> QName {
        QName {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Splits a raw tag or attribute name on its first `:`.
    pub fn parse(raw: &str) -> QName {
        match raw.split_once(':') {
            Some((prefix, local)) => QName::prefixed(prefix, local),
            None => QName::new(raw),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute as reported by the tokenizer, before name qualification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: QName,
    /// Namespace URI the prefix resolved to. `None` for unprefixed attributes.
    pub namespace: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    pub name: QName,
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartElement(StartElement),
    EndElement(QName),
    CharData(String),
    /// Target and data of a processing instruction, `xml-stylesheet href="a.css"`.
    ProcInst(String),
    /// Everything between `<!` and `>`, `DOCTYPE html`.
    Directive(String),
}

/// A pull-based stream of [`Token`]s.
pub trait TokenSource {
    /// Returns the next token, or `Ok(None)` once the input is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Option<Token>> {
        (**self).next_token()
    }
}
