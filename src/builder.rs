use crate::document::{Attribute, Document, Node};
use crate::error::{Error, Result};
use crate::namespace::qualified_attribute_name;
use crate::token::{StartElement, Token, TokenSource};
use tracing::{debug, trace};

/// Builds a [`Document`] from a [`TokenSource`].
///
/// The builder keeps a cursor on the innermost open element. New elements are
/// appended to the cursor's children and character data replaces the cursor's
/// text. It trusts the source for tag balance, but rejects a second top-level
/// element so that every element is reachable from the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    preserve_whitespace: bool,
}

impl TreeBuilder {
    pub fn new(preserve_whitespace: bool) -> TreeBuilder {
        TreeBuilder {
            preserve_whitespace,
        }
    }

    /// Pulls tokens until `source` is exhausted.
    ///
    /// # Errors
    ///
    /// Any error from `source` ends the build; the partial document is dropped.
    pub fn build<S: TokenSource>(&self, mut source: S) -> Result<Document> {
        let mut document = Document::new();
        let mut cursor: Option<Node> = None;

        while let Some(token) = source.next_token()? {
            trace!(?token);
            match token {
                Token::StartElement(start) => {
                    if cursor.is_none() && document.root().is_some() {
                        return Err(Error::MalformedXML(format!(
                            "Multiple root elements, found {} after the root",
                            start.name
                        )));
                    }
                    cursor = Some(self.handle_start(&mut document, cursor, start));
                }
                Token::EndElement(_) => {
                    cursor = cursor.and_then(|node| node.parent(&document));
                }
                Token::CharData(text) => {
                    // text outside of the root element is dropped
                    if let Some(node) = cursor {
                        let text = if self.preserve_whitespace {
                            text
                        } else {
                            text.trim().to_string()
                        };
                        node.set_text(&mut document, text);
                    }
                }
                Token::ProcInst(pi) => {
                    document.set_processing_instruction(format!("<?{}?>", pi));
                }
                Token::Directive(directive) => {
                    document.push_directive(format!("<!{}>", directive));
                }
            }
        }

        debug!(
            elements = document.len(),
            directives = document.directives().len(),
            "built document"
        );
        Ok(document)
    }

    fn handle_start(
        &self,
        document: &mut Document,
        cursor: Option<Node>,
        start: StartElement,
    ) -> Node {
        let attributes = start
            .attributes
            .into_iter()
            .map(|attr| Attribute {
                name: qualified_attribute_name(&attr),
                value: attr.value,
            })
            .collect();
        Node::new(document, start.name.local, attributes, cursor)
    }
}
