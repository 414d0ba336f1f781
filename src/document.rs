//! Document loading on top of libxml2.
//!
//! Raw bytes are parsed with libxml2 in non-recovering mode, so anything that is
//! not well-formed XML is rejected up front instead of being silently repaired.
//! The resulting tree is owned by a [`WrapperDocument`] for the duration of one
//! validation call and is never mutated afterwards.
//!
//! libxml2 trees are reference counted without atomics, so a `WrapperDocument`
//! is neither `Send` nor `Sync`. Validation of one document therefore happens on
//! a single task; separate documents can still be validated in parallel.

use libxml::parser::{Parser, ParserOptions};
use libxml::tree::{Document, Node};

use crate::error::{StructuralError, StructuralResult};

/// A parsed NewsML-G2 wrapper document
pub struct WrapperDocument {
    document: Document,
    byte_len: usize,
}

impl WrapperDocument {
    /// Parse raw document bytes.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::NotWellFormed` if libxml2 cannot produce a tree and
    /// `StructuralError::MissingRoot` if the tree has no document element.
    pub fn load(raw: &[u8]) -> StructuralResult<Self> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(StructuralError::NotWellFormed {
                details: "empty document".to_string(),
            });
        }

        let options = ParserOptions {
            recover: false,
            ..ParserOptions::default()
        };
        let document = Parser::default()
            .parse_string_with_options(raw, options)
            .map_err(|e| StructuralError::NotWellFormed {
                details: format!("{e:?}"),
            })?;

        if document.get_root_element().is_none() {
            return Err(StructuralError::MissingRoot);
        }

        Ok(Self {
            document,
            byte_len: raw.len(),
        })
    }

    /// Parse a UTF-8 string.
    pub fn load_str(xml: &str) -> StructuralResult<Self> {
        Self::load(xml.as_bytes())
    }

    /// The underlying libxml2 document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The document element
    pub fn root(&self) -> StructuralResult<Node> {
        self.document
            .get_root_element()
            .ok_or(StructuralError::MissingRoot)
    }

    /// Size of the raw input in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl std::fmt::Debug for WrapperDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperDocument")
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}
