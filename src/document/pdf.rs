//! lopdf-backed [`PageDocument`].
//!
//! Blackout is a visual overlay: a filled rectangle appended to the page's
//! content streams. The original page content is left in the file.

use std::io::Write;

use lopdf::encryption::DecryptionError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace, warn};

use super::{PageDocument, PageRect};
use crate::error::{RedactorError, RedactorResult};

/// Page-tree levels walked when resolving inherited boxes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Standard security handler versions lopdf can decrypt (RC4 only).
const SUPPORTED_VERSIONS: std::ops::RangeInclusive<i64> = 1..=2;
const SUPPORTED_REVISIONS: std::ops::RangeInclusive<i64> = 2..=3;

/// A PDF opened for in-place blackout.
///
/// Dropping the value releases the parsed document.
pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Parses a document from memory.
    pub fn open(bytes: &[u8]) -> RedactorResult<Self> {
        let inner = Document::load_mem(bytes).map_err(RedactorError::unreadable)?;

        // get_pages is keyed by 1-based page number, already in order
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();

        debug!(
            pages = page_ids.len(),
            encrypted = inner.is_encrypted(),
            "opened document"
        );

        Ok(Self { inner, page_ids })
    }

    fn page_id(&self, index: usize) -> RedactorResult<ObjectId> {
        self.page_ids.get(index).copied().ok_or_else(|| RedactorError::Processing {
            message: format!(
                "page index {} out of range (0..{})",
                index,
                self.page_ids.len()
            ),
            page: Some(index + 1),
            source: None,
        })
    }

    /// Finds `key` on the page or the nearest ancestor in the page tree.
    fn inherited<'a>(&'a self, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.inner.get_object(current).and_then(Object::as_dict).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.inner.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn number(&self, object: &Object) -> Option<f32> {
        match self.resolve(object)? {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r as f32),
            _ => None,
        }
    }

    fn read_box(&self, page_id: ObjectId, key: &[u8]) -> Option<PageRect> {
        let array = self.resolve(self.inherited(page_id, key)?)?.as_array().ok()?;
        if array.len() != 4 {
            return None;
        }
        let values: Vec<f32> = array.iter().filter_map(|o| self.number(o)).collect();
        match values.as_slice() {
            [ax, ay, bx, by] => Some(PageRect::from_corners(*ax, *ay, *bx, *by)),
            _ => None,
        }
    }

    /// Rejects encryption lopdf cannot undo, so a correct password is never
    /// reported as a wrong one.
    fn check_security_handler(&self) -> RedactorResult<()> {
        let dict = match self.inner.trailer.get(b"Encrypt") {
            Ok(Object::Reference(id)) => self.inner.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        }
        .ok_or_else(|| RedactorError::unreadable("malformed encryption dictionary"))?;

        let filter = dict
            .get(b"Filter")
            .and_then(Object::as_name_str)
            .unwrap_or("");
        let version = dict.get(b"V").and_then(Object::as_i64).unwrap_or(0);
        let revision = dict.get(b"R").and_then(Object::as_i64).unwrap_or(0);

        if filter == "Standard"
            && SUPPORTED_VERSIONS.contains(&version)
            && SUPPORTED_REVISIONS.contains(&revision)
        {
            Ok(())
        } else {
            warn!(filter, version, revision, "unsupported encryption");
            Err(RedactorError::unreadable(format!(
                "unsupported encryption (/{} V{} R{}); only RC4 standard security is supported",
                filter, version, revision
            )))
        }
    }

    fn add_stream(&mut self, content: Vec<u8>) -> ObjectId {
        self.inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), content)))
    }
}

fn blackout_operators(rect: PageRect) -> String {
    format!(
        "q\n0 0 0 rg\n{} {} {} {} re\nf\nQ\n",
        rect.x0,
        rect.y0,
        rect.width(),
        rect.height()
    )
}

impl PageDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn is_encrypted(&self) -> bool {
        self.inner.is_encrypted()
    }

    fn authenticate(&mut self, password: &str) -> RedactorResult<()> {
        if !self.inner.is_encrypted() {
            return Ok(());
        }
        self.check_security_handler()?;
        self.inner.decrypt(password).map_err(|e| match e {
            lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
                debug!("document password rejected");
                RedactorError::IncorrectPassword
            }
            other => RedactorError::unreadable(format!("cannot decrypt document: {}", other)),
        })
    }

    /// The visible area: `CropBox` when present, otherwise `MediaBox`.
    fn page_rect(&self, index: usize) -> RedactorResult<PageRect> {
        let page_id = self.page_id(index)?;
        let rect = self
            .read_box(page_id, b"CropBox")
            .or_else(|| self.read_box(page_id, b"MediaBox"))
            .unwrap_or_else(|| {
                debug!(page = index + 1, "no page box found, assuming US Letter");
                PageRect::LETTER
            });
        Ok(rect)
    }

    fn fill_rect(&mut self, index: usize, rect: PageRect) -> RedactorResult<()> {
        let page_id = self.page_id(index)?;
        let existing = self.inner.get_page_contents(page_id);

        // Isolate the original content so its graphics state cannot leak
        // into the overlay.
        let contents = if existing.is_empty() {
            let overlay = self.add_stream(blackout_operators(rect).into_bytes());
            Object::Reference(overlay)
        } else {
            let open = self.add_stream(b"q\n".to_vec());
            let overlay = self.add_stream(format!("\nQ\n{}", blackout_operators(rect)).into_bytes());
            let mut refs = Vec::with_capacity(existing.len() + 2);
            refs.push(Object::Reference(open));
            refs.extend(existing.into_iter().map(Object::Reference));
            refs.push(Object::Reference(overlay));
            Object::Array(refs)
        };

        self.inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| RedactorError::processing("page is not a dictionary", Some(index + 1), e))?
            .set("Contents", contents);

        trace!(page = index + 1, ?rect, "blacked out page");
        Ok(())
    }

    fn write_to(&mut self, mut sink: &mut dyn Write) -> RedactorResult<()> {
        self.inner.compress();
        self.inner
            .save_to(&mut sink)
            .map_err(|e| RedactorError::processing("failed to serialize document", None, e))?;
        Ok(())
    }
}

impl Drop for PdfDocument {
    fn drop(&mut self) {
        trace!(pages = self.page_ids.len(), "released document");
    }
}
