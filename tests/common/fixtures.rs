//! Test fixtures and PDF builders.
//!
//! [`TestPdfBuilder`] writes documents with lopdf so page boxes and
//! encryption can be controlled exactly. [`printpdf_document`] produces the
//! kind of file a real authoring tool emits.

use anyhow::Result;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use printpdf::{BuiltinFont, Mm};
use std::fs;
use std::path::{Path, PathBuf};

use super::pdf_helpers::{encrypt_rc4_40, relabel_as_aes};

/// US Letter in points.
pub const LETTER: [i64; 4] = [0, 0, 612, 792];

/// Builder for multi-page test PDFs.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let bytes = TestPdfBuilder::new(12)
///     .with_crop_box([36, 36, 576, 756])
///     .with_user_password("hunter2")
///     .build_bytes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    pages: usize,
    media_box: [i64; 4],
    crop_box: Option<[i64; 4]>,
    user_password: Option<String>,
    owner_password: String,
    aes_handler: bool,
}

impl TestPdfBuilder {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            media_box: LETTER,
            crop_box: None,
            user_password: None,
            owner_password: "owner-secret".to_string(),
            aes_handler: false,
        }
    }

    /// Sets the MediaBox, stored once on the page tree root and inherited.
    pub fn with_media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    /// Sets a CropBox on every page.
    pub fn with_crop_box(mut self, crop_box: [i64; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    /// Encrypts with the standard handler (RC4, 40-bit). An empty user
    /// password opens without a prompt.
    pub fn with_user_password(mut self, password: &str) -> Self {
        self.user_password = Some(password.to_string());
        self
    }

    /// Declares the AES-128 crypt filter handler (V4) instead of RC4.
    /// Requires [`with_user_password`](Self::with_user_password).
    pub fn with_aes_handler(mut self) -> Self {
        self.aes_handler = true;
        self
    }

    pub fn build_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::with_capacity(self.pages);
        for n in 1..=self.pages {
            let content = format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET", n);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if let Some(crop_box) = self.crop_box {
                page.set("CropBox", rect_object(crop_box));
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.pages as i64,
            "Resources" => resources_id,
            "MediaBox" => rect_object(self.media_box),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(user) = &self.user_password {
            encrypt_rc4_40(&mut doc, user, &self.owner_password);
            if self.aes_handler {
                relabel_as_aes(&mut doc);
            }
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn build(&self, output_path: &Path) -> Result<PathBuf> {
        fs::write(output_path, self.build_bytes()?)?;
        Ok(output_path.to_path_buf())
    }
}

fn rect_object(rect: [i64; 4]) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Integer(v)).collect())
}

/// A document produced by printpdf, one line of text per page.
pub fn printpdf_document(pages: usize) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        printpdf::PdfDocument::new("Fixture", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    doc.get_page(first_page)
        .get_layer(first_layer)
        .use_text("Page 1", 24.0, Mm(20.0), Mm(270.0), &font);

    for n in 2..=pages {
        let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
        doc.get_page(page)
            .get_layer(layer)
            .use_text(format!("Page {}", n), 24.0, Mm(20.0), Mm(270.0), &font);
    }

    Ok(doc.save_to_bytes()?)
}
