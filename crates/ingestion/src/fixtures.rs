//! Minimal PDF generator for tests
//!
//! Builds real PDFs with lopdf so extraction is exercised end to end.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

#[derive(Debug, Default, Clone)]
pub struct PdfBuilder {
    title: Option<String>,
    indirect_title: bool,
    pages: Vec<Vec<String>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `Title` entry of the document information dictionary
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Store the title as its own object, referenced from the Info dictionary
    pub fn indirect_title(mut self) -> Self {
        self.indirect_title = true;
        self
    }

    /// Append a page holding one text line per entry
    pub fn page(mut self, lines: &[&str]) -> Self {
        self.pages.push(lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for lines in &self.pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 750 - (i as i64) * 14;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content stream"),
            ));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = self.title {
            let mut title = Object::string_literal(title.as_str());
            if self.indirect_title {
                title = Object::Reference(doc.add_object(title));
            }
            let info_id = doc.add_object(dictionary! {
                "Title" => title,
            });
            doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("write pdf");
        bytes
    }
}

/// One-page PDF with the given title and body lines
pub fn simple_pdf(title: &str, lines: &[&str]) -> Vec<u8> {
    PdfBuilder::new().title(title).page(lines).build()
}
