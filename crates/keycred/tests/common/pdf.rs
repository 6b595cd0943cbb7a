//! Statement PDFs generated with `lopdf`. Also included by path from the
//! receipt unit tests and the API crate's tests; keep it free of crate imports.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// One physical page of a generated statement.
pub enum PageSpec<'a> {
    Text(&'a [&'a str]),
    /// An embedded image and no fonts, the way a scanner writes pages.
    Scan,
}

pub fn statement_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|page| {
            let page_id = match page {
                PageSpec::Text(lines) => text_page(&mut doc, pages_id, font_id, lines),
                PageSpec::Scan => scanned_page(&mut doc, pages_id),
            };
            Object::Reference(page_id)
        })
        .collect();

    finish(doc, pages_id, kids)
}

/// A syntactically valid PDF whose page tree has no kids.
pub fn empty_page_tree_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    finish(doc, pages_id, Vec::new())
}

fn text_page(doc: &mut Document, parent: ObjectId, font_id: ObjectId, lines: &[&str]) -> ObjectId {
    let mut operations = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(9)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(40), Object::Integer(800 - 14 * index as i64)],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations }.encode().expect("encode content");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    })
}

fn scanned_page(doc: &mut Document, parent: ObjectId) -> ObjectId {
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(2),
            "Height" => Object::Integer(2),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        },
        vec![0, 255, 255, 0],
    ));
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(595),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(842),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
    .encode()
    .expect("encode content");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im1" => image_id },
        },
    })
}

fn finish(mut doc: Document, pages_id: ObjectId, kids: Vec<Object>) -> Vec<u8> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}
