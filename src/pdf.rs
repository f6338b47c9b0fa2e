use crate::canvas::{Command, Document};
use crate::error::ReportError;
use crate::font::{FontFace, encode_winansi};
use crate::raster::RasterImage;
use crate::types::{Color, Pt};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::BTreeMap;
use std::io::Write;

pub(crate) struct PdfOutput {
    pub bytes: Vec<u8>,
    /// Compressed content stream size per page.
    pub content_sizes: Vec<usize>,
}

/// Serializes `document` with the base-14 Helvetica faces. No timestamps or
/// random ids are written, so equal documents give equal bytes.
pub(crate) fn document_to_pdf(document: &Document, title: &str) -> Result<PdfOutput, ReportError> {
    let mut pdf = lopdf::Document::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let page_width = document.page_size.width;
    let page_height = document.page_size.height;

    let mut fonts = Dictionary::new();
    for face in FontFace::all() {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let fonts_id = pdf.add_object(fonts);

    let mut image_ids: BTreeMap<&str, ObjectId> = BTreeMap::new();
    for (resource_id, image) in &document.images {
        image_ids.insert(resource_id.as_str(), pdf.add_object(image_xobject(image)));
    }

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    let mut content_sizes = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let operations = page_operations(&page.commands, page_height);
        let encoded = Content { operations }
            .encode()
            .map_err(|err| ReportError::Pdf(format!("content encode failed: {err}")))?;
        let compressed = flate_compress(&encoded)?;
        content_sizes.push(compressed.len());
        let content_id = pdf.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            compressed,
        ));

        let mut xobjects = Dictionary::new();
        for cmd in &page.commands {
            if let Command::DrawImage { resource_id, .. } = cmd {
                let id = image_ids.get(resource_id.as_str()).ok_or_else(|| {
                    ReportError::Pdf(format!("missing image resource {resource_id}"))
                })?;
                xobjects.set(resource_id.as_str(), *id);
            }
        }
        let mut resources = dictionary! { "Font" => fonts_id };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                num(page_width),
                num(page_height),
            ],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::String(encode_winansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("riskreport ", env!("CARGO_PKG_VERSION"))),
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|err| ReportError::Pdf(format!("save failed: {err}")))?;
    Ok(PdfOutput {
        bytes,
        content_sizes,
    })
}

fn page_operations(commands: &[Command], page_height: Pt) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(commands.len() * 2);
    let mut font: Option<(FontFace, Pt)> = None;
    for cmd in commands {
        match cmd {
            Command::SetFillColor(color) => ops.push(fill_color(*color)),
            Command::SetFont { face, size } => font = Some((*face, *size)),
            Command::DrawString { x, y, text } => {
                let (face, size) = font.unwrap_or((FontFace::Helvetica, Pt::from_i32(12)));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(face.resource_name().into()), num(size)],
                ));
                ops.push(Operation::new("Td", vec![num(*x), num(page_height - *y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_winansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                ops.push(Operation::new(
                    "re",
                    vec![
                        num(*x),
                        num(page_height - *y - *height),
                        num(*width),
                        num(*height),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        num(*width),
                        Object::Integer(0),
                        Object::Integer(0),
                        num(*height),
                        num(*x),
                        num(page_height - *y - *height),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(resource_id.as_bytes().to_vec())],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
            Command::BeginBlock { .. } | Command::EndBlock => {}
        }
    }
    ops
}

fn image_xobject(image: &RasterImage) -> Stream {
    let data = image.rgb_bytes();
    let (filter, content) = match flate_compress(&data) {
        Ok(compressed) => (Some("FlateDecode"), compressed),
        Err(_) => (None, data),
    };
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width() as i64,
        "Height" => image.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
    };
    if let Some(filter) = filter {
        dict.set("Filter", filter);
    }
    Stream::new(dict, content)
}

fn fill_color(color: Color) -> Operation {
    let [r, g, b, _] = color.to_rgba8();
    let channel = |v: u8| Object::Real(((v as f32 / 255.0) * 1000.0).round() / 1000.0);
    Operation::new("rg", vec![channel(r), channel(g), channel(b)])
}

// Milli-point precision keeps coordinates stable across runs.
fn num(value: Pt) -> Object {
    let milli = value.to_milli_i64();
    if milli % 1000 == 0 {
        Object::Integer(milli / 1000)
    } else {
        Object::Real(milli as f32 / 1000.0)
    }
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>, ReportError> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
