//! PDF output via `lopdf`.
//!
//! Uses the two standard Helvetica faces with WinAnsi encoding, so no font
//! data is embedded. JPEG images are embedded as-is (DCTDecode); any other
//! image format is drawn as a labelled frame.

use base64::{engine::general_purpose, Engine as _};
use lopdf::content::{Content, Operation};
use lopdf::{
    dictionary, Dictionary, Document as PdfDocument, Object, ObjectId, Stream, StringFormat,
};

use super::layout::{paginate, DrawOp, Font, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::DocumentRenderer;
use crate::error::GenerationError;
use crate::types::{Document, Rgb};

/// Writes documents as PDF 1.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, GenerationError> {
        let pages = paginate(document);
        write_pdf(&pages, &document.title)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    let Rgb(r, g, b) = color;
    [r, g, b]
        .into_iter()
        .map(|c| real(f64::from(c) / 255.0))
        .collect()
}

/// Encode text as WinAnsi bytes. Characters outside the code page become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c => u8::try_from(u32::from(c))
                .ok()
                .filter(|&b| b >= 0x20 && !(0x7f..0xa0).contains(&b))
                .unwrap_or(b'?'),
        })
        .collect()
}

/// Width, height and component count of a baseline or progressive JPEG.
pub(crate) fn jpeg_info(bytes: &[u8]) -> Option<(u32, u32, u8)> {
    if bytes.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let be16 = |at: usize| -> Option<u16> {
        let pair = bytes.get(at..at + 2)?;
        Some(u16::from_be_bytes([*pair.first()?, *pair.get(1)?]))
    };
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if *bytes.get(i)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(i + 1)?;
        match marker {
            // Fill bytes
            0xFF => i += 1,
            // Standalone markers
            0x01 | 0xD0..=0xD9 => i += 2,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let height = be16(i + 5)?;
                let width = be16(i + 7)?;
                let components = *bytes.get(i + 9)?;
                return Some((u32::from(width), u32::from(height), components));
            }
            _ => i += 2 + usize::from(be16(i + 2)?),
        }
    }
    None
}

struct PageWriter<'a> {
    doc: &'a mut PdfDocument,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

impl PageWriter<'_> {
    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let face = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                self.op("rg", color_operands(*color));
                self.op("BT", vec![]);
                self.op("Tf", vec![face.into(), real(*size)]);
                self.op("Td", vec![real(*x), real(PAGE_HEIGHT - y)]);
                self.op(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                );
                self.op("ET", vec![]);
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let rect = vec![
                    real(*x),
                    real(PAGE_HEIGHT - y - height),
                    real(*width),
                    real(*height),
                ];
                if let Some(fill) = fill {
                    self.op("rg", color_operands(*fill));
                    self.op("re", rect.clone());
                    self.op("f", vec![]);
                }
                if let Some(stroke) = stroke {
                    self.op("RG", color_operands(*stroke));
                    self.op("w", vec![real(0.75)]);
                    self.op("re", rect);
                    self.op("S", vec![]);
                }
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                self.op("RG", color_operands(*color));
                self.op("w", vec![real(*width)]);
                self.op("m", vec![real(*x1), real(PAGE_HEIGHT - y1)]);
                self.op("l", vec![real(*x2), real(PAGE_HEIGHT - y2)]);
                self.op("S", vec![]);
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                asset,
                mime,
                data,
            } => self.image(*x, *y, *width, *height, asset, mime, data),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        asset: &str,
        mime: &str,
        data: &str,
    ) {
        let decoded = general_purpose::STANDARD.decode(data).ok();
        let jpeg = decoded
            .as_deref()
            .filter(|_| mime == "image/jpeg")
            .and_then(|bytes| jpeg_info(bytes).map(|info| (bytes, info)));
        let Some((bytes, (px_w, px_h, components))) = jpeg else {
            tracing::warn!(asset, mime, "image not embeddable, drawing a frame");
            self.draw(&DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill: None,
                stroke: Some(Rgb::SLATE_400),
            });
            self.draw(&DrawOp::Text {
                x: x + 6.0,
                y: y + height / 2.0 + 3.0,
                size: 8.0,
                font: Font::Regular,
                color: Rgb::SLATE_400,
                text: asset.to_string(),
            });
            return;
        };
        let color_space = match components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(px_w),
                "Height" => i64::from(px_h),
                "ColorSpace" => color_space,
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            bytes.to_vec(),
        );
        let image_id = self.doc.add_object(stream);
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.set(name.as_str(), image_id);

        let scale = (width / f64::from(px_w.max(1))).min(height / f64::from(px_h.max(1)));
        let draw_w = f64::from(px_w) * scale;
        let draw_h = f64::from(px_h) * scale;
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                real(draw_w),
                real(0.0),
                real(0.0),
                real(draw_h),
                real(x),
                real(PAGE_HEIGHT - y - draw_h),
            ],
        );
        self.op("Do", vec![name.as_str().into()]);
        self.op("Q", vec![]);
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn write_pdf(pages: &[Page], title: &str) -> Result<Vec<u8>, GenerationError> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let fonts_id = doc.add_object(dictionary! {
        "F1" => regular_id,
        "F2" => bold_id,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut writer = PageWriter {
            doc: &mut doc,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        };
        for op in &page.ops {
            writer.draw(op);
        }
        let PageWriter {
            operations,
            xobjects,
            ..
        } = writer;
        let content = Content { operations }
            .encode()
            .map_err(|e| GenerationError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let mut resources = dictionary! { "Font" => fonts_id };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).map_err(|e| GenerationError::Pdf(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH),
                real(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| GenerationError::Pdf(e.to_string()))?;
    tracing::info!(pages = pages.len(), bytes = out.len(), "PDF written");
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, RunningFooter};

    /// Smallest JPEG header the SOF scan accepts: SOI, APP0 stub, SOF0.
    fn tiny_jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00];
        bytes.extend([0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x20, 0x00, 0x40, 0x03, 0x01]);
        bytes.extend([0xFF, 0xD9]);
        bytes
    }

    fn document(blocks: Vec<ContentBlock>) -> Document {
        Document {
            title: "Cotización".into(),
            subtitle: String::new(),
            header_lines: Vec::new(),
            file_name: "c.pdf".into(),
            header_color: Rgb::CYAN_700,
            blocks,
            footer: RunningFooter {
                left: String::new(),
                center: "{page}/{pages}".into(),
                right: String::new(),
            },
        }
    }

    #[test]
    fn test_jpeg_info() {
        assert_eq!(jpeg_info(&tiny_jpeg()), Some((64, 32, 3)));
        assert_eq!(jpeg_info(b"\x89PNG\r\n"), None);
        assert_eq!(jpeg_info(&[0xFF, 0xD8]), None);
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Pág. • ñ"), b"P\xe1g. \x95 \xf1".to_vec());
        assert_eq!(win_ansi("≈ 漢"), b"? ?".to_vec());
    }

    #[test]
    fn test_render_pdf() {
        let doc = document(vec![
            ContentBlock::paragraph("uno"),
            ContentBlock::PageBreak,
            ContentBlock::paragraph("dos"),
        ]);
        let bytes = PdfRenderer::new().render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let parsed = PdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn test_render_embeds_jpeg() {
        let doc = document(vec![ContentBlock::Image {
            asset: "logo.jpg".into(),
            mime: "image/jpeg".into(),
            data: general_purpose::STANDARD.encode(tiny_jpeg()),
        }]);
        let bytes = PdfRenderer::new().render(&doc).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/DCTDecode"));
    }

    #[test]
    fn test_render_png_as_frame() {
        let doc = document(vec![ContentBlock::Image {
            asset: "logo.png".into(),
            mime: "image/png".into(),
            data: general_purpose::STANDARD.encode(b"\x89PNG"),
        }]);
        let bytes = PdfRenderer::new().render(&doc).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("/DCTDecode"));
    }
}
