//! Paged layout of content blocks.
//!
//! Blocks flow top-down onto A4 pages. Coordinates here are in points from
//! the top-left corner of the page; the PDF writer flips them.
//!
//! Text is measured with approximate Helvetica advance widths. The result is
//! slightly conservative so wrapped lines never overflow their box.

use crate::types::{Align, ContentBlock, Document, ParagraphStyle, Rgb, TableColumn};

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 56.7;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const HEADER_BAND_HEIGHT: f64 = 110.0;
const FOOTER_BASELINE: f64 = PAGE_HEIGHT - 28.0;
const BODY_BOTTOM: f64 = PAGE_HEIGHT - MARGIN - 12.0;

const TILES_PER_ROW: usize = 4;
const TILE_HEIGHT: f64 = 58.0;
const TILE_GAP: f64 = 8.0;

const CELL_PADDING: f64 = 4.0;
const TABLE_FONT_SIZE: f64 = 8.5;

const IMAGE_BOX_WIDTH: f64 = 150.0;
const IMAGE_BOX_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// One drawing instruction on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Rgb,
        text: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
    /// An image fitted inside the box, keeping its aspect ratio.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        asset: String,
        mime: String,
        /// Base64 payload, as carried by the content block.
        data: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text on the page, one entry per text op.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

fn char_width(c: char) -> f64 {
    match c {
        ' ' => 0.278,
        '0'..='9' | '$' => 0.556,
        'i' | 'j' | 'l' | 'í' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 0.24,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' => 0.34,
        'm' | 'w' | 'M' | 'W' | '%' | '@' => 0.85,
        c if c.is_uppercase() => 0.68,
        _ => 0.53,
    }
}

/// Advance width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let em: f64 = text.chars().map(char_width).sum();
    let bold = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    em * size * bold
}

/// Greedy word wrap. Words wider than the line are broken by characters.
/// Explicit newlines start a new line.
pub fn wrap_text(text: &str, max_width: f64, font: Font, size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, max_width, font, size, &mut lines);
    }
    lines
}

fn wrap_paragraph(text: &str, max_width: f64, font: Font, size: f64, lines: &mut Vec<String>) {
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font, size) > max_width {
            let mut parts = break_word(word, max_width, font, size);
            current = parts.pop().unwrap_or_default();
            lines.extend(parts);
        } else {
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}

fn break_word(word: &str, max_width: f64, font: Font, size: f64) -> Vec<String> {
    let mut parts = Vec::new();
    let mut part = String::new();
    for c in word.chars() {
        part.push(c);
        if text_width(&part, font, size) > max_width && part.chars().count() > 1 {
            part.pop();
            parts.push(std::mem::take(&mut part));
            part.push(c);
        }
    }
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}

fn aligned_x(text: &str, font: Font, size: f64, x: f64, width: f64, align: Align) -> f64 {
    match align {
        Align::Left => x,
        Align::Center => x + (width - text_width(text, font, size)) / 2.0,
        Align::Right => x + width - text_width(text, font, size),
    }
}

fn column_widths(columns: &[TableColumn]) -> Vec<f64> {
    let total: u32 = columns.iter().map(|c| u32::from(c.weight.max(1))).sum();
    columns
        .iter()
        .map(|c| CONTENT_WIDTH * f64::from(c.weight.max(1)) / f64::from(total.max(1)))
        .collect()
}

struct Tile<'a> {
    label: &'a str,
    value: &'a str,
    caption: &'a str,
}

struct Paginator<'a> {
    doc: &'a Document,
    pages: Vec<Page>,
    ops: Vec<DrawOp>,
    y: f64,
    page_top: f64,
    tiles: Vec<Tile<'a>>,
}

impl<'a> Paginator<'a> {
    fn new(doc: &'a Document) -> Self {
        let mut paginator = Self {
            doc,
            pages: Vec::new(),
            ops: Vec::new(),
            y: MARGIN,
            page_top: MARGIN,
            tiles: Vec::new(),
        };
        paginator.header_band();
        paginator
    }

    fn header_band(&mut self) {
        let doc = self.doc;
        self.ops.push(DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH,
            height: HEADER_BAND_HEIGHT,
            fill: Some(doc.header_color),
            stroke: None,
        });
        self.text(MARGIN, 48.0, 20.0, Font::Bold, Rgb::WHITE, &doc.title);
        for (i, line) in wrap_text(&doc.subtitle, CONTENT_WIDTH * 0.6, Font::Regular, 11.0)
            .iter()
            .enumerate()
        {
            self.text(
                MARGIN,
                68.0 + 13.0 * i as f64,
                11.0,
                Font::Regular,
                Rgb::WHITE,
                line,
            );
        }
        for (i, line) in doc.header_lines.iter().enumerate() {
            let x = PAGE_WIDTH - MARGIN - text_width(line, Font::Bold, 9.0);
            self.text(x, 44.0 + 14.0 * i as f64, 9.0, Font::Bold, Rgb::WHITE, line);
        }
        self.y = HEADER_BAND_HEIGHT + 24.0;
        self.page_top = self.y;
    }

    fn text(&mut self, x: f64, y: f64, size: f64, font: Font, color: Rgb, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.to_string(),
        });
    }

    fn new_page(&mut self) {
        self.pages.push(Page {
            ops: std::mem::take(&mut self.ops),
        });
        self.y = MARGIN;
        self.page_top = MARGIN;
    }

    /// Start a new page unless `height` more points fit on this one.
    fn ensure(&mut self, height: f64) {
        if self.y + height > BODY_BOTTOM && self.y > self.page_top {
            self.new_page();
        }
    }

    fn block(&mut self, block: &'a ContentBlock) {
        if let ContentBlock::MetricTile {
            label,
            value,
            caption,
        } = block
        {
            self.tiles.push(Tile {
                label,
                value,
                caption,
            });
            return;
        }
        self.flush_tiles();
        match block {
            ContentBlock::Heading { level, text } => self.heading(*level, text),
            ContentBlock::Paragraph { text, style } => self.paragraph(text, *style),
            ContentBlock::Table {
                columns,
                rows,
                footer,
                accent,
            } => self.table(columns, rows, footer.as_deref(), *accent),
            ContentBlock::Image { asset, mime, data } => {
                self.ensure(IMAGE_BOX_HEIGHT);
                self.ops.push(DrawOp::Image {
                    x: MARGIN,
                    y: self.y,
                    width: IMAGE_BOX_WIDTH,
                    height: IMAGE_BOX_HEIGHT,
                    asset: asset.clone(),
                    mime: mime.clone(),
                    data: data.clone(),
                });
                self.y += IMAGE_BOX_HEIGHT + 12.0;
            }
            ContentBlock::ImagePlaceholder { alt, .. } => self.frame(alt),
            ContentBlock::SignatureLine {
                left_label,
                right_label,
                left_caption,
                right_caption,
            } => self.signatures(
                [left_label.as_str(), right_label.as_str()],
                [left_caption.as_deref(), right_caption.as_deref()],
            ),
            ContentBlock::PageBreak => {
                if self.y > self.page_top {
                    self.new_page();
                }
            }
            ContentBlock::MetricTile { .. } => {}
        }
    }

    /// Empty labelled box where an image could not be drawn.
    fn frame(&mut self, label: &str) {
        self.ensure(IMAGE_BOX_HEIGHT);
        self.ops.push(DrawOp::Rect {
            x: MARGIN,
            y: self.y,
            width: IMAGE_BOX_WIDTH,
            height: IMAGE_BOX_HEIGHT,
            fill: None,
            stroke: Some(Rgb::SLATE_400),
        });
        let x = aligned_x(label, Font::Bold, 10.0, MARGIN, IMAGE_BOX_WIDTH, Align::Center);
        let y = self.y + IMAGE_BOX_HEIGHT / 2.0 + 3.5;
        self.text(x, y, 10.0, Font::Bold, Rgb::SLATE_400, label);
        self.y += IMAGE_BOX_HEIGHT + 12.0;
    }

    fn heading(&mut self, level: u8, text: &str) {
        let size = match level {
            0 | 1 => 16.0,
            2 => 13.0,
            _ => 11.0,
        };
        // Keep a heading with at least two lines of what follows.
        self.ensure(size + 40.0);
        self.y += 8.0;
        for line in wrap_text(text, CONTENT_WIDTH, Font::Bold, size) {
            self.y += size;
            self.text(MARGIN, self.y, size, Font::Bold, Rgb::SLATE_900, &line);
            self.y += 3.0;
        }
        if level <= 2 {
            self.y += 2.0;
            self.ops.push(DrawOp::Line {
                x1: MARGIN,
                y1: self.y,
                x2: MARGIN + 48.0,
                y2: self.y,
                width: 1.5,
                color: Rgb::INDIGO_600,
            });
        }
        self.y += 8.0;
    }

    fn paragraph(&mut self, text: &str, style: ParagraphStyle) {
        let (font, size, color) = match style {
            ParagraphStyle::Body => (Font::Regular, 9.5, Rgb::SLATE_700),
            ParagraphStyle::Emphasis => (Font::Bold, 10.0, Rgb::SLATE_900),
            ParagraphStyle::Fine => (Font::Regular, 8.0, Rgb::SLATE_700),
        };
        let leading = size * 1.35;
        for line in wrap_text(text, CONTENT_WIDTH, font, size) {
            self.ensure(leading);
            self.y += leading;
            self.text(MARGIN, self.y - (leading - size), size, font, color, &line);
        }
        self.y += 5.0;
    }

    fn flush_tiles(&mut self) {
        let tiles = std::mem::take(&mut self.tiles);
        for row in tiles.chunks(TILES_PER_ROW) {
            self.ensure(TILE_HEIGHT);
            let n = row.len() as f64;
            let width = (CONTENT_WIDTH - TILE_GAP * (n - 1.0)) / n;
            for (i, tile) in row.iter().enumerate() {
                let x = MARGIN + (width + TILE_GAP) * i as f64;
                self.tile(x, width, tile);
            }
            self.y += TILE_HEIGHT + TILE_GAP;
        }
        if !tiles.is_empty() {
            self.y += 4.0;
        }
    }

    fn tile(&mut self, x: f64, width: f64, tile: &Tile<'_>) {
        let top = self.y;
        self.ops.push(DrawOp::Rect {
            x,
            y: top,
            width,
            height: TILE_HEIGHT,
            fill: Some(Rgb::SLATE_100),
            stroke: None,
        });
        let inner = width - 2.0 * CELL_PADDING;
        let label_x = aligned_x(tile.label, Font::Bold, 7.0, x, width, Align::Center);
        self.text(label_x, top + 13.0, 7.0, Font::Bold, Rgb::SLATE_400, tile.label);
        let mut value_size = 16.0;
        while value_size > 8.0 && text_width(tile.value, Font::Bold, value_size) > inner {
            value_size -= 1.0;
        }
        let value_x = aligned_x(tile.value, Font::Bold, value_size, x, width, Align::Center);
        self.text(value_x, top + 34.0, value_size, Font::Bold, Rgb::SLATE_900, tile.value);
        for (i, line) in wrap_text(tile.caption, inner, Font::Regular, 7.0)
            .iter()
            .take(2)
            .enumerate()
        {
            let line_x = aligned_x(line, Font::Regular, 7.0, x, width, Align::Center);
            self.text(
                line_x,
                top + 45.0 + 8.0 * i as f64,
                7.0,
                Font::Regular,
                Rgb::SLATE_700,
                line,
            );
        }
    }

    fn table(
        &mut self,
        columns: &[TableColumn],
        rows: &[Vec<String>],
        footer: Option<&[String]>,
        accent: Rgb,
    ) {
        let widths = column_widths(columns);
        let headers: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();

        let header_height = self.row_height(&headers, &widths, Font::Bold);
        let first_row = rows
            .first()
            .map_or(0.0, |r| self.row_height(r, &widths, Font::Regular));
        self.ensure(header_height + first_row);
        self.table_header(columns, &headers, &widths, accent);

        for (i, row) in rows.iter().enumerate() {
            let height = self.row_height(row, &widths, Font::Regular);
            if self.y + height > BODY_BOTTOM {
                self.new_page();
                self.table_header(columns, &headers, &widths, accent);
            }
            if i % 2 == 1 {
                self.ops.push(DrawOp::Rect {
                    x: MARGIN,
                    y: self.y,
                    width: CONTENT_WIDTH,
                    height,
                    fill: Some(Rgb::SLATE_50),
                    stroke: None,
                });
            }
            self.row(columns, row, &widths, Font::Regular, Rgb::SLATE_700);
            self.y += height;
        }

        if let Some(footer) = footer {
            let height = self.row_height(footer, &widths, Font::Bold);
            if self.y + height > BODY_BOTTOM {
                self.new_page();
                self.table_header(columns, &headers, &widths, accent);
            }
            self.ops.push(DrawOp::Line {
                x1: MARGIN,
                y1: self.y,
                x2: MARGIN + CONTENT_WIDTH,
                y2: self.y,
                width: 1.0,
                color: accent,
            });
            self.row(columns, footer, &widths, Font::Bold, Rgb::SLATE_900);
            self.y += height;
        }
        self.y += 12.0;
    }

    fn table_header(
        &mut self,
        columns: &[TableColumn],
        headers: &[String],
        widths: &[f64],
        accent: Rgb,
    ) {
        let height = self.row_height(headers, widths, Font::Bold);
        self.ops.push(DrawOp::Rect {
            x: MARGIN,
            y: self.y,
            width: CONTENT_WIDTH,
            height,
            fill: Some(accent),
            stroke: None,
        });
        self.row(columns, headers, widths, Font::Bold, Rgb::WHITE);
        self.y += height;
    }

    fn row_height(&self, cells: &[String], widths: &[f64], font: Font) -> f64 {
        let lines = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| {
                wrap_text(cell, w - 2.0 * CELL_PADDING, font, TABLE_FONT_SIZE)
                    .len()
                    .max(1)
            })
            .max()
            .unwrap_or(1);
        lines as f64 * TABLE_FONT_SIZE * 1.3 + 2.0 * CELL_PADDING
    }

    fn row(
        &mut self,
        columns: &[TableColumn],
        cells: &[String],
        widths: &[f64],
        font: Font,
        color: Rgb,
    ) {
        let mut x = MARGIN;
        for ((cell, width), column) in cells.iter().zip(widths).zip(columns) {
            let inner = width - 2.0 * CELL_PADDING;
            let lines = wrap_text(cell, inner, font, TABLE_FONT_SIZE);
            for (i, line) in lines.iter().enumerate() {
                let line_x = aligned_x(
                    line,
                    font,
                    TABLE_FONT_SIZE,
                    x + CELL_PADDING,
                    inner,
                    column.align,
                );
                let baseline =
                    self.y + CELL_PADDING + TABLE_FONT_SIZE * (1.0 + 1.3 * i as f64);
                self.text(line_x, baseline, TABLE_FONT_SIZE, font, color, line);
            }
            x += width;
        }
    }

    fn signatures(&mut self, labels: [&str; 2], captions: [Option<&str>; 2]) {
        self.ensure(90.0);
        self.y += 50.0;
        let width = (CONTENT_WIDTH - 60.0) / 2.0;
        for (i, (label, caption)) in labels.iter().zip(captions).enumerate() {
            let x = MARGIN + (width + 60.0) * i as f64;
            self.ops.push(DrawOp::Line {
                x1: x,
                y1: self.y,
                x2: x + width,
                y2: self.y,
                width: 0.75,
                color: Rgb::SLATE_700,
            });
            let label_x = aligned_x(label, Font::Bold, 9.0, x, width, Align::Center);
            let y = self.y + 13.0;
            self.text(label_x, y, 9.0, Font::Bold, Rgb::SLATE_900, label);
            if let Some(caption) = caption {
                let caption_x = aligned_x(caption, Font::Regular, 8.0, x, width, Align::Center);
                let y = self.y + 25.0;
                self.text(caption_x, y, 8.0, Font::Regular, Rgb::SLATE_700, caption);
            }
        }
        self.y += 36.0;
    }

    fn finish(mut self) -> Vec<Page> {
        self.flush_tiles();
        self.pages.push(Page {
            ops: std::mem::take(&mut self.ops),
        });
        let footer = &self.doc.footer;
        let count = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            let center = footer.center_for(i + 1, count);
            page.ops.push(DrawOp::Line {
                x1: MARGIN,
                y1: FOOTER_BASELINE - 11.0,
                x2: PAGE_WIDTH - MARGIN,
                y2: FOOTER_BASELINE - 11.0,
                width: 0.5,
                color: Rgb::SLATE_400,
            });
            let entries = [
                (footer.left.as_str(), Align::Left),
                (center.as_str(), Align::Center),
                (footer.right.as_str(), Align::Right),
            ];
            for (text, align) in entries {
                if text.is_empty() {
                    continue;
                }
                page.ops.push(DrawOp::Text {
                    x: aligned_x(text, Font::Regular, 7.0, MARGIN, CONTENT_WIDTH, align),
                    y: FOOTER_BASELINE,
                    size: 7.0,
                    font: Font::Regular,
                    color: Rgb::SLATE_400,
                    text: text.to_string(),
                });
            }
        }
        self.pages
    }
}

/// Lay a document out onto pages, footers included.
pub fn paginate(doc: &Document) -> Vec<Page> {
    let mut paginator = Paginator::new(doc);
    for block in &doc.blocks {
        paginator.block(block);
    }
    let pages = paginator.finish();
    tracing::debug!(pages = pages.len(), file = %doc.file_name, "document laid out");
    pages
}
