use serde::{Deserialize, Serialize};

/// An RGB color used as an accent by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const SLATE_50: Rgb = Rgb(248, 250, 252);
    pub const SLATE_100: Rgb = Rgb(241, 245, 249);
    pub const SLATE_900: Rgb = Rgb(15, 23, 42);
    pub const SLATE_700: Rgb = Rgb(51, 65, 85);
    pub const SLATE_400: Rgb = Rgb(148, 163, 184);
    pub const INDIGO_600: Rgb = Rgb(79, 70, 229);
    pub const ORANGE_500: Rgb = Rgb(249, 115, 22);
    pub const EMERALD_500: Rgb = Rgb(16, 185, 129);
    pub const CYAN_600: Rgb = Rgb(8, 145, 178);
    pub const CYAN_700: Rgb = Rgb(14, 116, 144);
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub header: String,
    pub align: Align,
    /// Relative width; the renderer distributes the page width by weight.
    pub weight: u8,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, align: Align, weight: u8) -> Self {
        Self {
            header: header.into(),
            align,
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParagraphStyle {
    #[default]
    Body,
    /// Bold lead-in text (summary boxes, totals).
    Emphasis,
    /// Small print.
    Fine,
}

/// A renderer-agnostic unit of document output.
///
/// All values are pre-formatted display strings; no raw numbers reach the
/// renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
        style: ParagraphStyle,
    },
    Table {
        columns: Vec<TableColumn>,
        rows: Vec<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<Vec<String>>,
        accent: Rgb,
    },
    MetricTile {
        label: String,
        value: String,
        caption: String,
    },
    Image {
        asset: String,
        mime: String,
        /// Base64 payload.
        data: String,
    },
    /// Stand-in for an asset that could not be loaded.
    ImagePlaceholder {
        asset: String,
        alt: String,
    },
    SignatureLine {
        left_label: String,
        right_label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        left_caption: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        right_caption: Option<String>,
    },
    PageBreak,
}

impl ContentBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            text: text.into(),
            style: ParagraphStyle::Body,
        }
    }

    pub fn styled(text: impl Into<String>, style: ParagraphStyle) -> Self {
        Self::Paragraph {
            text: text.into(),
            style,
        }
    }
}

/// Text stamped at the bottom of every page.
///
/// `center` may contain `{page}` and `{pages}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningFooter {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl RunningFooter {
    /// Center text with the page placeholders filled in.
    pub fn center_for(&self, page: usize, pages: usize) -> String {
        self.center
            .replace("{page}", &page.to_string())
            .replace("{pages}", &pages.to_string())
    }
}

/// A projected document: blocks plus page furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub subtitle: String,
    /// Short lines printed at the right of the first-page header band.
    pub header_lines: Vec<String>,
    pub file_name: String,
    /// Band color of the first-page header.
    pub header_color: Rgb,
    pub blocks: Vec<ContentBlock>,
    pub footer: RunningFooter,
}
