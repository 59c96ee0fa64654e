//! DYMO label document builder
//!
//! Renders the fixed 30252 Address die-cut template with two variable
//! fields: the SKU (Code128A barcode payload) and the label type (text).
//! Layout, fonts and colors never change between labels.

use std::fmt;

use tracing::instrument;

/// Serialized DieCutLabel XML for one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument {
    xml: String,
}

impl LabelDocument {
    /// Build the document for a (label type, SKU) pair.
    ///
    /// Inputs are not validated here. They are XML-escaped, so a value can
    /// never change the document structure.
    #[instrument(level = "trace")]
    pub fn build(label_type: &str, sku: &str) -> Self {
        let mut w = XmlWriter::new();
        AddressLabel { label_type, sku }.write(&mut w);
        Self { xml: w.finish() }
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn len(&self) -> usize {
        self.xml.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xml.is_empty()
    }

    pub fn into_string(self) -> String {
        self.xml
    }
}

impl fmt::Display for LabelDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}

/// Object placement in twips
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

const BARCODE_BOUNDS: Bounds = Bounds {
    x: 331.2,
    y: 680.3149,
    width: 4440.473,
    height: 765.7087,
};

const TEXT_BOUNDS: Bounds = Bounds {
    x: 331.0,
    y: 163.0,
    width: 4442.0,
    height: 341.5669,
};

/// The one template this tool prints
struct AddressLabel<'a> {
    label_type: &'a str,
    sku: &'a str,
}

impl AddressLabel<'_> {
    fn write(&self, w: &mut XmlWriter) {
        w.declaration();
        w.open(
            "DieCutLabel",
            &[("Version", "8.0"), ("Units", "twips"), ("MediaType", "Default")],
        );
        w.element("PaperOrientation", "Landscape");
        w.element("Id", "Address");
        w.element("PaperName", "30252 Address");

        w.open("DrawCommands", &[]);
        w.empty(
            "RoundRectangle",
            &[
                ("X", "0"),
                ("Y", "0"),
                ("Width", "1581"),
                ("Height", "5040"),
                ("Rx", "270"),
                ("Ry", "270"),
            ],
        );
        w.close("DrawCommands");

        w.open("ObjectInfo", &[]);
        self.write_barcode(w);
        w.bounds(BARCODE_BOUNDS);
        w.close("ObjectInfo");

        w.open("ObjectInfo", &[]);
        self.write_text(w);
        w.bounds(TEXT_BOUNDS);
        w.close("ObjectInfo");

        w.close("DieCutLabel");
    }

    fn write_barcode(&self, w: &mut XmlWriter) {
        w.open("BarcodeObject", &[]);
        w.element("Name", "Barcode");
        w.object_header();
        w.element("Text", self.sku);
        w.element("Type", "Code128A");
        w.element("Size", "Small");
        w.element("TextPosition", "Bottom");
        w.font("TextFont", "9");
        w.font("CheckSumFont", "7.3125");
        w.element("TextEmbedding", "None");
        w.element("ECLevel", "0");
        w.element("HorizontalAlignment", "Center");
        w.empty(
            "QuietZonesPadding",
            &[("Left", "0"), ("Right", "0"), ("Top", "0"), ("Bottom", "0")],
        );
        w.close("BarcodeObject");
    }

    fn write_text(&self, w: &mut XmlWriter) {
        w.open("TextObject", &[]);
        w.element("Name", "Text");
        w.object_header();
        w.element("HorizontalAlignment", "Center");
        w.element("VerticalAlignment", "Top");
        w.element("TextFitMode", "ShrinkToFit");
        w.element("UseFullFontHeight", "True");
        w.element("Verticalized", "False");
        w.open("StyledText", &[]);
        w.open("Element", &[]);
        w.element("String", self.label_type);
        w.open("Attributes", &[]);
        w.font("Font", "12");
        w.fore_color();
        w.close("Attributes");
        w.close("Element");
        w.close("StyledText");
        w.close("TextObject");
    }
}

/// Line-per-element XML writer with two-space indentation
struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
            depth: 0,
        }
    }

    fn declaration(&mut self) {
        self.line(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        let start = format!("<{}{}>", tag, attributes(attrs));
        self.line(&start);
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{}>", tag));
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.line(&format!("<{}{}/>", tag, attributes(attrs)));
    }

    /// `<tag>text</tag>`, written out in full even when `text` is empty
    fn element(&mut self, tag: &str, text: &str) {
        self.line(&format!("<{tag}>{}</{tag}>", escape(text)));
    }

    fn bounds(&mut self, b: Bounds) {
        let (x, y, width, height) = (
            b.x.to_string(),
            b.y.to_string(),
            b.width.to_string(),
            b.height.to_string(),
        );
        self.empty(
            "Bounds",
            &[
                ("X", x.as_str()),
                ("Y", y.as_str()),
                ("Width", width.as_str()),
                ("Height", height.as_str()),
            ],
        );
    }

    fn font(&mut self, tag: &str, size: &str) {
        self.empty(
            tag,
            &[
                ("Family", "Arial"),
                ("Size", size),
                ("Bold", "False"),
                ("Italic", "False"),
                ("Underline", "False"),
                ("Strikeout", "False"),
            ],
        );
    }

    fn fore_color(&mut self) {
        self.empty(
            "ForeColor",
            &[("Alpha", "255"), ("Red", "0"), ("Green", "0"), ("Blue", "0")],
        );
    }

    /// Colors and flags shared by every object on the label
    fn object_header(&mut self) {
        self.fore_color();
        self.empty(
            "BackColor",
            &[("Alpha", "0"), ("Red", "255"), ("Green", "255"), ("Blue", "255")],
        );
        self.element("LinkedObjectName", "");
        self.element("Rotation", "Rotation0");
        self.element("IsMirrored", "False");
        self.element("IsVariable", "True");
    }

    fn line(&mut self, content: &str) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
        self.buf.push_str(content);
        self.buf.push('\n');
    }

    fn finish(mut self) -> String {
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
        self.buf
    }
}

fn attributes(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape(value)))
        .collect()
}

/// Escape the five XML special characters
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
