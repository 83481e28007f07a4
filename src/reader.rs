//! Positioned text of the timetable page.
//!
//! Walks the first page's content stream with a small text-state machine and
//! emits one [`Fragment`] per shown glyph, located at the glyph origin in
//! user space. Only the origin of the first glyph of each cell matters to
//! the parser, so glyph advances are approximated from the font size.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Encoding, Object};
use thiserror::Error;
use tracing::{debug, warn};

use crate::parser::cells::Fragment;

/// Average glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f64 = 0.5;

const TIMETABLE_PAGE: u32 = 1;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to load pdf: {0}")]
    Load(#[source] lopdf::Error),
    #[error("page {0} not found")]
    PageNotFound(u32),
    #[error("failed to decode page content: {0}")]
    Content(#[source] lopdf::Error),
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Fragment>, ReadError> {
    let doc = Document::load(path).map_err(ReadError::Load)?;
    read_document(&doc)
}

pub fn read_bytes(bytes: &[u8]) -> Result<Vec<Fragment>, ReadError> {
    let doc = Document::load_mem(bytes).map_err(ReadError::Load)?;
    read_document(&doc)
}

fn read_document(doc: &Document) -> Result<Vec<Fragment>, ReadError> {
    let page_id = *doc
        .get_pages()
        .get(&TIMETABLE_PAGE)
        .ok_or(ReadError::PageNotFound(TIMETABLE_PAGE))?;
    let raw = doc.get_page_content(page_id).map_err(ReadError::Content)?;
    let content = Content::decode(&raw).map_err(ReadError::Content)?;

    let mut encodings = BTreeMap::new();
    match doc.get_page_fonts(page_id) {
        Ok(fonts) => {
            for (name, font) in fonts {
                match font.get_font_encoding(doc) {
                    Ok(encoding) => {
                        encodings.insert(name, encoding);
                    }
                    Err(e) => warn!(font = %String::from_utf8_lossy(&name), "no encoding: {}", e),
                }
            }
        }
        Err(e) => warn!("page fonts unavailable: {}", e),
    }

    let fragments = walk(&content.operations, &encodings);
    debug!(operations = content.operations.len(), fragments = fragments.len(), "read page");
    Ok(fragments)
}

/// 2x3 affine matrix `[a, b, c, d, e, f]`.
type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` applied first, then `n`.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horiz_scale: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font: Vec::new(),
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horiz_scale: 1.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Glyph origin in user space.
    fn origin(&self) -> (f64, f64) {
        let m = multiply(&self.text_matrix, &self.ctm);
        (m[4], m[5])
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn advance(&mut self, dx: f64) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, dx, 0.0], &self.text_matrix);
    }

    fn glyph_advance(&self, ch: char) -> f64 {
        let mut dx = self.font_size * APPROX_CHAR_WIDTH_RATIO + self.char_spacing;
        if ch == ' ' {
            dx += self.word_spacing;
        }
        dx * self.horiz_scale
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    (operands.len() >= N).then_some(out)
}

fn walk(operations: &[Operation], encodings: &BTreeMap<Vec<u8>, Encoding>) -> Vec<Fragment> {
    let mut state = TextState::default();
    let mut saved: Vec<Matrix> = Vec::new();
    let mut fragments = Vec::new();

    for op in operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => saved.push(state.ctm),
            "Q" => {
                if let Some(ctm) = saved.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let [Object::Name(name), size, ..] = operands {
                    state.font = name.clone();
                    state.font_size = number(size).unwrap_or(0.0);
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some([v]) = numbers::<1>(operands) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some([v]) = numbers::<1>(operands) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some([v]) = numbers::<1>(operands) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some([v]) = numbers::<1>(operands) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Tj" => {
                if let Some(text) = operands.first() {
                    show(text, &mut state, encodings, &mut fragments);
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = operands.first() {
                    show(text, &mut state, encodings, &mut fragments);
                }
            }
            "\"" => {
                if let [aw, ac, text, ..] = operands {
                    state.word_spacing = number(aw).unwrap_or(state.word_spacing);
                    state.char_spacing = number(ac).unwrap_or(state.char_spacing);
                    state.next_line();
                    show(text, &mut state, encodings, &mut fragments);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match number(item) {
                            // Kerning, in thousandths of text space.
                            Some(adjust) => {
                                state.advance(-adjust / 1000.0 * state.font_size * state.horiz_scale)
                            }
                            None => show(item, &mut state, encodings, &mut fragments),
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fragments
}

fn show(
    text: &Object,
    state: &mut TextState,
    encodings: &BTreeMap<Vec<u8>, Encoding>,
    fragments: &mut Vec<Fragment>,
) {
    let Object::String(bytes, _) = text else {
        return;
    };
    let decoded = match encodings.get(&state.font) {
        Some(encoding) => Document::decode_text(encoding, bytes).unwrap_or_else(|e| {
            warn!("undecodable string: {}", e);
            String::new()
        }),
        None => String::from_utf8_lossy(bytes).into_owned(),
    };

    for ch in decoded.chars() {
        let (x, y) = state.origin();
        fragments.push(Fragment::new(ch.to_string(), x, y));
        state.advance(state.glyph_advance(ch));
    }
}

/// One-page document showing each `(x, y, text)` run at its position.
/// Without `font` the page carries no font resources.
#[cfg(test)]
pub(crate) fn sample_pdf(font: bool, runs: &[(i64, i64, &str)]) -> Vec<u8> {
    use lopdf::{dictionary, Dictionary, Stream, StringFormat};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut resources = Dictionary::new();
    if font {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        resources.set("Font", dictionary! { "F1" => font_id });
    }

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(10)]),
    ];
    for &(x, y, text) in runs {
        let matrix = [1, 0, 0, 1, x, y].map(Object::Integer).to_vec();
        operations.push(Operation::new("Tm", matrix));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => [0, 0, 842, 595].map(Object::Integer).to_vec(),
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    };
    save_with_pages(doc, pages_id, pages)
}

/// Document whose page tree is empty.
#[cfg(test)]
pub(crate) fn empty_pdf() -> Vec<u8> {
    use lopdf::dictionary;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => Object::Integer(0),
    };
    save_with_pages(doc, pages_id, pages)
}

#[cfg(test)]
fn save_with_pages(
    mut doc: Document,
    pages_id: lopdf::ObjectId,
    pages: lopdf::Dictionary,
) -> Vec<u8> {
    use lopdf::dictionary;

    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
