//! Per-page glyph layer.
//!
//! A [`PageLayout`] is the page text together with the geometry of every
//! glyph, detached from MuPDF so that matching can run on any thread.

use serde::Serialize;

/// Axis-aligned rectangle in page space (points, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

impl From<mupdf::Quad> for Rect {
    fn from(quad: mupdf::Quad) -> Self {
        Rect {
            x0: quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x),
            y0: quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y),
            x1: quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x),
            y1: quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y),
        }
    }
}

impl From<Rect> for mupdf::Rect {
    fn from(rect: Rect) -> Self {
        mupdf::Rect {
            x0: rect.x0,
            y0: rect.y0,
            x1: rect.x1,
            y1: rect.y1,
        }
    }
}

/// One positioned character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy)]
struct GlyphRef {
    line: usize,
    bounds: Rect,
}

/// Text and glyph geometry of one page.
///
/// Lines are joined with `'\n'`; every other character of [`text`] maps
/// to exactly one glyph.
///
/// [`text`]: PageLayout::text
#[derive(Debug, Clone)]
pub struct PageLayout {
    page_index: usize,
    text: String,
    /// Byte offset of each char in `text`.
    offsets: Vec<usize>,
    /// Glyph for each char in `text`; `None` at line breaks.
    glyphs: Vec<Option<GlyphRef>>,
}

impl PageLayout {
    /// Builds a layout from lines of glyphs in reading order.
    pub fn from_lines(page_index: usize, lines: Vec<Vec<Glyph>>) -> Self {
        let mut text = String::new();
        let mut offsets = Vec::new();
        let mut glyphs = Vec::new();

        for (line_idx, line) in lines.into_iter().enumerate() {
            if line_idx > 0 {
                offsets.push(text.len());
                glyphs.push(None);
                text.push('\n');
            }
            for glyph in line {
                offsets.push(text.len());
                glyphs.push(Some(GlyphRef {
                    line: line_idx,
                    bounds: glyph.bounds,
                }));
                text.push(glyph.ch);
            }
        }

        Self {
            page_index,
            text,
            offsets,
            glyphs,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rectangles covering the byte range `start..end` of [`text`],
    /// one per line fragment, in reading order.
    ///
    /// [`text`]: PageLayout::text
    pub fn fragments(&self, start: usize, end: usize) -> Vec<Rect> {
        let first = self.offsets.partition_point(|&o| o < start);
        let last = self.offsets.partition_point(|&o| o < end);

        let mut fragments: Vec<(usize, Rect)> = Vec::new();
        for glyph in self.glyphs[first..last].iter().flatten() {
            match fragments.last_mut() {
                Some((line, rect)) if *line == glyph.line => *rect = rect.union(&glyph.bounds),
                _ => fragments.push((glyph.line, glyph.bounds)),
            }
        }
        fragments.into_iter().map(|(_, rect)| rect).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Lays out text on a fixed grid: 6pt per char, 12pt per line.
    pub(crate) fn grid_layout(page_index: usize, text: &str) -> PageLayout {
        let lines = text
            .split('\n')
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| Glyph {
                        ch,
                        bounds: Rect::new(
                            col as f32 * 6.0,
                            row as f32 * 12.0,
                            (col + 1) as f32 * 6.0,
                            (row + 1) as f32 * 12.0,
                        ),
                    })
                    .collect()
            })
            .collect();
        PageLayout::from_lines(page_index, lines)
    }

    #[test]
    fn test_text_joins_lines() {
        let layout = grid_layout(0, "ab\ncd");
        assert_eq!(layout.text(), "ab\ncd");
    }

    #[test]
    fn test_fragment_single_line() {
        let layout = grid_layout(0, "Hi John Doe");
        let start = layout.text().find("John").unwrap();
        let rects = layout.fragments(start, start + "John Doe".len());
        assert_eq!(rects, vec![Rect::new(18.0, 0.0, 66.0, 12.0)]);
    }

    #[test]
    fn test_fragment_across_lines() {
        let layout = grid_layout(0, "xJohn\nDoe");
        let rects = layout.fragments(1, layout.text().len());
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], Rect::new(6.0, 0.0, 30.0, 12.0));
        assert_eq!(rects[1], Rect::new(0.0, 12.0, 18.0, 24.0));
    }

    #[test]
    fn test_fragments_with_multibyte_text() {
        let layout = grid_layout(0, "Zoë Smith");
        let start = layout.text().find("Smith").unwrap();
        let rects = layout.fragments(start, start + "Smith".len());
        assert_eq!(rects, vec![Rect::new(24.0, 0.0, 54.0, 12.0)]);
    }
}
