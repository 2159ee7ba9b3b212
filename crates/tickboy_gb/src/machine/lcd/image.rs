use super::line::LcdImageLine;

/// A complete frame: `height` lines of `width` pixels each.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LcdImage {
    width: usize,
    height: usize,
    lines: Vec<LcdImageLine>,
}

impl LcdImage {
    pub fn new(width: usize, height: usize, lines: Vec<LcdImageLine>) -> Self {
        assert_eq!(lines.len(), height, "image needs one line per row");
        assert!(
            lines.iter().all(|l| l.size() == width),
            "every line must be {width} pixels wide"
        );
        Self {
            width,
            height,
            lines,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn lines(&self) -> &[LcdImageLine] {
        &self.lines
    }

    /// Colour index (0..=3) of the pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        self.lines[y].color(x)
    }
}

pub struct LcdImageBuilder {
    width: usize,
    lines: Vec<LcdImageLine>,
}

impl LcdImageBuilder {
    /// Starts out blank.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            lines: vec![LcdImageLine::blank(width); height],
        }
    }

    pub fn set_line(&mut self, y: usize, line: LcdImageLine) -> &mut Self {
        assert!(y < self.lines.len(), "line {y} out of range");
        assert_eq!(line.size(), self.width, "line width differs from the image");
        self.lines[y] = line;
        self
    }

    pub fn build(self) -> LcdImage {
        let height = self.lines.len();
        LcdImage::new(self.width, height, self.lines)
    }
}
