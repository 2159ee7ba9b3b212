use crate::bits::{self, BitVector, BitVectorBuilder};

/// Palette that maps every colour onto itself.
const IDENTITY_PALETTE: u8 = 0b11_10_01_00;

/// One row of pixels as three bit planes.
///
/// A pixel's colour index is `msb * 2 + lsb`; `opacity` marks the pixels
/// that cover whatever is composed below them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LcdImageLine {
    msb: BitVector,
    lsb: BitVector,
    opacity: BitVector,
}

impl LcdImageLine {
    pub fn new(msb: BitVector, lsb: BitVector, opacity: BitVector) -> Self {
        assert!(
            msb.size() == lsb.size() && msb.size() == opacity.size(),
            "line planes must have the same size"
        );
        Self { msb, lsb, opacity }
    }

    /// Fully transparent line of colour 0.
    pub fn blank(size: usize) -> Self {
        LcdImageLineBuilder::new(size).build()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.msb.size()
    }

    #[inline]
    pub fn msb(&self) -> &BitVector {
        &self.msb
    }

    #[inline]
    pub fn lsb(&self) -> &BitVector {
        &self.lsb
    }

    #[inline]
    pub fn opacity(&self) -> &BitVector {
        &self.opacity
    }

    /// Colour index of pixel `x`.
    #[inline]
    pub fn color(&self, x: usize) -> u8 {
        (self.msb.test_bit(x) as u8) << 1 | self.lsb.test_bit(x) as u8
    }

    pub fn shift(&self, distance: i32) -> Self {
        Self::new(
            self.msb.shift(distance),
            self.lsb.shift(distance),
            self.opacity.shift(distance),
        )
    }

    pub fn extract_wrapped(&self, start: i32, size: usize) -> Self {
        Self::new(
            self.msb.extract_wrapped(start, size),
            self.lsb.extract_wrapped(start, size),
            self.opacity.extract_wrapped(start, size),
        )
    }

    /// Recolour through a palette: colour `c` becomes bits `2c..2c+2` of
    /// `palette`. Opacity is unchanged.
    pub fn map_colors(&self, palette: u8) -> Self {
        if palette == IDENTITY_PALETTE {
            return self.clone();
        }

        let (msb, lsb) = (&self.msb, &self.lsb);
        let sources = [
            msb.or(lsb).not(),
            msb.not().and(lsb),
            msb.and(&lsb.not()),
            msb.and(lsb),
        ];

        let mut new_msb = BitVector::new(self.size());
        let mut new_lsb = BitVector::new(self.size());
        for (color, pixels) in sources.iter().enumerate() {
            let target = bits::extract(palette as u32, 2 * color as u32, 2);
            if bits::test(target, 1) {
                new_msb = new_msb.or(pixels);
            }
            if bits::test(target, 0) {
                new_lsb = new_lsb.or(pixels);
            }
        }
        Self::new(new_msb, new_lsb, self.opacity.clone())
    }

    /// Compose `that` over `self`, letting it show where it is opaque.
    pub fn below(&self, that: &LcdImageLine) -> Self {
        self.below_with_opacity(&that.opacity, that)
    }

    /// Compose `that` over `self` where `opacity` is set.
    pub fn below_with_opacity(&self, opacity: &BitVector, that: &LcdImageLine) -> Self {
        assert_eq!(self.size(), that.size(), "line sizes differ");
        assert_eq!(self.size(), opacity.size(), "opacity size differs");
        let under = opacity.not();
        Self::new(
            that.msb.and(opacity).or(&self.msb.and(&under)),
            that.lsb.and(opacity).or(&self.lsb.and(&under)),
            opacity.or(&self.opacity),
        )
    }

    /// Pixels `..index` from `self`, `index..` from `that`.
    pub fn join(&self, index: usize, that: &LcdImageLine) -> Self {
        assert!(index < self.size(), "join index {index} out of range");
        assert_eq!(self.size(), that.size(), "line sizes differ");
        let right = BitVector::filled(self.size(), true).shift(index as i32);
        let left = right.not();
        let pick = |a: &BitVector, b: &BitVector| b.and(&right).or(&a.and(&left));
        Self::new(
            pick(&self.msb, &that.msb),
            pick(&self.lsb, &that.lsb),
            pick(&self.opacity, &that.opacity),
        )
    }
}

/// Builds a line eight pixels at a time; opacity is derived on `build`.
pub struct LcdImageLineBuilder {
    msb: BitVectorBuilder,
    lsb: BitVectorBuilder,
}

impl LcdImageLineBuilder {
    pub fn new(size: usize) -> Self {
        Self {
            msb: BitVectorBuilder::new(size),
            lsb: BitVectorBuilder::new(size),
        }
    }

    pub fn set_bytes(&mut self, index: usize, msb: u8, lsb: u8) -> &mut Self {
        self.msb.set_byte(index, msb);
        self.lsb.set_byte(index, lsb);
        self
    }

    /// Pixels of colour 0 come out transparent.
    pub fn build(self) -> LcdImageLine {
        let msb = self.msb.build();
        let lsb = self.lsb.build();
        let opacity = msb.or(&lsb);
        LcdImageLine::new(msb, lsb, opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 32 pixels, colours 0,1,2,3 repeating.
    fn gradient() -> LcdImageLine {
        let mut builder = LcdImageLineBuilder::new(32);
        for i in 0..4 {
            builder.set_bytes(i, 0b1100_1100, 0b1010_1010);
        }
        builder.build()
    }

    #[test]
    fn builder_derives_opacity() {
        let line = gradient();
        assert_eq!(line.size(), 32);
        assert_eq!((0..4).map(|x| line.color(x)).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(!line.opacity().test_bit(0));
        assert!(line.opacity().test_bit(1));
    }

    #[test]
    fn identity_palette_changes_nothing() {
        let line = gradient();
        assert_eq!(line.map_colors(IDENTITY_PALETTE), line);
    }

    #[test]
    fn palette_remaps_each_colour() {
        // 0 -> 3, 1 -> 2, 2 -> 1, 3 -> 0
        let mapped = gradient().map_colors(0b00_01_10_11);
        assert_eq!((0..4).map(|x| mapped.color(x)).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!(mapped.opacity(), gradient().opacity());

        let dark = gradient().map_colors(0xFF);
        assert!((0..32).all(|x| dark.color(x) == 3));
    }

    #[test]
    fn below_shows_only_opaque_pixels() {
        let mut solid = LcdImageLineBuilder::new(32);
        for i in 0..4 {
            solid.set_bytes(i, 0xFF, 0x00);
        }
        let bottom = solid.build();
        let composed = bottom.below(&gradient());
        assert_eq!((0..4).map(|x| composed.color(x)).collect::<Vec<_>>(), vec![2, 1, 2, 3]);
        assert!(composed.opacity().test_bit(0));
    }

    #[test]
    fn join_switches_source_at_index() {
        let light = LcdImageLine::blank(32);
        let joined = light.join(8, &gradient().map_colors(0xFF));
        assert!((0..8).all(|x| joined.color(x) == 0));
        assert!((8..32).all(|x| joined.color(x) == 3));
    }

    #[test]
    fn shift_and_wrap() {
        let line = gradient();
        assert_eq!(line.shift(1).color(0), 0);
        assert_eq!(line.shift(1).color(2), 1);
        let wrapped = line.extract_wrapped(-1, 64);
        assert_eq!(wrapped.size(), 64);
        assert_eq!(wrapped.color(0), 3);
        assert_eq!(wrapped.color(1), 0);
    }
}
