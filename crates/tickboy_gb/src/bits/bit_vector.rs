use std::fmt;

const WORD: usize = u32::BITS as usize;

/// Immutable bit sequence whose length is a positive multiple of 32.
///
/// Bit 0 is the least significant bit of the first word. Extractions take a
/// start index that may be negative or past the end; bits outside the vector
/// either read as zero or wrap around modulo the vector length.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u32>,
}

#[derive(Clone, Copy)]
enum Fill {
    Zero,
    Wrap,
}

fn check_size(size: usize) {
    assert!(
        size > 0 && size % WORD == 0,
        "bit vector size {size} must be a positive multiple of 32"
    );
}

impl BitVector {
    pub fn new(size: usize) -> Self {
        Self::filled(size, false)
    }

    pub fn filled(size: usize, value: bool) -> Self {
        check_size(size);
        let word = if value { u32::MAX } else { 0 };
        Self {
            words: vec![word; size / WORD],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.words.len() * WORD
    }

    pub fn test_bit(&self, index: usize) -> bool {
        assert!(index < self.size(), "bit {index} out of range");
        self.words[index / WORD] & (1 << (index % WORD)) != 0
    }

    pub fn not(&self) -> Self {
        Self {
            words: self.words.iter().map(|w| !w).collect(),
        }
    }

    pub fn and(&self, that: &BitVector) -> Self {
        self.zip_with(that, |a, b| a & b)
    }

    pub fn or(&self, that: &BitVector) -> Self {
        self.zip_with(that, |a, b| a | b)
    }

    fn zip_with(&self, that: &BitVector, op: impl Fn(u32, u32) -> u32) -> Self {
        assert_eq!(
            self.size(),
            that.size(),
            "bit vector sizes differ"
        );
        Self {
            words: self
                .words
                .iter()
                .zip(&that.words)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }

    /// `size` bits starting at `start`; bits outside this vector read as 0.
    pub fn extract_zero_extended(&self, start: i32, size: usize) -> Self {
        self.extract(start, size, Fill::Zero)
    }

    /// `size` bits starting at `start`, reading this vector as if it
    /// repeated forever in both directions.
    pub fn extract_wrapped(&self, start: i32, size: usize) -> Self {
        self.extract(start, size, Fill::Wrap)
    }

    /// Same-length shift; positive `distance` moves bits towards higher
    /// indices.
    pub fn shift(&self, distance: i32) -> Self {
        self.extract_zero_extended(-distance, self.size())
    }

    fn extract(&self, start: i32, size: usize, fill: Fill) -> Self {
        check_size(size);
        let first = start.div_euclid(WORD as i32);
        let offset = start.rem_euclid(WORD as i32) as u32;
        let words = (0..(size / WORD) as i32)
            .map(|i| {
                let low = self.word_at(first + i, fill);
                if offset == 0 {
                    low
                } else {
                    let high = self.word_at(first + i + 1, fill);
                    (low >> offset) | (high << (u32::BITS - offset))
                }
            })
            .collect();
        Self { words }
    }

    fn word_at(&self, index: i32, fill: Fill) -> u32 {
        let len = self.words.len() as i32;
        if (0..len).contains(&index) {
            self.words[index as usize]
        } else {
            match fill {
                Fill::Zero => 0,
                Fill::Wrap => self.words[index.rem_euclid(len) as usize],
            }
        }
    }

    pub fn to_hex_string(&self) -> String {
        self.words.iter().rev().map(|w| format!("{w:08x}")).collect()
    }
}

/// Binary rendering, most significant bit first.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.words.iter().rev() {
            write!(f, "{w:032b}")?;
        }
        Ok(())
    }
}

/// Assembles a [`BitVector`] one byte at a time.
///
/// Byte `i` covers bits `8 * i .. 8 * i + 8`.
pub struct BitVectorBuilder {
    words: Vec<u32>,
}

impl BitVectorBuilder {
    pub fn new(size: usize) -> Self {
        check_size(size);
        Self {
            words: vec![0; size / WORD],
        }
    }

    pub fn set_byte(&mut self, index: usize, value: u8) -> &mut Self {
        assert!(index < self.words.len() * 4, "byte {index} out of range");
        let shift = 8 * (index % 4);
        let word = &mut self.words[index / 4];
        *word = (*word & !(0xFF << shift)) | ((value as u32) << shift);
        self
    }

    pub fn build(self) -> BitVector {
        BitVector { words: self.words }
    }
}
