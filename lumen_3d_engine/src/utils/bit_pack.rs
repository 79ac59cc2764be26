//! Packed boolean arrays used for per-object visibility flags.
//!
//! A pack is one unsigned storage word holding one flag per bit. Bit `i` of a
//! pack array belongs to render object `i`. Indexing past the array panics
//! like any slice access; callers size arrays with `calculate_required`.

/// Unsigned storage word for a pack. Its bit count must be a power of two.
pub trait PackWord: Copy + Default + Eq + std::fmt::Debug {
    const BITS: u32;

    fn bit(self, cell: u32) -> bool;
    fn with_bit(self, cell: u32, value: bool) -> Self;
    fn count_ones(self) -> u32;
}

macro_rules! impl_pack_word {
    ($($t:ty),*) => {
        $(
            impl PackWord for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline]
                fn bit(self, cell: u32) -> bool {
                    (self >> cell) & 1 == 1
                }

                #[inline]
                fn with_bit(self, cell: u32, value: bool) -> Self {
                    (self & !(1 << cell)) | ((value as $t) << cell)
                }

                #[inline]
                fn count_ones(self) -> u32 {
                    <$t>::count_ones(self)
                }
            }
        )*
    };
}

impl_pack_word!(u8, u16, u32, u64);

/// Default storage word for visibility sets
pub type Pack = u32;

/// Word offset of a flat index
#[inline]
pub fn pack_index<W: PackWord>(index: u32) -> usize {
    (index >> W::BITS.trailing_zeros()) as usize
}

/// Bit offset of a flat index inside its word
#[inline]
pub fn cell_index<W: PackWord>(index: u32) -> u32 {
    index & (W::BITS - 1)
}

/// Number of packs needed to hold `value_count` flags
#[inline]
pub fn calculate_required<W: PackWord>(value_count: u32) -> usize {
    value_count.div_ceil(W::BITS) as usize
}

#[inline]
pub fn set<W: PackWord>(packs: &mut [W], index: u32, value: bool) {
    let pack = &mut packs[pack_index::<W>(index)];
    *pack = pack.with_bit(cell_index::<W>(index), value);
}

#[inline]
pub fn get<W: PackWord>(packs: &[W], index: u32) -> bool {
    packs[pack_index::<W>(index)].bit(cell_index::<W>(index))
}

/// Build one pack from up to `W::BITS` flags, missing flags are cleared
pub fn pack_from_bools<W: PackWord>(states: &[bool]) -> W {
    debug_assert!(states.len() <= W::BITS as usize);
    states
        .iter()
        .enumerate()
        .fold(W::default(), |pack, (cell, &state)| pack.with_bit(cell as u32, state))
}

/// Owned visibility set covering `len` flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitPackSet<W: PackWord = Pack> {
    packs: Vec<W>,
    len: u32,
}

impl<W: PackWord> BitPackSet<W> {
    /// Zero-initialized set of `len` flags
    pub fn with_len(len: u32) -> Self {
        Self {
            packs: vec![W::default(); calculate_required::<W>(len)],
            len,
        }
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resize to `len` flags and clear every flag
    pub fn reset(&mut self, len: u32) {
        self.packs.clear();
        self.packs.resize(calculate_required::<W>(len), W::default());
        self.len = len;
    }

    #[inline]
    pub fn get(&self, index: u32) -> bool {
        get(&self.packs, index)
    }

    #[inline]
    pub fn set(&mut self, index: u32, value: bool) {
        set(&mut self.packs, index, value)
    }

    /// Number of set flags
    pub fn count_set(&self) -> u32 {
        self.packs.iter().map(|pack| pack.count_ones()).sum()
    }

    /// Indices of set flags in ascending order
    pub fn iter_set(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).filter(move |&index| self.get(index))
    }

    pub fn packs(&self) -> &[W] {
        &self.packs
    }

    pub fn packs_mut(&mut self) -> &mut [W] {
        &mut self.packs
    }
}

#[cfg(test)]
#[path = "bit_pack_tests.rs"]
mod tests;
