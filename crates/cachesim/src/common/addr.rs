//! Address decomposition.
//!
//! A 32-bit address is split, most significant bits first, into
//! `| tag | index | offset |`. The index selects a set, the tag identifies
//! the block inside that set and the offset is only ever reported for
//! diagnostics, since no data is stored.

use crate::common::error::ConfigError;

/// Width of every simulated address.
pub const ADDRESS_BITS: u32 = 32;

/// Bit-field layout of an address for one cache geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    tag_bits: u32,
    index_bits: u32,
    offset_bits: u32,
}

/// The three fields of one decoded address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddress {
    /// Upper bits, compared against block tags.
    pub tag: u32,
    /// Set selector.
    pub index: usize,
    /// Byte position inside the block.
    pub offset: u32,
}

impl AddressLayout {
    /// Builds a layout from the index and offset widths; the tag takes the
    /// remaining bits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AddressWidth`] when `index_bits + offset_bits`
    /// exceeds [`ADDRESS_BITS`].
    pub fn new(index_bits: u32, offset_bits: u32) -> Result<Self, ConfigError> {
        let used = index_bits
            .checked_add(offset_bits)
            .filter(|&used| used <= ADDRESS_BITS);
        let Some(used) = used else {
            return Err(ConfigError::AddressWidth {
                tag_bits: 0,
                index_bits,
                offset_bits,
                address_bits: ADDRESS_BITS,
            });
        };

        let layout = Self {
            tag_bits: ADDRESS_BITS - used,
            index_bits,
            offset_bits,
        };
        debug_assert_eq!(
            layout.tag_bits + layout.index_bits + layout.offset_bits,
            ADDRESS_BITS
        );
        Ok(layout)
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Splits `addr` into tag, index and offset. Total over all inputs.
    #[inline]
    pub fn decode(&self, addr: u32) -> DecodedAddress {
        // Widen so that shifts by the full 32 bits stay defined.
        let wide = u64::from(addr);
        let offset = wide & low_mask(self.offset_bits);
        let index = (wide >> self.offset_bits) & low_mask(self.index_bits);
        let tag = wide >> (self.offset_bits + self.index_bits);

        DecodedAddress {
            tag: tag as u32,
            index: index as usize,
            offset: offset as u32,
        }
    }

    /// Renders `addr` as 32 binary digits grouped `tag index offset`.
    ///
    /// Empty fields produce no digits, so a cache with a single set prints
    /// `tag  offset` with two separating spaces.
    pub fn format_binary(&self, addr: u32) -> String {
        let bits = format!("{addr:032b}");
        let (tag, rest) = bits.split_at(self.tag_bits as usize);
        let (index, offset) = rest.split_at(self.index_bits as usize);

        format!("{tag} {index} {offset}")
    }
}

#[inline(always)]
fn low_mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}
