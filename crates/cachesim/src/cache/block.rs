//! Block metadata and sets.

use crate::common::error::InvariantViolation;

/// Metadata of one way. No data payload is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
}

impl Block {
    #[inline]
    pub fn matches(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }
}

/// The `associativity` blocks selected by one index.
#[derive(Clone, Debug)]
pub struct CacheSet {
    blocks: Box<[Block]>,
}

impl CacheSet {
    /// A set of `ways` invalid, clean blocks.
    pub fn new(ways: usize) -> Self {
        Self {
            blocks: vec![Block::default(); ways].into_boxed_slice(),
        }
    }

    /// Way holding `tag`, if any.
    #[inline]
    pub fn find(&self, tag: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.matches(tag))
    }

    pub fn block(&self, way: usize) -> &Block {
        &self.blocks[way]
    }

    pub fn block_mut(&mut self, way: usize) -> &mut Block {
        &mut self.blocks[way]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Checks that no tag is live in two ways. `index` only labels the error.
    pub fn check_unique_tags(&self, index: usize) -> Result<(), InvariantViolation> {
        for (first_way, first) in self.blocks.iter().enumerate() {
            if !first.valid {
                continue;
            }
            let duplicate = self.blocks[first_way + 1..]
                .iter()
                .position(|b| b.matches(first.tag));
            if let Some(offset) = duplicate {
                return Err(InvariantViolation {
                    set: index,
                    tag: first.tag,
                    first_way,
                    second_way: first_way + 1 + offset,
                });
            }
        }
        Ok(())
    }
}
