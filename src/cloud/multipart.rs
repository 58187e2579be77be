//! Partitioning of a payload into multipart upload parts.
//!
//! Parts are numbered from 0 in increasing offset order. Every full part is
//! exactly `block_size` bytes; when the payload does not divide evenly a
//! trailing remainder part follows with number `full_parts`.

use std::ops::Range;

use crate::cloud::error::{Result, UploadError};

/// Part boundaries for one payload, computed once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlan {
    content_len: u64,
    block_size: u64,
    full_parts: usize,
}

impl PartPlan {
    /// Plan the parts of a payload of `content_len` bytes.
    ///
    /// Fails when the block size is zero, since no part could ever be sent.
    pub fn new(content_len: u64, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(UploadError::InvalidSession {
                reason: "block size must be greater than zero".to_string(),
            });
        }

        Ok(PartPlan {
            content_len,
            block_size,
            full_parts: (content_len / block_size) as usize,
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Number of parts of exactly `block_size` bytes
    pub fn full_parts(&self) -> usize {
        self.full_parts
    }

    /// Byte range of full part `index`
    pub fn full_part_range(&self, index: usize) -> Range<usize> {
        let start = index as u64 * self.block_size;
        start as usize..(start + self.block_size) as usize
    }

    /// Part number and byte range of the trailing short part, if any
    pub fn remainder(&self) -> Option<(usize, Range<usize>)> {
        let covered = self.full_parts as u64 * self.block_size;
        if covered < self.content_len {
            Some((self.full_parts, covered as usize..self.content_len as usize))
        } else {
            None
        }
    }

    pub fn total_parts(&self) -> usize {
        self.full_parts + usize::from(self.remainder().is_some())
    }
}

/// Join the ETags of all parts in part-number order.
///
/// `slots` is indexed by part number. Returns the first missing part number
/// if any slot is still empty.
pub fn join_etags(slots: &[Option<String>]) -> std::result::Result<String, usize> {
    let mut tags = Vec::with_capacity(slots.len());
    for (part_number, slot) in slots.iter().enumerate() {
        match slot {
            Some(tag) => tags.push(tag.as_str()),
            None => return Err(part_number),
        }
    }
    Ok(tags.join(","))
}
