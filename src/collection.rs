//! Ordered, user-editable set of share-input boxes
//!
//! Each box holds a raw text blob that may contain zero, one or several blank-line
//! separated shares. Box order is display order: it drives the numbering shown to the
//! user and the box-level attribution of engine failures.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace};

use crate::parse::parse_shares;

/// The collection never holds fewer boxes than this
pub const MIN_BOXES: usize = 2;

/// Opaque identifier of a share box
///
/// Identifiers are allocated monotonically and never reused by a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box-{}", self.0)
    }
}

/// One input slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareBox {
    id: BoxId,
    raw_text: String,
}

impl ShareBox {
    #[must_use]
    pub fn id(&self) -> BoxId {
        self.id
    }

    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Shares currently parsed out of this box
    #[must_use]
    pub fn shares(&self) -> Vec<String> {
        parse_shares(&self.raw_text)
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// Share boxes plus their transient invalid and flash flags
#[derive(Debug, Clone)]
pub struct ShareCollection {
    boxes: Vec<ShareBox>,
    invalid: HashSet<BoxId>,
    flash: HashSet<BoxId>,
    next_id: u64,
}

impl Default for ShareCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareCollection {
    /// Creates a collection holding two empty boxes
    #[must_use]
    pub fn new() -> Self {
        let mut collection = Self {
            boxes: Vec::with_capacity(MIN_BOXES),
            invalid: HashSet::new(),
            flash: HashSet::new(),
            next_id: 0,
        };
        for _ in 0..MIN_BOXES {
            collection.push_empty();
        }
        collection
    }

    fn push_empty(&mut self) -> BoxId {
        let id = BoxId(self.next_id);
        self.next_id += 1;
        self.boxes.push(ShareBox {
            id,
            raw_text: String::new(),
        });
        id
    }

    #[must_use]
    pub fn boxes(&self) -> &[ShareBox] {
        &self.boxes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Always `false`; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&ShareBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// 1-based display number of a box
    #[must_use]
    pub fn position(&self, id: BoxId) -> Option<usize> {
        self.boxes.iter().position(|b| b.id == id).map(|i| i + 1)
    }

    /// Replaces the text of a box
    ///
    /// Non-blank text clears the invalid flag of this box only. Returns `false` if the
    /// box no longer exists.
    pub fn set_box_text(&mut self, id: BoxId, text: impl Into<String>) -> bool {
        let Some(share_box) = self.boxes.iter_mut().find(|b| b.id == id) else {
            trace!(%id, "ignoring edit of removed box");
            return false;
        };
        share_box.raw_text = text.into();
        if !share_box.is_blank() {
            self.invalid.remove(&id);
        }
        true
    }

    /// Appends one empty box
    pub fn add_box(&mut self) -> BoxId {
        self.push_empty()
    }

    /// Removes a box unless that would leave fewer than two
    ///
    /// Returns whether the box was removed.
    pub fn remove_box(&mut self, id: BoxId) -> bool {
        if self.boxes.len() <= MIN_BOXES {
            return false;
        }
        let Some(index) = self.boxes.iter().position(|b| b.id == id) else {
            return false;
        };
        self.boxes.remove(index);
        self.invalid.remove(&id);
        self.flash.remove(&id);
        true
    }

    /// Appends empty boxes until there are `target` of them
    ///
    /// Never shrinks the collection. New boxes are flagged for a transient highlight
    /// when `flash` is set. Returns the ids of the boxes added.
    pub fn grow_to(&mut self, target: usize, flash: bool) -> Vec<BoxId> {
        let current = self.boxes.len();
        if target <= current {
            return Vec::new();
        }
        let added: Vec<BoxId> = (current..target).map(|_| self.push_empty()).collect();
        if flash {
            self.flash.extend(added.iter().copied());
        }
        debug!(from = current, to = target, flash, "grew share boxes");
        added
    }

    /// Every share across all boxes, in box order
    #[must_use]
    pub fn flatten_shares(&self) -> Vec<String> {
        self.boxes.iter().flat_map(ShareBox::shares).collect()
    }

    /// First box whose text is not blank
    #[must_use]
    pub fn first_non_empty(&self) -> Option<&ShareBox> {
        self.boxes.iter().find(|b| !b.is_blank())
    }

    /// Flags the first `n` boxes, in display order, that yield no shares
    ///
    /// Flags every such box if fewer than `n` exist. Returns the flagged ids.
    pub fn mark_invalid_by_count(&mut self, n: usize) -> Vec<BoxId> {
        let marked: Vec<BoxId> = self
            .boxes
            .iter()
            .filter(|b| b.shares().is_empty())
            .take(n)
            .map(|b| b.id)
            .collect();
        self.invalid.extend(marked.iter().copied());
        debug!(requested = n, marked = marked.len(), "flagged empty share boxes");
        marked
    }

    pub fn clear_invalid(&mut self) {
        self.invalid.clear();
    }

    /// Ends the transient highlight of newly added boxes
    pub fn clear_flash(&mut self) {
        self.flash.clear();
    }

    #[must_use]
    pub fn is_invalid(&self, id: BoxId) -> bool {
        self.invalid.contains(&id)
    }

    #[must_use]
    pub fn is_flashing(&self, id: BoxId) -> bool {
        self.flash.contains(&id)
    }

    /// Ids currently flagged invalid, in display order
    #[must_use]
    pub fn invalid_ids(&self) -> Vec<BoxId> {
        self.boxes
            .iter()
            .map(|b| b.id)
            .filter(|id| self.invalid.contains(id))
            .collect()
    }

    /// Places imported text (file import, QR scan) into the first blank box
    ///
    /// A new box is appended when every box already holds text.
    pub fn append_text(&mut self, text: &str) -> BoxId {
        let text = text.trim();
        let id = match self.boxes.iter().find(|b| b.is_blank()) {
            Some(share_box) => share_box.id,
            None => self.push_empty(),
        };
        self.set_box_text(id, text);
        id
    }
}
