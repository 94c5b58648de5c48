use std::collections::HashMap;

use crate::container::block;

/// The external block byte streams of a slice, keyed by content id.
pub struct ExternalDataReaders<'de> {
    readers: HashMap<block::ContentId, &'de [u8]>,
}

impl<'de> ExternalDataReaders<'de> {
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: block::ContentId, reader: &'de [u8]) {
        self.readers.insert(id, reader);
    }

    pub fn get_mut(&mut self, id: &block::ContentId) -> Option<&mut &'de [u8]> {
        self.readers.get_mut(id)
    }
}

impl Default for ExternalDataReaders<'_> {
    fn default() -> Self {
        Self::new()
    }
}
