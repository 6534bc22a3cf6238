//! Fixed-capacity pattern store indexed by [`PatternAddress`].

use alloc::vec::Vec;

use crate::address::{PatternAddress, MEMORY_SIZE};
use crate::instrument::Instrument;
use crate::pattern::PatternRecord;

/// The 384-record pattern memory.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternMemory {
    records: Vec<PatternRecord>,
}

impl Default for PatternMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMemory {
    /// Memory with every record at its defaults.
    pub fn new() -> Self {
        Self {
            records: alloc::vec![PatternRecord::default(); MEMORY_SIZE],
        }
    }

    pub fn read(&self, address: PatternAddress) -> &PatternRecord {
        &self.records[address.index()]
    }

    /// Mutate one record in place.
    pub fn write<R>(&mut self, address: PatternAddress, mutator: impl FnOnce(&mut PatternRecord) -> R) -> R {
        mutator(&mut self.records[address.index()])
    }

    /// Reset one record's steps and timing attributes.
    pub fn clear_pattern(&mut self, address: PatternAddress) {
        self.records[address.index()].clear();
    }

    /// Zero one instrument's sequence on one record.
    pub fn clear_instrument(&mut self, address: PatternAddress, instrument: Instrument) {
        self.records[address.index()].clear_instrument(instrument);
    }

    /// Deep copy of a record.
    pub fn copy_record(&self, address: PatternAddress) -> PatternRecord {
        self.records[address.index()].clone()
    }

    /// Overwrite a record with a copy of `record`.
    pub fn paste_record(&mut self, address: PatternAddress, record: &PatternRecord) {
        self.records[address.index()].clone_from(record);
    }

    /// Reset every record.
    pub fn clear_all(&mut self) {
        for record in &mut self.records {
            record.clear();
        }
    }

    /// Records worth storing in a sparse snapshot, with their indices.
    pub fn populated(&self) -> impl Iterator<Item = (usize, &PatternRecord)> {
        self.records.iter().enumerate().filter(|(_, r)| r.is_populated())
    }
}
