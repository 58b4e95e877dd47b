use crate::{
    error::{Error, Result},
    hash::djb2,
    temperature::tenths_to_f64,
};

/// Enough slots for the 10k distinct stations the input format allows while
/// staying at most half full.
pub const DEFAULT_CAPACITY: usize = 32_768;

/// Running min/max/sum/count for one station, kept in tenths of a degree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    name: String,
    min: i32,
    max: i32,
    sum: i64,
    count: u64,
}

impl StationStats {
    pub fn new(name: String, tenths: i32) -> Self {
        Self {
            name,
            min: tenths,
            max: tenths,
            sum: tenths as i64,
            count: 1,
        }
    }

    #[inline(always)]
    pub fn add(&mut self, tenths: i32) {
        self.min = self.min.min(tenths);
        self.max = self.max.max(tenths);
        self.sum += tenths as i64;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &StationStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> f64 {
        tenths_to_f64(self.min as i64)
    }

    pub fn max(&self) -> f64 {
        tenths_to_f64(self.max as i64)
    }

    pub fn sum(&self) -> f64 {
        tenths_to_f64(self.sum)
    }

    pub fn mean(&self) -> f64 {
        self.sum as f64 / 10.0 / self.count as f64
    }

    /// `name=min/mean/max`, one decimal each.
    pub fn format_data_point(&self) -> String {
        format!("{}={:.1}/{:.1}/{:.1}", self.name, self.min(), self.mean(), self.max())
    }
}

#[derive(Debug)]
struct Slot {
    key: u64,
    stats: StationStats,
}

enum Probe {
    Found(usize),
    Vacant(usize),
}

/// Open addressing table from DJB2 key to [`StationStats`].
///
/// Each slot keeps the full key and the owned name, and a lookup only hits
/// when both match, so names that share a key land in separate slots.
pub struct StationTable {
    slots: Vec<Option<Slot>>,
    len: usize,
}

impl StationTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds one reading for `name`, creating the station on first sight.
    #[inline(always)]
    pub fn record(&mut self, name: &[u8], tenths: i32) -> Result<()> {
        let key = djb2(name);
        match self.probe(key, name) {
            Probe::Found(index) => {
                if let Some(slot) = &mut self.slots[index] {
                    slot.stats.add(tenths);
                }
            }
            Probe::Vacant(_) => {
                let name = String::from_utf8(name.to_vec())
                    .map_err(|_| Error::malformed(name, "station name is not valid UTF-8"))?;
                self.insert(key, StationStats::new(name, tenths));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StationStats> {
        match self.probe(djb2(name.as_bytes()), name.as_bytes()) {
            Probe::Found(index) => self.slots[index].as_ref().map(|slot| &slot.stats),
            Probe::Vacant(_) => None,
        }
    }

    pub fn into_stats(self) -> impl Iterator<Item = StationStats> {
        self.slots.into_iter().flatten().map(|slot| slot.stats)
    }

    #[inline(always)]
    fn probe(&self, key: u64, name: &[u8]) -> Probe {
        let mask = self.slots.len() - 1;
        let mut index = key as usize & mask;
        loop {
            match &self.slots[index] {
                None => return Probe::Vacant(index),
                Some(slot) if slot.key == key && slot.stats.name.as_bytes() == name => {
                    return Probe::Found(index);
                }
                Some(_) => index = (index + 1) & mask,
            }
        }
    }

    fn insert(&mut self, key: u64, stats: StationStats) {
        // keep the load factor at or below one half
        if (self.len + 1) * 2 > self.slots.len() {
            self.grow();
        }
        if let Probe::Vacant(index) = self.probe(key, stats.name.as_bytes()) {
            self.slots[index] = Some(Slot { key, stats });
            self.len += 1;
        }
    }

    fn grow(&mut self) {
        let new_capacity = self.slots.len() * 2;
        let mut slots = Vec::with_capacity(new_capacity);
        slots.resize_with(new_capacity, || None);
        let old = std::mem::replace(&mut self.slots, slots);

        let mask = new_capacity - 1;
        for slot in old.into_iter().flatten() {
            let mut index = slot.key as usize & mask;
            while self.slots[index].is_some() {
                index = (index + 1) & mask;
            }
            self.slots[index] = Some(slot);
        }
    }
}

impl Default for StationTable {
    fn default() -> Self {
        Self::new()
    }
}
