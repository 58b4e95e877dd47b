use std::{collections::BTreeMap, fmt};

use crate::table::{StationStats, StationTable};

/// Final per-station results, ordered by name bytes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultSet {
    stations: BTreeMap<String, StationStats>,
}

impl ResultSet {
    /// Combines the private tables of every worker by station name.
    pub fn merge<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = StationTable>,
    {
        let mut result = ResultSet::default();
        for table in tables {
            result.extend(table.into_stats());
        }
        result
    }

    fn extend(&mut self, stats: impl IntoIterator<Item = StationStats>) {
        for stats in stats {
            match self.stations.get_mut(stats.name()) {
                Some(existing) => existing.merge(&stats),
                None => {
                    self.stations.insert(stats.name().to_owned(), stats);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StationStats> {
        self.stations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationStats> {
        self.stations.values()
    }

    /// `{a=min/mean/max, b=min/mean/max, ...}`
    pub fn format(&self) -> String {
        let parts = self
            .iter()
            .map(|stats| stats.format_data_point())
            .collect::<Vec<_>>();

        "{".to_owned() + &parts.join(", ") + "}"
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
