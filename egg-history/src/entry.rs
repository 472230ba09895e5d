//! A single recorded revision of the installed-egg set.

use std::{collections::BTreeSet, fmt::Write as _};

use egg_types::EggFilename;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::Error;

/// One revision: the installed-egg set at a moment in time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEntry {
    rev: u64,
    timestamp: OffsetDateTime,
    state: BTreeSet<EggFilename>,
}

impl HistoryEntry {
    pub(crate) fn new(rev: u64, timestamp: OffsetDateTime, state: BTreeSet<EggFilename>) -> Self {
        HistoryEntry { rev, timestamp, state }
    }

    /// The monotonically increasing revision number.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// The wall-clock time this revision was recorded.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// The set of eggs installed as of this revision.
    pub fn state(&self) -> &BTreeSet<EggFilename> {
        &self.state
    }

    /// Renders this entry in the on-disk log format: revision number, ISO-8601 timestamp, one
    /// filename per line, terminated by a blank line.
    pub(crate) fn render(&self) -> Result<String, Error> {
        let mut out = String::new();
        writeln!(out, "{}", self.rev).map_err(|err| Error::Parse { detail: err.to_string() })?;
        writeln!(out, "{}", self.timestamp.format(&Rfc3339).map_err(|err| Error::Parse { detail: err.to_string() })?)
            .map_err(|err| Error::Parse { detail: err.to_string() })?;
        for filename in &self.state {
            writeln!(out, "{filename}").map_err(|err| Error::Parse { detail: err.to_string() })?;
        }
        out.push('\n');
        Ok(out)
    }

    /// Parses a single block (no surrounding blank lines) in the on-disk log format.
    pub(crate) fn parse(block: &str) -> Result<Self, Error> {
        let mut lines = block.lines();
        let rev: u64 = lines
            .next()
            .ok_or_else(|| Error::Parse { detail: "missing revision number".to_string() })?
            .trim()
            .parse()
            .map_err(|_| Error::Parse { detail: "revision number is not an integer".to_string() })?;
        let timestamp_line = lines
            .next()
            .ok_or_else(|| Error::Parse { detail: "missing timestamp".to_string() })?
            .trim();
        let timestamp = OffsetDateTime::parse(timestamp_line, &Rfc3339)
            .map_err(|err| Error::Parse { detail: format!("bad timestamp {timestamp_line:?}: {err}") })?;

        let mut state = BTreeSet::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            state.insert(line.parse::<EggFilename>()?);
        }

        Ok(HistoryEntry::new(rev, timestamp, state))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn entry_round_trips_through_render_and_parse() {
        let state: BTreeSet<EggFilename> =
            BTreeSet::from([EggFilename::from_str("foo-1.0.0-1.egg").unwrap(), EggFilename::from_str("bar-2.0.0-1.egg").unwrap()]);
        let entry = HistoryEntry::new(3, OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(), state.clone());

        let rendered = entry.render().unwrap();
        let block = rendered.trim_end_matches('\n');
        let parsed = HistoryEntry::parse(block).unwrap();

        assert_eq!(parsed.rev(), 3);
        assert_eq!(parsed.state(), &state);
    }
}
