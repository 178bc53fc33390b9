//! Workspace: the in-memory session state container
//!
//! Holds every loaded series plus the cross-series view state
//! (selection, primary, shared date range) behind pure transition
//! functions, so the state machine is testable without any UI or
//! event-loop framework attached.

use crate::error::{Result, WorkspaceError};
use crate::series::{DateRange, Series, SeriesId, PALETTE};
use chrono::NaiveDate;
use sage_analytics::{augment, parse_csv};
use std::collections::HashSet;
use tracing::{debug, info};

/// In-memory session state: all series and the shared view state
#[derive(Debug, Default)]
pub struct Workspace {
    series: Vec<Series>,
    selected: HashSet<SeriesId>,
    primary: Option<SeriesId>,
    date_range: Option<DateRange>,
    next_id: u64,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and load one uploaded CSV as a new series.
    ///
    /// The new series is selected immediately and promoted to primary
    /// if no primary exists. On parse failure (zero usable rows)
    /// nothing is mutated.
    pub fn add_series(
        &mut self,
        raw_csv: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<SeriesId> {
        let raw_csv = raw_csv.into();
        let display_name = display_name.into();

        let mut bars = parse_csv(&raw_csv);
        if bars.is_empty() {
            return Err(WorkspaceError::EmptyCsv { name: display_name });
        }
        augment(&mut bars);

        let id = SeriesId::new(self.next_id);
        let color = PALETTE[(self.next_id as usize) % PALETTE.len()];
        self.next_id += 1;

        let mut series = Series::new(id, display_name, raw_csv, bars, color);
        series.apply_range(self.date_range.as_ref());

        info!(%id, name = %series.display_name, bars = series.full_bars.len(), "loaded series");

        self.series.push(series);
        self.selected.insert(id);
        if self.primary.is_none() {
            self.primary = Some(id);
        }
        Ok(id)
    }

    /// Remove a series, purging it from the selection.
    ///
    /// When the removed series was primary, the lowest remaining id
    /// becomes primary; primary only goes back to `None` once the
    /// workspace is empty. Returns whether anything was removed.
    pub fn remove_series(&mut self, id: SeriesId) -> bool {
        let before = self.series.len();
        self.series.retain(|series| series.id != id);
        if self.series.len() == before {
            return false;
        }

        self.selected.remove(&id);
        if self.primary == Some(id) {
            self.primary = self.series.iter().map(|series| series.id).min();
            debug!(new_primary = ?self.primary, "reassigned primary series");
        }
        true
    }

    /// Set or clear the shared date range and recompute every series'
    /// visible bars. `None` restores the full span.
    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.date_range = range;
        for series in &mut self.series {
            series.apply_range(self.date_range.as_ref());
        }
    }

    /// Toggle whether a series is drawn in comparison views
    pub fn toggle_selected(&mut self, id: SeriesId) -> Result<bool> {
        if !self.contains(id) {
            return Err(WorkspaceError::SeriesNotFound(id));
        }
        if self.selected.remove(&id) {
            Ok(false)
        } else {
            self.selected.insert(id);
            Ok(true)
        }
    }

    /// Make a series drive the single-series views and the chat digest
    pub fn set_primary(&mut self, id: SeriesId) -> Result<()> {
        if !self.contains(id) {
            return Err(WorkspaceError::SeriesNotFound(id));
        }
        self.primary = Some(id);
        Ok(())
    }

    fn contains(&self, id: SeriesId) -> bool {
        self.series.iter().any(|series| series.id == id)
    }

    pub fn series(&self, id: SeriesId) -> Option<&Series> {
        self.series.iter().find(|series| series.id == id)
    }

    pub fn series_mut(&mut self, id: SeriesId) -> Option<&mut Series> {
        self.series.iter_mut().find(|series| series.id == id)
    }

    /// All series in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    pub fn primary_id(&self) -> Option<SeriesId> {
        self.primary
    }

    pub fn is_selected(&self, id: SeriesId) -> bool {
        self.selected.contains(&id)
    }

    /// Min/max date across every series' full bars, used to bound the
    /// date-range picker
    pub fn all_dates_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self
            .series
            .iter()
            .filter_map(|series| series.full_bars.first())
            .map(|bar| bar.date)
            .min()?;
        let max = self
            .series
            .iter()
            .filter_map(|series| series.full_bars.last())
            .map(|bar| bar.date)
            .max()?;
        Some((min, max))
    }

    /// Series currently drawn in comparison views, in insertion order
    pub fn displayed_series(&self) -> Vec<&Series> {
        self.series
            .iter()
            .filter(|series| self.selected.contains(&series.id))
            .collect()
    }

    pub fn primary_series(&self) -> Option<&Series> {
        self.primary.and_then(|id| self.series(id))
    }
}
