use serde_json::Value;

use super::error::Result;
use super::merge::{self,MergeStats};
use super::selection::{SelectionState,FeatureStyle};
use super::series::{self,CaseIndex,RegionKey,RowFilter};
use super::source::Source;


pub struct DataConfig<'a> {
    pub key_column: &'a str,
    pub anchor: &'a str,
    pub join_key: &'a str,
    pub filter: &'a dyn RowFilter,
}

/// Everything the map needs once both inputs are in.
pub struct Loaded {
    pub index: CaseIndex,
    pub features: Value,
    pub selection: SelectionState,
    pub stats: MergeStats,
}

impl Loaded {
    /// Raw count of region `key` on the selected date.
    pub fn count_for(&self, key: RegionKey) -> Option<&str> {
	self.index.get(key).and_then(|s| self.selection.count_in(s))
    }
}

pub enum ViewState {
    Loading,
    Ready(Loaded),
}

pub struct View {
    state: ViewState,
    open: bool,
}

impl View {

    pub fn new() -> Self {
	Self { state: ViewState::Loading, open: true }
    }

    pub fn loaded(&self) -> Option<&Loaded> {
	match &self.state {
	    ViewState::Ready(loaded) => Some(loaded),
	    ViewState::Loading => None,
	}
    }

    /// Fetch and prepare both inputs. On failure the error is logged and
    /// the view keeps loading.
    pub fn load(&mut self, table: &dyn Source, boundaries: &dyn Source, config: &DataConfig) {
	match load(table, boundaries, config) {
	    Ok(loaded) => self.complete(loaded),
	    Err(err) => log::error!("Loading map data failed: {}", err),
	}
    }

    /// Apply a finished load, unless the view was torn down meanwhile.
    pub fn complete(&mut self, loaded: Loaded) {
	if !self.open {
	    log::debug!("Discarding map data loaded after teardown");
	    return;
	}
	self.state = ViewState::Ready(loaded);
    }

    pub fn teardown(&mut self) {
	self.open = false;
    }

    /// Returns the newly active date, or `None` while loading.
    pub fn select_date(&mut self, index: usize) -> Option<&str> {
	match &mut self.state {
	    ViewState::Ready(loaded) => Some(loaded.selection.select(index)),
	    ViewState::Loading => None,
	}
    }

    pub fn styles(&self) -> Option<Vec<FeatureStyle>> {
	let loaded = self.loaded()?;
	let features = merge::features(&loaded.features).ok()?;
	Some(features.iter().map(|f| loaded.selection.style_for(f)).collect())
    }

}

impl Default for View {
    fn default() -> Self {
	Self::new()
    }
}


/// Time series first, then features; the merge needs both.
pub fn load(table: &dyn Source, boundaries: &dyn Source, config: &DataConfig) -> Result<Loaded> {

    let raw = table.fetch()?;
    let index = series::parse(&raw, config.key_column, config.anchor, config.filter)?;
    let selection = SelectionState::new(index.dates.clone())?;

    let mut features: Value = serde_json::from_str(&boundaries.fetch()?)?;
    let stats = merge::merge(&mut features, &index, config.join_key)?;

    Ok(Loaded { index, features, selection, stats })

}
