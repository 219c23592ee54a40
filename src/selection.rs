use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use super::color::Bucket;
use super::error::{Result,Error};
use super::merge::CASES;
use super::series::{CaseSeries,DateLabels};


#[derive(Debug,Clone)]
pub struct SelectionState {
    dates: Rc<DateLabels>,
    selected: usize,
}

impl SelectionState {

    /// Starts on the most recent date.
    pub fn new(dates: Rc<DateLabels>) -> Result<Self> {
	if dates.is_empty() {
	    return Err(Error::MissingData);
	}
	let selected = dates.len() - 1;
	Ok(Self { dates, selected })
    }

    /// Select the date at `index`. Indices come from the bounded slider,
    /// so an index outside the date range is a bug.
    pub fn select(&mut self, index: usize) -> &str {
	assert!(index < self.dates.len(),
		"date index {} out of range 0..{}", index, self.dates.len());
	self.selected = index;
	self.selected_date()
    }

    pub fn selected_index(&self) -> usize {
	self.selected
    }

    pub fn selected_date(&self) -> &str {
	self.dates.get(self.selected).unwrap_or_default()
    }

    pub fn dates(&self) -> &DateLabels {
	&self.dates
    }

    /// Raw count cell of `series` on the selected date.
    pub fn count_in<'a>(&self, series: &'a CaseSeries) -> Option<&'a str> {
	series.get(self.selected_date())
    }

    pub fn bucket_for(&self, feature: &Value) -> Bucket {
	bucket_at(feature, self.selected_date())
    }

    pub fn style_for(&self, feature: &Value) -> FeatureStyle {
	FeatureStyle::base(self.bucket_for(feature))
    }

}


/// Bucket of a merged feature on `date`, read from its `cases` property.
pub fn bucket_at(feature: &Value, date: &str) -> Bucket {
    Bucket::for_value(feature.get("properties")
		      .and_then(|p| p.get(CASES))
		      .and_then(|c| c.get(date)))
}


#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub fill_color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub color: &'static str,
    pub dash_array: &'static str,
    pub fill_opacity: f64,
}

impl FeatureStyle {
    pub fn base(bucket: Bucket) -> Self {
	Self {
	    fill_color: bucket.color(),
	    weight: 2,
	    opacity: 0.5,
	    color: "white",
	    dash_array: "2",
	    fill_opacity: 0.7,
	}
    }
}

/// Style applied on pointer enter/leave, independent of the date.
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoverStyle {
    pub weight: u32,
    pub color: &'static str,
    pub dash_array: &'static str,
    pub fill_opacity: f64,
}

impl HoverStyle {

    pub fn highlight() -> Self {
	Self { weight: 1, color: "#666", dash_array: "1", fill_opacity: 0.9 }
    }

    pub fn reset() -> Self {
	Self { weight: 2, color: "white", dash_array: "2", fill_opacity: 0.7 }
    }

}
