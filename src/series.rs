use std::rc::Rc;
use std::collections::HashMap;

use csv::StringRecord;
use serde::ser::{Serialize,Serializer,SerializeMap};

use super::error::{Result,Error};


pub type RegionKey = u32;

/// Date column labels in table order. Labels are opaque tokens.
#[derive(Debug,PartialEq)]
pub struct DateLabels {
    labels: Vec<String>,
    positions: HashMap<String,usize>,
}

impl DateLabels {

    pub fn new(labels: Vec<String>) -> Self {
	let positions = labels.iter().enumerate()
	    .map(|(i,l)| (l.clone(), i)).collect();
	Self { labels, positions }
    }

    pub fn len(&self) -> usize {
	self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
	self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
	self.labels.get(index).map(|l| l.as_str())
    }

    pub fn position(&self, label: &str) -> Option<usize> {
	self.positions.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
	self.labels.iter().map(|l| l.as_str())
    }

}

/// Raw case count cells of one region, aligned with the table's dates.
#[derive(Debug,Clone,PartialEq)]
pub struct CaseSeries {
    dates: Rc<DateLabels>,
    counts: Vec<String>,
}

impl CaseSeries {

    pub fn get(&self, date: &str) -> Option<&str> {
	self.dates.position(date).and_then(|i| self.at(i))
    }

    pub fn at(&self, index: usize) -> Option<&str> {
	self.counts.get(index).map(|c| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str,&str)> {
	self.dates.iter().zip(self.counts.iter().map(|c| c.as_str()))
    }

}

impl Serialize for CaseSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok,S::Error> {
	let mut map = serializer.serialize_map(Some(self.counts.len()))?;
	for (date,count) in self.iter() {
	    map.serialize_entry(date, count)?;
	}
	map.end()
    }
}

#[derive(Debug)]
pub struct CaseIndex {
    pub dates: Rc<DateLabels>,
    pub series: HashMap<RegionKey,CaseSeries>,
}

impl CaseIndex {
    pub fn get(&self, key: RegionKey) -> Option<&CaseSeries> {
	self.series.get(&key)
    }
}


/// Row selection applied before a row enters the index.
pub trait RowFilter {
    fn matcher<'a>(&'a self, header: &StringRecord)
		   -> Result<Box<dyn Fn(&StringRecord) -> bool + 'a>>;
}

impl<F> RowFilter for F where F: Fn(&StringRecord) -> bool {
    fn matcher<'a>(&'a self, _header: &StringRecord)
		   -> Result<Box<dyn Fn(&StringRecord) -> bool + 'a>> {
	Ok(Box::new(move |row: &StringRecord| self(row)))
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum RegionFilter {
    /// Some cell contains the value anywhere in its text.
    Substring(String),
    /// Some cell is exactly the value.
    CellEquals(String),
    ColumnEquals { column: String, value: String },
}

impl RowFilter for RegionFilter {
    fn matcher<'a>(&'a self, header: &StringRecord)
		   -> Result<Box<dyn Fn(&StringRecord) -> bool + 'a>> {
	let matcher: Box<dyn Fn(&StringRecord) -> bool + 'a> = match self {
	    Self::Substring(value) => Box::new(
		move |row: &StringRecord| row.iter().any(|c| c.contains(value.as_str()))),
	    Self::CellEquals(value) => Box::new(
		move |row: &StringRecord| row.iter().any(|c| c == value.as_str())),
	    Self::ColumnEquals { column, value } => {
		let idx = column_index(header, column)?;
		Box::new(move |row: &StringRecord| row.get(idx) == Some(value.as_str()))
	    }
	};
	Ok(matcher)
    }
}


/// Leading-digit integer parse of a region key cell: `"13089.0"` is 13089.
/// A cell without leading digits, or one too large for a key, has no key.
pub fn parse_region_key(cell: &str) -> Option<RegionKey> {
    let cell = cell.trim();
    let end = cell.find(|c: char| !c.is_ascii_digit()).unwrap_or(cell.len());
    cell[..end].parse().ok()
}

fn column_index(header: &StringRecord, name: &str) -> Result<usize> {
    header.iter().position(|h| h == name)
	.ok_or_else(|| Error::MissingColumn(name.to_string()))
}


/// Parse the wide time series table. Date columns run from the `anchor`
/// column to the end of the header. Rows sharing a key overwrite each other.
pub fn parse<F: RowFilter + ?Sized>(raw: &str, key_column: &str, anchor: &str,
				    filter: &F) -> Result<CaseIndex> {

    let mut records = csv::ReaderBuilder::new()
	.has_headers(false)
	.flexible(true)
	.from_reader(raw.as_bytes())
	.into_records();

    let header = records.next().transpose()?.ok_or(Error::MissingData)?;
    let key_idx = column_index(&header, key_column)?;
    let first_date_idx = column_index(&header, anchor)?;
    let accepts = filter.matcher(&header)?;

    let dates = Rc::new(DateLabels::new(
	header.iter().skip(first_date_idx).map(|h| h.to_string()).collect()));

    let mut series = HashMap::new();
    let mut skipped = 0;

    for row in records {
	let row = row?;
	if !accepts(&row) {
	    continue;
	}
	let key = match parse_region_key(row.get(key_idx).unwrap_or("")) {
	    Some(key) => key,
	    None => { skipped += 1; continue; }
	};
	let counts = (first_date_idx..header.len())
	    .map(|i| row.get(i).unwrap_or("").to_string())
	    .collect();
	if series.insert(key, CaseSeries { dates: dates.clone(), counts }).is_some() {
	    log::debug!("Region {} appears more than once, keeping the last row", key);
	}
    }

    if skipped > 0 {
	log::warn!("Skipped {} matching rows without a usable {} value", skipped, key_column);
    }

    log::info!("Parsed {} regions over {} dates", series.len(), dates.len());

    Ok(CaseIndex { dates, series })

}
