use serde_json::Value;


/// The eight color buckets of the choropleth, most intense first.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Bucket {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
}

impl Bucket {

    pub const ALL: [Bucket; 8] = [Self::C1, Self::C2, Self::C3, Self::C4,
				  Self::C5, Self::C6, Self::C7, Self::C8];

    pub fn color(&self) -> &'static str {
	match self {
	    Self::C1 => "#800026",
	    Self::C2 => "#BD0026",
	    Self::C3 => "#E31A1C",
	    Self::C4 => "#FC4E2A",
	    Self::C5 => "#FD8D3C",
	    Self::C6 => "#FEB24C",
	    Self::C7 => "#FED976",
	    Self::C8 => "#FFEDA0",
	}
    }

    /// Exclusive lower bound of the bucket; `None` for the catch-all.
    pub fn threshold(&self) -> Option<f64> {
	match self {
	    Self::C1 => Some(1000.0),
	    Self::C2 => Some(500.0),
	    Self::C3 => Some(200.0),
	    Self::C4 => Some(100.0),
	    Self::C5 => Some(50.0),
	    Self::C6 => Some(20.0),
	    Self::C7 => Some(10.0),
	    Self::C8 => None,
	}
    }

    pub fn index(&self) -> usize {
	*self as usize
    }

    pub fn for_count(count: f64) -> Self {
	Self::ALL.iter().copied()
	    .find(|b| b.threshold().map_or(true, |t| count > t))
	    .unwrap_or(Self::C8)
    }

    /// Bucket for a raw table cell. Empty or non-numeric cells, and
    /// regions without a series, land in the lowest bucket.
    pub fn for_cell(cell: Option<&str>) -> Self {
	cell.and_then(|c| c.trim().parse::<f64>().ok())
	    .map_or(Self::C8, Self::for_count)
    }

    pub fn for_value(value: Option<&Value>) -> Self {
	match value {
	    Some(Value::Number(n)) => n.as_f64().map_or(Self::C8, Self::for_count),
	    Some(Value::String(s)) => Self::for_cell(Some(s)),
	    _ => Self::C8,
	}
    }

}
