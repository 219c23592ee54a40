use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use super::series::RegionFilter;


pub const SERIES_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19\
			      /master/csse_covid_19_data/csse_covid_19_time_series\
			      /time_series_covid19_confirmed_US.csv";
pub const FEATURES_URL: &str = "https://opendata.arcgis.com/datasets\
				/dc20713282734a73abe990995de40497_68.geojson";


/// Render a county choropleth of confirmed COVID-19 cases with a date slider.
#[derive(Parser,Debug)]
#[command(version, about)]
pub struct Args {
    /// Time series table (URL or local path), one row per county.
    #[arg(long, default_value = SERIES_URL)]
    pub series: String,

    /// County boundaries as a GeoJSON feature collection (URL or local path).
    #[arg(long, default_value = FEATURES_URL)]
    pub features: String,

    /// Header label of the first date column.
    #[arg(long, default_value = "1/22/20")]
    pub anchor: String,

    #[arg(long, default_value = "FIPS")]
    pub key_column: String,

    /// Feature property holding the county code.
    #[arg(long, default_value = "GEOID10")]
    pub join_key: String,

    #[arg(long, default_value = "Georgia")]
    pub region: String,

    /// How rows are matched against --region: `substring`, `cell` or `column:<name>`.
    #[arg(long, default_value = "substring")]
    pub filter: FilterMode,

    /// Initially selected date index; defaults to the most recent date.
    #[arg(long)]
    pub date: Option<usize>,

    #[arg(long, default_value = "maps")]
    pub output: PathBuf,

    #[arg(long, default_value = "cache")]
    pub cache: PathBuf,

    /// Minutes a cached download stays fresh.
    #[arg(long, default_value_t = 30)]
    pub max_age: u64,
}

impl Args {

    pub fn region_filter(&self) -> RegionFilter {
	self.filter.filter(&self.region)
    }

    pub fn max_age(&self) -> Duration {
	Duration::from_secs(self.max_age * 60)
    }

}


#[derive(Debug,Clone,PartialEq)]
pub enum FilterMode {
    Substring,
    Cell,
    Column(String),
}

impl FilterMode {
    pub fn filter(&self, region: &str) -> RegionFilter {
	match self {
	    Self::Substring => RegionFilter::Substring(region.to_string()),
	    Self::Cell => RegionFilter::CellEquals(region.to_string()),
	    Self::Column(column) => RegionFilter::ColumnEquals {
		column: column.clone(),
		value: region.to_string(),
	    },
	}
    }
}

impl FromStr for FilterMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
	match s {
	    "substring" => Ok(Self::Substring),
	    "cell" => Ok(Self::Cell),
	    _ => match s.strip_prefix("column:") {
		Some(column) if !column.is_empty() => Ok(Self::Column(column.to_string())),
		_ => Err(format!("unknown filter mode: {}", s)),
	    }
	}
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_map() {
	let args = Args::try_parse_from(["covid19-choropleth-rs"]).unwrap();
	assert_eq!(args.series, SERIES_URL);
	assert!(args.series.ends_with("time_series_covid19_confirmed_US.csv"));
	assert_eq!(args.anchor, "1/22/20");
	assert_eq!(args.join_key, "GEOID10");
	assert_eq!(args.region_filter(), RegionFilter::Substring("Georgia".to_string()));
	assert_eq!(args.date, None);
	assert_eq!(args.max_age(), Duration::from_secs(1800));
    }

    #[test]
    fn column_filter_mode() {
	let args = Args::try_parse_from(["covid19-choropleth-rs", "--filter", "column:Province_State",
					 "--region", "Alabama", "--date", "3"]).unwrap();
	assert_eq!(args.region_filter(), RegionFilter::ColumnEquals {
	    column: "Province_State".to_string(),
	    value: "Alabama".to_string(),
	});
	assert_eq!(args.date, Some(3));
    }

    #[test]
    fn rejects_unknown_filter_mode() {
	assert!("regex".parse::<FilterMode>().is_err());
	assert!("column:".parse::<FilterMode>().is_err());
	assert_eq!("cell".parse::<FilterMode>(), Ok(FilterMode::Cell));
    }
}
