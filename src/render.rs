use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::{Path,PathBuf};

use chrono::naive::NaiveDate;
use serde_json::{Value,json};
use unidecode::unidecode;

use super::color::Bucket;
use super::error::Result;
use super::merge;
use super::selection::{self,FeatureStyle,HoverStyle};
use super::view::Loaded;


pub const CENTER: (f64,f64) = (32.7656, -83.3);
pub const ZOOM: u32 = 8;


/// File stem for a region name: ASCII, lowercase, dash separated.
pub fn slug(name: &str) -> String {
    unidecode(name).to_lowercase()
	.split(|c: char| !c.is_ascii_alphanumeric())
	.filter(|p| !p.is_empty())
	.collect::<Vec<_>>()
	.join("-")
}

/// Long form of a `m/d/yy` date label; other labels are shown as they are.
pub fn display_date(label: &str) -> String {
    match NaiveDate::parse_from_str(label, "%m/%d/%y") {
	Ok(date) => format!("{}", date.format("%Y-%m-%d")),
	Err(_) => label.to_string(),
    }
}

/// Bucket of every feature on every date, features outer.
pub fn buckets(loaded: &Loaded) -> Result<Vec<Vec<usize>>> {
    let dates = loaded.selection.dates();
    Ok(merge::features(&loaded.features)?.iter().map(
	|feature| dates.iter().map(
	    |date| selection::bucket_at(feature, date).index()
	).collect()
    ).collect())
}


/// Write the merged features and the choropleth page. Returns the page path.
pub fn choropleth(map_path: &Path, region: &str, loaded: &Loaded) -> Result<PathBuf> {

    fs::create_dir_all(map_path)?;
    let stem = match slug(region) {
	s if s.is_empty() => "map".to_string(),
	s => s,
    };

    serde_json::to_writer(io::BufWriter::new(File::create(
	map_path.join(format!("{}.geojson", stem)))?), &loaded.features)?;

    let page = map_path.join(format!("{}.html", stem));
    let mut out = io::BufWriter::new(File::create(&page)?);
    let title = format!("Confirmed COVID-19 cases by county ({})", region);
    let dates = loaded.selection.dates();
    let bucket_table = buckets(loaded)?;

    let data = json!({
	"features": loaded.features,
	"buckets": bucket_table,
	"palette": Bucket::ALL.iter().map(|b| b.color()).collect::<Vec<_>>(),
	"dates": dates.iter().map(display_date).collect::<Vec<_>>(),
	"selected": loaded.selection.selected_index(),
	"style": FeatureStyle::base(Bucket::C8),
	"highlight": HoverStyle::highlight(),
	"reset": HoverStyle::reset(),
	"center": [CENTER.0, CENTER.1],
	"zoom": ZOOM,
    });

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", escape_html(&title))?;
    write!(out, "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\">")?;
    write!(out, "<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<div id=\"map\" style=\"height: 1000px;\"></div>")?;
    write!(out, "<input id=\"dateSlider\" type=\"range\" min=\"0\" max=\"{}\" value=\"{}\">",
	   dates.len() - 1, loaded.selection.selected_index())?;
    write!(out, "<div><strong id=\"currentDate\"></strong></div>")?;
    write!(out, "<div id=\"legend\">{}</div>", legend())?;
    write!(out, "<script type=\"text/javascript\">")?;
    write!(out, "var data = {};", script_json(&data)?)?;
    write!(out, "{}", SCRIPT)?;
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;
    out.flush()?;

    log::info!("Wrote {}", page.display());

    Ok(page)

}


fn legend() -> String {
    Bucket::ALL.iter().map(|b| {
	let label = match b.threshold() {
	    Some(t) => format!("&gt; {}", t),
	    None => "0 - 10".to_string(),
	};
	format!("<div><i style=\"display: inline-block; width: 18px; height: 18px; \
		 background: {};\"></i> {}</div>", b.color(), label)
    }).collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn script_json(data: &Value) -> Result<String> {
    Ok(serde_json::to_string(data)?.replace("</", "<\\/"))
}

const SCRIPT: &str = "\
var map = L.map('map').setView(data.center, data.zoom);\
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png').addTo(map);\
var current = data.selected;\
data.features.features.forEach(function(f, i) { f.buckets = data.buckets[i]; });\
function style(f) { return Object.assign({}, data.style, {fillColor: data.palette[f.buckets[current]]}); }\
var layer = L.geoJSON(data.features, {style: style, onEachFeature: function(f, l) {\
  l.on({mouseover: function(e) { e.target.setStyle(data.highlight); },\
        mouseout: function(e) { e.target.setStyle(data.reset); }});\
}}).addTo(map);\
function show() { document.getElementById('currentDate').textContent = data.dates[current]; }\
document.getElementById('dateSlider').addEventListener('input', function(e) {\
  current = parseInt(e.target.value); layer.setStyle(style); show();\
});\
show();";


#[cfg(test)]
mod tests {
    use super::*;
    use super::super::series::RegionFilter;
    use super::super::source::Source;
    use super::super::view::{self,DataConfig};

    struct Stub(&'static str);

    impl Source for Stub {
	fn name(&self) -> &str { "stub" }
	fn fetch(&self) -> Result<String> { Ok(self.0.to_string()) }
    }

    fn loaded() -> Loaded {
	let filter = RegionFilter::Substring("Georgia".to_string());
	view::load(&Stub("FIPS,State,1/22/20,1/23/20\n13089,Georgia,15,501\n"),
		   &Stub(r#"{"features":[{"properties":{"GEOID10":13089}},{"properties":{"GEOID10":1}}]}"#),
		   &DataConfig { key_column: "FIPS", anchor: "1/22/20", join_key: "GEOID10",
				 filter: &filter }).unwrap()
    }

    #[test]
    fn slugs() {
	assert_eq!(slug("Georgia"), "georgia");
	assert_eq!(slug("São Paulo"), "sao-paulo");
	assert_eq!(slug("  "), "");
    }

    #[test]
    fn long_dates() {
	assert_eq!(display_date("1/22/20"), "2020-01-22");
	assert_eq!(display_date("week 3"), "week 3");
    }

    #[test]
    fn buckets_per_feature_and_date() {
	assert_eq!(buckets(&loaded()).unwrap(), vec![vec![6, 1], vec![7, 7]]);
    }

    #[test]
    fn writes_page_and_geojson() {
	let dir = tempfile::tempdir().unwrap();
	let page = choropleth(dir.path(), "Georgia", &loaded()).unwrap();
	assert_eq!(page, dir.path().join("georgia.html"));
	let html = fs::read_to_string(&page).unwrap();
	assert!(html.contains("max=\"1\" value=\"1\""));
	assert!(html.contains("#BD0026"));
	let geojson: Value = serde_json::from_str(
	    &fs::read_to_string(dir.path().join("georgia.geojson")).unwrap()).unwrap();
	assert_eq!(geojson["features"][0]["properties"]["cases"]["1/23/20"], json!("501"));
	assert_eq!(geojson["features"][1]["properties"]["cases"], Value::Null);
    }

    #[test]
    fn region_name_is_escaped_in_title() {
	assert_eq!(escape_html("<b>Fish & Chips</b>"), "&lt;b&gt;Fish &amp; Chips&lt;/b&gt;");
	let dir = tempfile::tempdir().unwrap();
	let page = choropleth(dir.path(), "<b>", &loaded()).unwrap();
	assert_eq!(page, dir.path().join("b.html"));
	let html = fs::read_to_string(&page).unwrap();
	assert!(html.contains("<title>Confirmed COVID-19 cases by county (&lt;b&gt;)</title>"));
    }

    #[test]
    fn script_data_cannot_close_the_tag() {
	assert_eq!(script_json(&json!("</script>")).unwrap(), "\"<\\/script>\"");
    }
}
