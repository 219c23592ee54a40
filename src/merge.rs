use std::collections::HashSet;
use std::convert::TryFrom;

use serde_json::{Value,Map};

use super::error::{Result,Error};
use super::series::{CaseIndex,RegionKey,parse_region_key};


pub const CASES: &str = "cases";

#[derive(Debug,Default,PartialEq)]
pub struct MergeStats {
    pub matched: usize,
    pub unmatched: usize,
    /// Regions of the index that no feature refers to.
    pub unused: usize,
}


/// Join key of a feature, given as a JSON number or a numeric string.
pub fn feature_key(feature: &Value, join_key: &str) -> Option<RegionKey> {
    match feature.get("properties")?.get(join_key)? {
	Value::Number(n) => match n.as_u64() {
	    Some(n) => RegionKey::try_from(n).ok(),
	    None => n.as_f64()
		.filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= RegionKey::MAX as f64)
		.map(|f| f as RegionKey),
	},
	Value::String(s) => parse_region_key(s),
	_ => None,
    }
}

pub fn features(collection: &Value) -> Result<&Vec<Value>> {
    collection.get("features").and_then(|f| f.as_array())
	.ok_or(Error::NotAFeatureCollection)
}


/// Bind each feature's case series under `properties.cases`, or `null` when
/// the index has no series for it. Features are never added or removed.
pub fn merge(collection: &mut Value, index: &CaseIndex, join_key: &str) -> Result<MergeStats> {

    let features = collection.get_mut("features").and_then(|f| f.as_array_mut())
	.ok_or(Error::NotAFeatureCollection)?;

    let mut stats = MergeStats::default();
    let mut used = HashSet::new();

    for feature in features.iter_mut() {

	let series = feature_key(feature, join_key)
	    .and_then(|key| index.get(key).map(|s| (key, s)));

	let cases = match series {
	    Some((key,series)) => {
		stats.matched += 1;
		used.insert(key);
		serde_json::to_value(series)?
	    },
	    None => {
		stats.unmatched += 1;
		Value::Null
	    }
	};

	let feature = feature.as_object_mut().ok_or(Error::NotAFeatureCollection)?;
	let properties = feature.entry("properties").or_insert(Value::Null);
	if !properties.is_object() {
	    *properties = Value::Object(Map::new());
	}
	if let Value::Object(properties) = properties {
	    properties.insert(CASES.to_string(), cases);
	}

    }

    stats.unused = index.series.len() - used.len();

    if stats.unmatched > 0 || stats.unused > 0 {
	log::warn!("{} features without case data, {} regions without a feature",
		   stats.unmatched, stats.unused);
    }
    log::info!("Merged case data into {} features", stats.matched);

    Ok(stats)

}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use super::super::series::{parse,RegionFilter};

    fn index() -> CaseIndex {
	parse("FIPS,State,1/22/20,1/23/20\n13089,Georgia,5,7\n13121,Georgia,1,2\n",
	      "FIPS", "1/22/20", &RegionFilter::Substring("Georgia".to_string())).unwrap()
    }

    #[test]
    fn binds_series_to_matching_feature() {
	let mut collection = json!({"type": "FeatureCollection", "features": [
	    {"type": "Feature", "properties": {"GEOID10": 13089}, "geometry": null}
	]});
	let stats = merge(&mut collection, &index(), "GEOID10").unwrap();
	assert_eq!(collection["features"][0]["properties"]["cases"],
		   json!({"1/22/20": "5", "1/23/20": "7"}));
	assert_eq!(stats, MergeStats { matched: 1, unmatched: 0, unused: 1 });
    }

    #[test]
    fn float_join_keys_match() {
	let mut collection = json!({"features": [
	    {"properties": {"GEOID10": 13089.0}}
	]});
	merge(&mut collection, &index(), "GEOID10").unwrap();
	assert_eq!(collection["features"][0]["properties"]["cases"]["1/22/20"], json!("5"));
    }

    #[test]
    fn string_join_keys_match() {
	let mut collection = json!({"features": [
	    {"properties": {"GEOID10": "13121"}}
	]});
	merge(&mut collection, &index(), "GEOID10").unwrap();
	assert_eq!(collection["features"][0]["properties"]["cases"]["1/23/20"], json!("2"));
    }

    #[test]
    fn unmatched_features_are_kept_with_null() {
	let mut collection = json!({"features": [
	    {"properties": {"GEOID10": 1001, "NAME": "Autauga"}, "geometry": {"type": "Point", "coordinates": [0, 0]}},
	    {"properties": {}},
	    {"geometry": null}
	]});
	let stats = merge(&mut collection, &index(), "GEOID10").unwrap();
	let features = features(&collection).unwrap();
	assert_eq!(features.len(), 3);
	for feature in features {
	    assert_eq!(feature["properties"]["cases"], Value::Null);
	    assert!(feature["properties"].as_object().unwrap().contains_key("cases"));
	}
	assert_eq!(features[0]["properties"]["NAME"], json!("Autauga"));
	assert_eq!(features[0]["geometry"]["type"], json!("Point"));
	assert_eq!(stats.unmatched, 3);
	assert_eq!(stats.unused, 2);
    }

    #[test]
    fn rejects_non_collections() {
	let mut value = json!({"type": "Feature"});
	assert!(matches!(merge(&mut value, &index(), "GEOID10"),
			 Err(Error::NotAFeatureCollection)));
    }

    #[test]
    fn keys() {
	assert_eq!(feature_key(&json!({"properties": {"K": 7}}), "K"), Some(7));
	assert_eq!(feature_key(&json!({"properties": {"K": "13089"}}), "K"), Some(13089));
	assert_eq!(feature_key(&json!({"properties": {"K": 13089.0}}), "K"), Some(13089));
	assert_eq!(feature_key(&json!({"properties": {"K": 13089.5}}), "K"), None);
	assert_eq!(feature_key(&json!({"properties": {"K": 1e12}}), "K"), None);
	assert_eq!(feature_key(&json!({"properties": {"K": -1}}), "K"), None);
	assert_eq!(feature_key(&json!({"properties": {}}), "K"), None);
    }
}
