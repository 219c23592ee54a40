mod color;
mod config;
mod error;
mod merge;
mod render;
mod selection;
mod series;
mod source;
mod view;

use std::process;
use std::collections::BTreeMap;

use clap::Parser;

use color::Bucket;
use config::Args;
use view::{View,DataConfig};


fn main() {

    pretty_env_logger::init_custom_env("RUST_LOG");

    let args = Args::parse();
    let filter = args.region_filter();
    let series = source::from_arg(&args.series, &args.cache.join("series"), args.max_age());
    let features = source::from_arg(&args.features, &args.cache.join("features"), args.max_age());

    let mut view = View::new();
    view.load(series.as_ref(), features.as_ref(), &DataConfig {
	key_column: &args.key_column,
	anchor: &args.anchor,
	join_key: &args.join_key,
	filter: &filter,
    });

    if let Some(date) = args.date {
	match view.loaded().map(|l| l.selection.dates().len()) {
	    Some(n) if date >= n => {
		log::error!("Date index {} out of range, {} dates available", date, n);
		process::exit(2);
	    },
	    _ => { view.select_date(date); }
	}
    }

    let loaded = match view.loaded() {
	Some(loaded) => loaded,
	None => {
	    log::error!("No map data from {} and {}", series.name(), features.name());
	    process::exit(1);
	}
    };

    log::info!("{} regions, {} of {} features with case data",
	       loaded.index.series.len(), loaded.stats.matched,
	       loaded.stats.matched + loaded.stats.unmatched);

    let total: f64 = merge::features(&loaded.features).map(|features| features.iter()
	.filter_map(|f| merge::feature_key(f, &args.join_key))
	.filter_map(|key| loaded.count_for(key))
	.filter_map(|count| count.trim().parse::<f64>().ok())
	.sum::<f64>()).unwrap_or(0.0);
    log::info!("{} confirmed cases on {} across mapped counties",
	       total, loaded.selection.selected_date());

    let mut counts = BTreeMap::new();
    for style in view.styles().unwrap_or_default() {
	*counts.entry(style.fill_color).or_insert(0) += 1;
    }
    log::info!("{}: {}", loaded.selection.selected_date(), Bucket::ALL.iter().map(
	|b| format!("{}={}", b.color(), counts.get(b.color()).unwrap_or(&0))
    ).collect::<Vec<_>>().join(" "));

    if let Err(err) = render::choropleth(&args.output, &args.region, loaded) {
	log::error!("Error: choropleth map: {}", err);
	process::exit(1);
    }

    view.teardown();

}
