use std::fs;
use std::path::{Path,PathBuf};
use std::time::Duration;

use encoding_rs::UTF_8;

use super::error::{Result,Error};


/// Somewhere the raw text of an input comes from.
pub trait Source {
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<String>;
}


pub struct FileSource(pub PathBuf);

impl Source for FileSource {

    fn name(&self) -> &str {
	self.0.to_str().unwrap_or("<file>")
    }

    fn fetch(&self) -> Result<String> {
	log::info!("Reading {}...", self.0.display());
	Ok(decode(&fs::read(&self.0)?))
    }

}


/// A download kept on disk for `max_age` before it is fetched again.
pub struct CachedUrl {
    pub url: String,
    pub cache_file: PathBuf,
    pub max_age: Duration,
}

impl CachedUrl {

    pub fn new(url: &str, cache_path: &Path, max_age: Duration) -> Self {
	let file_name = url.rsplit('/').next()
	    .filter(|n| !n.is_empty())
	    .unwrap_or("download");
	Self {
	    url: url.to_string(),
	    cache_file: cache_path.join(file_name),
	    max_age,
	}
    }

    fn fresh(&self) -> Result<bool> {
	Ok(self.cache_file.exists()
	   && fs::metadata(&self.cache_file)?.modified()?.elapsed()? < self.max_age)
    }

}

impl Source for CachedUrl {

    fn name(&self) -> &str {
	&self.url
    }

    fn fetch(&self) -> Result<String> {

	if self.fresh()? {
	    log::info!("Using cached {}", self.cache_file.display());
	    return Ok(decode(&fs::read(&self.cache_file)?));
	}

	let data = download(&self.url)?;
	if let Some(parent) = self.cache_file.parent() {
	    fs::create_dir_all(parent)?;
	}
	fs::write(&self.cache_file, &data)?;
	Ok(data)

    }

}


/// A local path or an http(s) URL cached under `cache_path`.
pub fn from_arg(arg: &str, cache_path: &Path, max_age: Duration) -> Box<dyn Source> {
    match arg.starts_with("http://") || arg.starts_with("https://") {
	true => Box::new(CachedUrl::new(arg, cache_path, max_age)),
	false => Box::new(FileSource(PathBuf::from(arg))),
    }
}


fn download(url: &str) -> Result<String> {

    log::info!("Downloading {}...", url);

    let res = reqwest::blocking::get(url)?;

    match res.status().as_u16() {
	200 => Ok(decode(&res.bytes()?)),
	_ => Err(Error::HttpError(res.status())),
    }

}

fn decode(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
	log::warn!("Replaced invalid UTF-8 sequences in input");
    }
    text.into_owned()
}
