mod parser;
pub mod scraper;
pub mod types;
pub mod writer;

pub use scraper::WebScraper;

pub const BASE_URL: &str = "https://www.volby.cz/pls/ps2017nss/";

/// Accepts only result pages on the volby.cz 2017 site with the Czech
/// language selector. Checked before any network I/O happens.
pub fn is_valid_url(url: &str) -> bool {
    url.starts_with(BASE_URL) && url.contains("xjazyk=CZ")
}
