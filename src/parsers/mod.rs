//! Parsers turning diagnostic tool output into numeric records
//!
//! Parsers never fail on unexpected input: anything they cannot recognize is
//! simply left out of the result.

pub mod http_timing;
pub mod ping;
pub mod scrape;

pub use http_timing::{parse_http_timing, HttpTiming, CURL_WRITE_OUT};
pub use ping::{PingOutput, PingOutputParser, PingSummary};
pub use scrape::{WebPageScraper, SCRAPE_SOURCE};
