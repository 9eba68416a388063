mod fetch;
mod parse;

pub use fetch::{fetch_episodes, fetch_feed_bytes};
pub use parse::{DATE_LAYOUT, Episode, extract_episodes, parse_date};
