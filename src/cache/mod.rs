mod codec;
mod store;

pub use codec::{decode, encode};
pub use store::{CACHE_FILENAME, cache_path, read_cache, write_cache};
