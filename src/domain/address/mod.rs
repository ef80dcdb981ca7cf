//! Address domain - client and sold-home rows, cache keys and coordinates

mod coordinate;
mod key;
mod record;

pub use coordinate::Coordinate;
pub use key::{AddressKey, AddressKeyFormat, DEFAULT_CITY, DEFAULT_STATE};
pub use record::{AddressRecord, BOILERPLATE_MARKER};
