use std::fmt;

use serde::{Deserialize, Serialize};

use super::AddressRecord;

pub const DEFAULT_CITY: &str = "Bakersfield";
pub const DEFAULT_STATE: &str = "CA";

/// Identity of one postal address in the geocode cache
///
/// The key is the concatenation `"{street}, {city}, {state} {zip}"` exactly as
/// formed; there is no case folding or punctuation clean-up beyond trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressKey(String);

impl AddressKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddressKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds address keys, filling in the market's default city and state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressKeyFormat {
    default_city: String,
    state: String,
}

impl AddressKeyFormat {
    pub fn new(default_city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            default_city: default_city.into(),
            state: state.into(),
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn key_for(&self, record: &AddressRecord) -> AddressKey {
        let street = record.address.trim();
        let city = record.city_name().unwrap_or(&self.default_city);

        AddressKey(format!(
            "{}, {}, {} {}",
            street,
            city,
            self.state,
            record.zip_code()
        ))
    }
}

impl Default for AddressKeyFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CITY, DEFAULT_STATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_with_all_parts() {
        let record = AddressRecord::new(2, " 4512 Panorama Dr ")
            .with_city("Bakersfield")
            .with_zip("93306.0");

        let key = AddressKeyFormat::default().key_for(&record);
        assert_eq!(key.as_str(), "4512 Panorama Dr, Bakersfield, CA 93306");
    }

    #[test]
    fn test_key_defaults_city_and_keeps_trailing_space_without_zip() {
        let record = AddressRecord::new(2, "10 Oak St");

        let key = AddressKeyFormat::default().key_for(&record);
        assert_eq!(key.as_str(), "10 Oak St, Bakersfield, CA ");
    }

    #[test]
    fn test_key_is_case_sensitive() {
        let format = AddressKeyFormat::default();
        let upper = format.key_for(&AddressRecord::new(2, "10 OAK ST").with_zip("93301"));
        let lower = format.key_for(&AddressRecord::new(2, "10 Oak St").with_zip("93301"));
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_custom_market() {
        let format = AddressKeyFormat::new("Fresno", "CA");
        let key = format.key_for(&AddressRecord::new(2, "1 Elm Ave").with_city(""));
        assert_eq!(key.as_str(), "1 Elm Ave, Fresno, CA ");
    }
}
