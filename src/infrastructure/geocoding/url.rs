use reqwest::Url;

use crate::domain::DomainError;

/// Append path segments to `base`, percent-encoding each one
pub(crate) fn join_segments(
    provider: &str,
    base: &str,
    segments: &[&str],
) -> Result<Url, DomainError> {
    let mut url = Url::parse(base).map_err(|e| {
        DomainError::configuration(format!("Invalid {} base URL '{}': {}", provider, base, e))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            DomainError::configuration(format!(
                "{} base URL '{}' cannot carry a path",
                provider, base
            ))
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_encoded() {
        let url = join_segments(
            "mapbox",
            "https://api.mapbox.com/",
            &["geocoding", "10 Oak St, Bakersfield, CA 93301.json"],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/10%20Oak%20St,%20Bakersfield,%20CA%2093301.json"
        );
    }

    #[test]
    fn test_slash_in_address_stays_in_one_segment() {
        let url = join_segments("tomtom", "https://api.tomtom.com", &["1/2 Main St.json"]).unwrap();
        assert_eq!(url.path(), "/1%2F2%20Main%20St.json");
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            join_segments("mapbox", "not a url", &["x"]),
            Err(DomainError::Configuration { .. })
        ));
    }
}
