//! Coordinate extraction from customer map links.
//!
//! Customers paste free-text map URLs; two link shapes carry usable
//! coordinates and both are recognized here. Everything else yields no
//! coordinates rather than an error.

use std::sync::LazyLock;

use regex::Regex;

/// Matches an `@lat,lon` path segment, e.g. `.../@12.34,77.12,15z`.
static AT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("invalid @-segment pattern")
});

/// Matches a `q=lat,lon` query parameter, e.g. `...?q=10.0,20.5`.
static QUERY_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]q=(-?\d+\.\d+),(-?\d+\.\d+)").expect("invalid q= pattern")
});

/// Extract a latitude/longitude pair from a free-text map URL.
///
/// The `@lat,lon` path segment is tried first, then the `q=lat,lon` query
/// parameter; the first match wins. Malformed or partially matching URLs
/// yield `None` — extraction never fails.
#[must_use]
pub fn extract_coordinates(url: &str) -> Option<(f64, f64)> {
    if url.is_empty() {
        return None;
    }
    for pattern in [&*AT_SEGMENT, &*QUERY_PARAM] {
        if let Some(captures) = pattern.captures(url) {
            let lat = captures.get(1)?.as_str().parse().ok()?;
            let lon = captures.get(2)?.as_str().parse().ok()?;
            return Some((lat, lon));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_segment() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/@12.34,77.12,15z"),
            Some((12.34, 77.12))
        );
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/?q=10.0,20.5"),
            Some((10.0, 20.5))
        );
    }

    #[test]
    fn test_query_param_not_first_parameter() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/?hl=en&q=10.0,20.5"),
            Some((10.0, 20.5))
        );
    }

    #[test]
    fn test_at_segment_wins_over_query() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/@1.5,2.5,15z?q=10.0,20.5"),
            Some((1.5, 2.5))
        );
    }

    #[test]
    fn test_negative_coordinates() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/@-33.87,-151.21,12z"),
            Some((-33.87, -151.21))
        );
    }

    #[test]
    fn test_no_coordinates() {
        assert_eq!(extract_coordinates("https://example.com/no-coords"), None);
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(extract_coordinates(""), None);
    }

    #[test]
    fn test_integers_without_fraction_do_not_match() {
        // Both patterns require a fractional part.
        assert_eq!(extract_coordinates("https://maps.google.com/@12,77"), None);
    }

    #[test]
    fn test_partial_match_yields_none() {
        assert_eq!(
            extract_coordinates("https://maps.google.com/@12.34,notanumber"),
            None
        );
    }

    #[test]
    fn test_bare_q_in_path_does_not_match() {
        // `q=` must be a query parameter, not arbitrary text.
        assert_eq!(
            extract_coordinates("https://example.com/freq=10.0,20.5/page"),
            None
        );
    }
}
