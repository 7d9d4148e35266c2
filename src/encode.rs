//! Parameter normalization (RFC 5849 section 3.4.1.3.2).

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything but the RFC 3986 unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string the way OAuth 1.0 requires (RFC 5849 section 3.6).
///
/// Space becomes `%20`, never `+`.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).into()
}

/// Build the normalized parameter string out of name/value pairs.
///
/// Names and values are encoded first, then sorted by name and value, so the
/// order of `params` never matters. Repeated names stay repeated.
pub fn normalize_parameters<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| {
            (
                percent_encode(k.as_ref()).into_owned(),
                percent_encode(v.as_ref()).into_owned(),
            )
        })
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_stay_as_is() {
        assert_eq!(percent_encode("abcXYZ019"), "abcXYZ019");
        assert_eq!(percent_encode("-._~"), "-._~");
    }

    #[test]
    fn reserved_are_escaped() {
        assert_eq!(percent_encode("a b&c"), "a%20b%26c");
        assert_eq!(percent_encode("="), "%3D");
        assert_eq!(percent_encode("+"), "%2B");
        assert_eq!(percent_encode("/"), "%2F");
        assert_eq!(percent_encode("*"), "%2A");
    }

    #[test]
    fn multibyte_is_escaped_per_byte() {
        assert_eq!(percent_encode("少女"), "%E5%B0%91%E5%A5%B3");
    }

    #[test]
    fn normalization_ignores_input_order() {
        let params = vec![
            ("b5", "=%3D"),
            ("a3", "a"),
            ("c@", ""),
            ("a2", "r b"),
            ("oauth_consumer_key", "9djdj82h48djs9d2"),
            ("c2", ""),
            ("a3", "2 q"),
        ];
        let mut reversed = params.clone();
        reversed.reverse();
        let mut rotated = params.clone();
        rotated.rotate_left(3);

        let expected = normalize_parameters(params);
        assert_eq!(normalize_parameters(reversed), expected);
        assert_eq!(normalize_parameters(rotated), expected);
    }

    #[test]
    fn rfc_normalization_example() {
        // RFC 5849 section 3.4.1.3.2, with oauth_* values trimmed to one entry
        let normalized = normalize_parameters(vec![
            ("b5", "=%3D"),
            ("a3", "a"),
            ("c@", ""),
            ("a2", "r b"),
            ("c2", ""),
            ("a3", "2 q"),
        ]);
        assert_eq!(
            normalized,
            "a2=r%20b&a3=2%20q&a3=a&b5=%3D%253D&c%40=&c2="
        );
    }

    #[test]
    fn duplicate_names_sort_by_value() {
        let normalized = normalize_parameters(vec![("f", "50"), ("f", "25"), ("f", "a")]);
        assert_eq!(normalized, "f=25&f=50&f=a");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_parameters(Vec::<(&str, &str)>::new()), "");
    }
}
