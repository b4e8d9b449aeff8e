//! # Identifier Canonicalization
//!
//! Upstream sources spell the same district three ways: `"5508"`,
//! `"55-08"`, `"WI-08"`. Canonicalization collapses them: uppercase,
//! strip non-alphanumerics, translate a leading state postal code to its
//! 2-digit FIPS code, zero-pad the district number, and prepend the
//! caller's state context when the id arrives bare.

/// USPS postal code → 2-digit state FIPS, the census bureau's numbering.
const STATE_FIPS: [(&str, &str); 51] = [
    ("AL", "01"), ("AK", "02"), ("AZ", "04"), ("AR", "05"), ("CA", "06"),
    ("CO", "08"), ("CT", "09"), ("DE", "10"), ("DC", "11"), ("FL", "12"),
    ("GA", "13"), ("HI", "15"), ("ID", "16"), ("IL", "17"), ("IN", "18"),
    ("IA", "19"), ("KS", "20"), ("KY", "21"), ("LA", "22"), ("ME", "23"),
    ("MD", "24"), ("MA", "25"), ("MI", "26"), ("MN", "27"), ("MS", "28"),
    ("MO", "29"), ("MT", "30"), ("NE", "31"), ("NV", "32"), ("NH", "33"),
    ("NJ", "34"), ("NM", "35"), ("NY", "36"), ("NC", "37"), ("ND", "38"),
    ("OH", "39"), ("OK", "40"), ("OR", "41"), ("PA", "42"), ("RI", "44"),
    ("SC", "45"), ("SD", "46"), ("TN", "47"), ("TX", "48"), ("UT", "49"),
    ("VT", "50"), ("VA", "51"), ("WA", "53"), ("WV", "54"), ("WI", "55"),
    ("WY", "56"),
];

fn fips_for_postal(code: &str) -> Option<&'static str> {
    STATE_FIPS
        .iter()
        .find(|(postal, _)| *postal == code)
        .map(|(_, fips)| *fips)
}

/// Canonicalize a district identifier.
///
/// `default_state_fips` supplies the 2-digit prefix for ids that arrive
/// without any state component (a state portal publishing bare district
/// numbers). Ids that already carry a state — numeric FIPS or postal
/// letters — ignore it.
///
/// `"5508"`, `"55-08"`, `"WI-08"`, and (with default `"55"`) `"8"` all
/// canonicalize to `"5508"`.
pub fn normalize_id(raw: &str, default_state_fips: Option<&str>) -> String {
    let cleaned: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    // A leading postal code becomes its FIPS number.
    if cleaned.len() >= 2 {
        let (head, tail) = cleaned.split_at(2);
        if head.bytes().all(|b| b.is_ascii_uppercase()) {
            if let Some(fips) = fips_for_postal(head) {
                return format!("{fips}{}", pad_district(tail));
            }
        }
    }

    // All-numeric with at least a state's worth of digits: split 2 + rest.
    if cleaned.len() > 2 && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let (state, district) = cleaned.split_at(2);
        return format!("{state}{}", pad_district(district));
    }

    // Bare district number: attach the caller's state context.
    if let Some(state) = default_state_fips {
        return format!("{state}{}", pad_district(&cleaned));
    }
    pad_district(&cleaned)
}

/// Zero-pad a numeric district component to two digits; leave
/// non-numeric components untouched.
fn pad_district(component: &str) -> String {
    if !component.is_empty()
        && component.len() < 2
        && component.bytes().all(|b| b.is_ascii_digit())
    {
        format!("0{component}")
    } else {
        component.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_equivalences_collapse() {
        // The canonical triple from the Wisconsin 8th.
        assert_eq!(normalize_id("5508", None), "5508");
        assert_eq!(normalize_id("55-08", None), "5508");
        assert_eq!(normalize_id("WI-08", None), "5508");
        assert_eq!(normalize_id("wi08", None), "5508");
    }

    #[test]
    fn bare_numbers_take_the_context_prefix() {
        assert_eq!(normalize_id("8", Some("55")), "5508");
        assert_eq!(normalize_id("08", Some("55")), "5508");
        assert_eq!(normalize_id("12", Some("06")), "0612");
    }

    #[test]
    fn context_is_ignored_when_state_is_present() {
        assert_eq!(normalize_id("WI-08", Some("06")), "5508");
        assert_eq!(normalize_id("5508", Some("06")), "5508");
    }

    #[test]
    fn punctuation_and_case_are_stripped() {
        assert_eq!(normalize_id("  ca-03 ", None), "0603");
        assert_eq!(normalize_id("CA 03", None), "0603");
        assert_eq!(normalize_id("CA.03", None), "0603");
    }

    #[test]
    fn single_digit_districts_are_padded() {
        assert_eq!(normalize_id("CA-3", None), "0603");
        assert_eq!(normalize_id("06-3", None), "0603");
    }

    #[test]
    fn long_geoids_pass_through() {
        assert_eq!(normalize_id("060370001001", None), "060370001001");
    }

    #[test]
    fn non_state_letter_prefixes_are_preserved() {
        // UK ONS codes have no US state prefix; they pass through cleaned.
        assert_eq!(normalize_id("E14000530", None), "E14000530");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["5508", "55-08", "WI-08", "E14000530", "CA-3"] {
            let once = normalize_id(raw, None);
            assert_eq!(normalize_id(&once, None), once);
        }
    }
}
