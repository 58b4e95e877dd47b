use std::fmt;

use regex::Regex;

/// A difference between a produced report and a reference report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Whitespace,
    StationCount { expected: usize, actual: usize },
    Name { expected: String, actual: String },
    Values { name: String, expected: String, actual: String },
}

impl Mismatch {
    /// Whitespace around the report is worth a note but not a failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Mismatch::Whitespace)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Whitespace => write!(f, "reports differ only in surrounding whitespace"),
            Mismatch::StationCount { expected, actual } => write!(
                f,
                "Incorrect number of stations; expected {expected}, got {actual}!"
            ),
            Mismatch::Name { expected, actual } => {
                write!(f, "Station names do not match, expected {expected}, got {actual}!")
            }
            Mismatch::Values { name, expected, actual } => write!(
                f,
                "Station data does not match for station {name}, expected {expected}, got {actual}!"
            ),
        }
    }
}

/// Compares two `{name=min/mean/max, ...}` reports entry by entry.
/// An empty result means they are identical.
pub fn compare(actual: &str, expected: &str) -> Result<Vec<Mismatch>, regex::Error> {
    if actual == expected {
        return Ok(Vec::new());
    }
    if actual.trim() == expected.trim() {
        return Ok(vec![Mismatch::Whitespace]);
    }

    let re = Regex::new(r"([^=]+)=([^,}]+)")?;
    let actual_groups = entries(&re, actual);
    let expected_groups = entries(&re, expected);

    if actual_groups.len() != expected_groups.len() {
        return Ok(vec![Mismatch::StationCount {
            expected: expected_groups.len(),
            actual: actual_groups.len(),
        }]);
    }

    let mismatches = actual_groups
        .into_iter()
        .zip(expected_groups)
        .filter_map(|((a_name, a_data), (e_name, e_data))| {
            if a_name != e_name {
                Some(Mismatch::Name {
                    expected: e_name.to_owned(),
                    actual: a_name.to_owned(),
                })
            } else if a_data != e_data {
                Some(Mismatch::Values {
                    name: e_name.to_owned(),
                    expected: e_data.to_owned(),
                    actual: a_data.to_owned(),
                })
            } else {
                None
            }
        })
        .collect();

    Ok(mismatches)
}

// Splits a report into (name, "min/mean/max") pairs.
fn entries<'a>(re: &Regex, report: &'a str) -> Vec<(&'a str, &'a str)> {
    re.captures_iter(report.trim())
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .map(|(name, data)| {
            let name = name.trim_start_matches(", ").trim_start_matches('{').trim();
            (name, data)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "{Oslo=-2.3/-2.3/-2.3, Tokyo=10.0/12.6/15.2}";

    #[test]
    fn identical_reports_match() {
        assert!(compare(REPORT, REPORT).unwrap().is_empty());
    }

    #[test]
    fn trailing_newline_is_whitespace() {
        let expected = format!("{REPORT}\n");
        let mismatches = compare(REPORT, &expected).unwrap();
        assert_eq!(mismatches, vec![Mismatch::Whitespace]);
        assert!(!mismatches[0].is_fatal());
    }

    #[test]
    fn entry_differences_are_fatal() {
        let actual = "{Oslo=-2.3/-2.3/-2.3}";
        assert!(compare(actual, REPORT).unwrap().iter().all(Mismatch::is_fatal));
    }

    #[test]
    fn reports_value_difference() {
        let actual = "{Oslo=-2.3/-2.3/-2.3, Tokyo=10.0/12.7/15.2}";
        assert_eq!(
            compare(actual, REPORT).unwrap(),
            vec![Mismatch::Values {
                name: "Tokyo".to_owned(),
                expected: "10.0/12.6/15.2".to_owned(),
                actual: "10.0/12.7/15.2".to_owned(),
            }]
        );
    }

    #[test]
    fn reports_name_difference() {
        let actual = "{Oslo=-2.3/-2.3/-2.3, Tokio=10.0/12.6/15.2}";
        let mismatches = compare(actual, REPORT).unwrap();
        assert_eq!(
            mismatches,
            vec![Mismatch::Name {
                expected: "Tokyo".to_owned(),
                actual: "Tokio".to_owned(),
            }]
        );
        assert_eq!(
            mismatches[0].to_string(),
            "Station names do not match, expected Tokyo, got Tokio!"
        );
    }

    #[test]
    fn reports_station_count() {
        let actual = "{Oslo=-2.3/-2.3/-2.3}";
        assert_eq!(
            compare(actual, REPORT).unwrap(),
            vec![Mismatch::StationCount { expected: 2, actual: 1 }]
        );
    }
}
