use crate::prelude::{Sample, SampleError};

/// Decodes raw line bytes and strips surrounding whitespace and line endings.
pub fn decode_line(raw: &[u8]) -> Result<&str, SampleError> {
    std::str::from_utf8(raw)
        .map(str::trim)
        .map_err(|err| SampleError::Encoding(err.to_string()))
}

/// Parses a `signal,envelope` line. Exactly two integer fields are accepted;
/// each field may carry its own surrounding whitespace.
pub fn parse_sample(line: &str) -> Result<Sample, SampleError> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 2 {
        return Err(SampleError::FieldCount {
            line: line.to_string(),
            found: fields.len(),
        });
    }

    let parse_field = |token: &str| {
        token
            .trim()
            .parse::<i64>()
            .map_err(|source| SampleError::InvalidInteger {
                line: line.to_string(),
                token: token.to_string(),
                source,
            })
    };

    Ok(Sample::new(parse_field(fields[0])?, parse_field(fields[1])?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_pair() {
        assert_eq!(parse_sample("12,25").unwrap(), Sample::new(12, 25));
        assert_eq!(parse_sample("  -3,0 \r").unwrap(), Sample::new(-3, 0));
        assert_eq!(parse_sample("10, 5").unwrap(), Sample::new(10, 5));
        assert_eq!(parse_sample("+7,-8").unwrap(), Sample::new(7, -8));
    }

    #[test]
    fn rejects_wrong_field_count() {
        for line in ["", "42", "1,2,3", "1,2,"] {
            assert!(
                matches!(parse_sample(line), Err(SampleError::FieldCount { .. })),
                "{line:?} should fail on field count"
            );
        }
        match parse_sample("1,2,3") {
            Err(SampleError::FieldCount { found, .. }) => assert_eq!(found, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_non_integer_fields() {
        for line in ["a,2", "1,b", "1.5,2", "1,", ",1", "1,99999999999999999999"] {
            assert!(
                matches!(parse_sample(line), Err(SampleError::InvalidInteger { .. })),
                "{line:?} should fail on integer parsing"
            );
        }
    }

    #[test]
    fn decode_line_trims_and_checks_utf8() {
        assert_eq!(decode_line(b"12,22\r\n").unwrap(), "12,22");
        assert_eq!(decode_line(b"   \n").unwrap(), "");
        assert!(matches!(
            decode_line(&[0xff, b',', b'1']),
            Err(SampleError::Encoding(_))
        ));
    }
}
