//! Line-oriented dictionary file parser.
//!
//! The grammar is the classic FreeRADIUS one: `#` starts a comment, blank
//! lines are ignored, and each remaining line is a whitespace-separated
//! directive with a case-insensitive keyword:
//!
//! ```text
//! ATTRIBUTE  <name> <code> <type>
//! VALUE      <attribute-name> <value-name> <integer>
//! VENDOR     <id> <name>
//! VENDORATTR <vendor-id> <name> <code> <type>
//! $INCLUDE   <path>
//! ```
//!
//! `type` is one of string, octets, integer, date, ipaddr, ipv6addr,
//! ipv6prefix. Anything else fails with a syntax error carrying the line
//! number.

use super::{AttributeDescriptor, Dictionary, DictionaryError};
use crate::attributes::ValueKind;
use std::fs;
use std::path::Path;

const MAX_INCLUDE_DEPTH: usize = 16;

/// Load a dictionary file, following `$INCLUDE` directives relative to the
/// including file. The whole file is read up front; no handle outlives the
/// call.
pub fn load_file(path: &Path) -> Result<Dictionary, DictionaryError> {
    let mut dict = Dictionary::new();
    load_into(&mut dict, path, 0)?;
    Ok(dict)
}

fn load_into(dict: &mut Dictionary, path: &Path, depth: usize) -> Result<(), DictionaryError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(DictionaryError::Syntax {
            file: path.display().to_string(),
            line: 0,
            message: format!("$INCLUDE nested deeper than {MAX_INCLUDE_DEPTH} levels"),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| DictionaryError::Io {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_into(dict, &text, &path.display().to_string(), Some((path, depth)))
}

/// Parse dictionary text into `dict`. `origin` is `Some((path, depth))`
/// when the text came from a file, enabling `$INCLUDE`.
pub(super) fn parse_into(
    dict: &mut Dictionary,
    text: &str,
    source: &str,
    origin: Option<(&Path, usize)>,
) -> Result<(), DictionaryError> {
    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let syntax = |message: String| DictionaryError::Syntax {
            file: source.to_string(),
            line: line_no,
            message,
        };

        let line = match raw_line.split_once('#') {
            Some((before, _)) => before,
            None => raw_line,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match tokens[0].to_ascii_uppercase().as_str() {
            "ATTRIBUTE" => {
                let [name, code, kind] = expect_args(&tokens).map_err(&syntax)?;
                let code = parse_code(code).map_err(&syntax)?;
                let kind = parse_kind(kind).map_err(&syntax)?;
                dict.add_attribute(AttributeDescriptor::standard(name, code, kind))?;
            }
            "VALUE" => {
                let [attr, value_name, value] = expect_args(&tokens).map_err(&syntax)?;
                let value: u32 = value
                    .parse()
                    .map_err(|_| syntax(format!("{value:?} is not a 32-bit integer")))?;
                dict.add_value(attr, value_name, value)?;
            }
            "VENDOR" => {
                let [id, name] = expect_args(&tokens).map_err(&syntax)?;
                let id = parse_vendor_id(id, &syntax)?;
                dict.add_vendor(id, name)?;
            }
            "VENDORATTR" => {
                let [vendor, name, code, kind] = expect_args(&tokens).map_err(&syntax)?;
                let vendor = parse_vendor_id(vendor, &syntax)?;
                let code = parse_code(code).map_err(&syntax)?;
                let kind = parse_kind(kind).map_err(&syntax)?;
                dict.add_attribute(AttributeDescriptor::vendor(name, vendor, code, kind))?;
            }
            "$INCLUDE" => {
                let [target] = expect_args(&tokens).map_err(&syntax)?;
                let (path, depth) = origin
                    .ok_or_else(|| syntax("$INCLUDE is only valid in file input".to_string()))?;
                let resolved = match path.parent() {
                    Some(dir) => dir.join(target),
                    None => Path::new(target).to_path_buf(),
                };
                load_into(dict, &resolved, depth + 1)?;
            }
            other => {
                return Err(syntax(format!("unrecognized directive {other:?}")));
            }
        }
    }
    Ok(())
}

fn expect_args<'a, const N: usize>(tokens: &[&'a str]) -> Result<[&'a str; N], String> {
    if tokens.len() != N + 1 {
        return Err(format!(
            "{} takes {N} arguments, found {}",
            tokens[0],
            tokens.len() - 1
        ));
    }
    let mut out = [""; N];
    out.copy_from_slice(&tokens[1..]);
    Ok(out)
}

fn parse_code(token: &str) -> Result<u8, String> {
    token
        .parse::<u8>()
        .ok()
        .filter(|c| *c != 0)
        .ok_or_else(|| format!("{token:?} is not an attribute code (1-255)"))
}

fn parse_vendor_id(
    token: &str,
    syntax: &impl Fn(String) -> DictionaryError,
) -> Result<u32, DictionaryError> {
    let wide: i64 = token
        .parse()
        .map_err(|_| syntax(format!("{token:?} is not a vendor id")))?;
    u32::try_from(wide).map_err(|_| DictionaryError::InvalidVendorId(wide))
}

fn parse_kind(token: &str) -> Result<ValueKind, String> {
    match token.to_ascii_lowercase().as_str() {
        "string" => Ok(ValueKind::String),
        "octets" => Ok(ValueKind::Octets),
        "integer" => Ok(ValueKind::Integer),
        "date" => Ok(ValueKind::Date),
        "ipaddr" => Ok(ValueKind::Ipv4),
        "ipv6addr" => Ok(ValueKind::Ipv6),
        "ipv6prefix" => Ok(ValueKind::Ipv6Prefix),
        other => Err(format!("unknown attribute type {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_directives() {
        let text = "\
# vendor declarations
VENDOR 311 Microsoft
vendorattr 311 MS-CHAP-Challenge 11 octets

ATTRIBUTE User-Name 1 string
ATTRIBUTE Acct-Status-Type 40 integer
VALUE Acct-Status-Type Start 1   # trailing comment
VALUE Acct-Status-Type Stop 2
";
        let mut dict = Dictionary::new();
        dict.parse(text, "test").unwrap();

        assert_eq!(dict.vendor_name(311), Some("Microsoft"));
        let desc = dict.attribute_by_name("MS-CHAP-Challenge").unwrap();
        assert_eq!((desc.vendor, desc.code), (Some(311), 11));
        assert_eq!(
            dict.attribute_by_name("Acct-Status-Type")
                .unwrap()
                .value_by_name("Stop"),
            Some(2)
        );
    }

    #[test]
    fn reports_line_numbers() {
        let mut dict = Dictionary::new();
        let err = dict.parse("ATTRIBUTE A 1 string\nBOGUS x\n", "d").unwrap_err();
        assert_eq!(
            err,
            DictionaryError::Syntax {
                file: "d".into(),
                line: 2,
                message: "unrecognized directive \"BOGUS\"".into()
            }
        );
    }

    #[test]
    fn rejects_bad_types_and_codes() {
        let mut dict = Dictionary::new();
        assert!(matches!(
            dict.parse("ATTRIBUTE A 1 blob\n", "d").unwrap_err(),
            DictionaryError::Syntax { line: 1, .. }
        ));
        assert!(matches!(
            dict.parse("ATTRIBUTE A 0 string\n", "d").unwrap_err(),
            DictionaryError::Syntax { .. }
        ));
        assert!(matches!(
            dict.parse("ATTRIBUTE A 300 string\n", "d").unwrap_err(),
            DictionaryError::Syntax { .. }
        ));
    }

    #[test]
    fn negative_vendor_id_is_its_own_error() {
        let mut dict = Dictionary::new();
        let err = dict.parse("VENDOR -5 Nobody\n", "d").unwrap_err();
        assert_eq!(err, DictionaryError::InvalidVendorId(-5));
    }

    #[test]
    fn value_for_unknown_attribute_fails() {
        let mut dict = Dictionary::new();
        let err = dict.parse("VALUE Missing Start 1\n", "d").unwrap_err();
        assert_eq!(err, DictionaryError::UnknownAttributeName("Missing".into()));
    }

    #[test]
    fn include_follows_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("main.dict"),
            "ATTRIBUTE A 1 string\n$INCLUDE extra.dict\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("extra.dict"), "ATTRIBUTE B 2 integer\n").unwrap();

        let dict = load_file(&dir.path().join("main.dict")).unwrap();
        assert!(dict.attribute_by_name("A").is_some());
        assert_eq!(dict.attribute_by_name("B").unwrap().kind, ValueKind::Integer);
    }
}
