//! Address resolution for the three input shapes clients send.
//!
//! * structured object `{street1, city, state, zip, country}`
//! * legacy line `"street, city, ST ZIP, country"`
//! * free text with no separators, parsed best-effort
//!
//! Resolution never fails. A field that cannot be found is left empty and
//! reported later by the request validator, so a client sees every problem
//! in one round trip.

use crate::core::locale;
use crate::domain::model::{Address, AddressInput, StructuredAddress};
use regex::Regex;
use std::sync::OnceLock;

/// Fill-in values used by [`FreeTextGuessParser`] in permissive mode.
pub const PLACEHOLDER_CITY: &str = "Miami Gardens";
pub const PLACEHOLDER_STATE: &str = "FL";
pub const PLACEHOLDER_ZIP: &str = "33056";
pub const PLACEHOLDER_COUNTRY: &str = "US";

/// Input shape, decided purely from structure.
#[derive(Debug, Clone, Copy)]
pub enum AddressShape<'a> {
    Structured(&'a StructuredAddress),
    LegacyLine(&'a str),
    FreeText(&'a str),
}

pub fn classify(input: &AddressInput) -> AddressShape<'_> {
    match input {
        AddressInput::Structured(fields) => AddressShape::Structured(fields),
        AddressInput::Line(line) if line.contains(',') => AddressShape::LegacyLine(line),
        AddressInput::Line(line) => AddressShape::FreeText(line),
    }
}

pub trait AddressParser {
    type Input: ?Sized;

    /// Parse into an address whose fields are trimmed but not yet locale-normalized.
    fn parse(&self, input: &Self::Input) -> Address;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredAddressParser;

impl AddressParser for StructuredAddressParser {
    type Input = StructuredAddress;

    fn parse(&self, input: &StructuredAddress) -> Address {
        let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
        Address {
            street1: field(&input.street1),
            city: field(&input.city),
            state: field(&input.state),
            zip: field(&input.zip),
            country: field(&input.country),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLineParser;

impl LegacyLineParser {
    fn state_and_zip(part: &str) -> (String, String) {
        static CODE_ZIP: OnceLock<Regex> = OnceLock::new();
        static NAME_ZIP: OnceLock<Regex> = OnceLock::new();

        let code_zip = CODE_ZIP.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{2})\s+(\d{4,10}(?:-\d{4})?)$").expect("state/zip pattern")
        });
        if let Some(caps) = code_zip.captures(part) {
            return (caps[1].to_string(), caps[2].to_string());
        }

        // "Florida 33056"
        let name_zip = NAME_ZIP.get_or_init(|| {
            Regex::new(r"^(.+?)\s+(\d{4,10}(?:-\d{4})?)$").expect("state name/zip pattern")
        });
        if let Some(caps) = name_zip.captures(part) {
            return (caps[1].trim().to_string(), caps[2].to_string());
        }

        if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return (String::new(), part.to_string());
        }

        (part.to_string(), String::new())
    }
}

impl AddressParser for LegacyLineParser {
    type Input = str;

    fn parse(&self, line: &str) -> Address {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() > 4 {
            tracing::debug!(
                "Legacy address line has {} parts, ignoring everything after the 4th",
                parts.len()
            );
        }

        let part = |i: usize| parts.get(i).copied().unwrap_or_default();
        let (state, zip) = Self::state_and_zip(part(2));

        Address {
            street1: part(0).to_string(),
            city: part(1).to_string(),
            state,
            zip,
            country: part(3).to_string(),
        }
    }
}

/// Best-effort parser for addresses typed as one unstructured string.
///
/// In permissive mode city/state/zip that could not be extracted are filled
/// from the `PLACEHOLDER_*` constants. Strict mode leaves them empty so the
/// validator rejects the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeTextGuessParser {
    permissive: bool,
}

impl FreeTextGuessParser {
    pub fn new(permissive: bool) -> Self {
        Self { permissive }
    }

    fn full_pattern() -> &'static Regex {
        static FULL: OnceLock<Regex> = OnceLock::new();
        FULL.get_or_init(|| {
            Regex::new(
                r"(?i)^(?P<street>\d+\s.*?\b(?:st|street|ave|avenue|rd|road|blvd|boulevard|dr|drive|ln|lane|ct|court|cir|circle|way|pl|place|pkwy|parkway|hwy|highway|ter|terrace)\b\.?)\s+(?P<city>[a-z][a-z .'-]*?)\s+(?P<state>[a-z]{2})\s+(?P<zip>\d{5}(?:-\d{4})?)(?:\s+(?P<country>[a-z][a-z .]*))?$",
            )
            .expect("free text address pattern")
        })
    }

    fn state_zip_pattern() -> &'static Regex {
        static STATE_ZIP: OnceLock<Regex> = OnceLock::new();
        STATE_ZIP.get_or_init(|| {
            Regex::new(r"\b(?:(?P<state>[A-Za-z]{2})\s+)?(?P<zip>\d{5}(?:-\d{4})?)\b")
                .expect("state/zip extraction pattern")
        })
    }

    fn guess(text: &str) -> Address {
        if let Some(caps) = Self::full_pattern().captures(text) {
            let country = caps
                .name("country")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "US".to_string());
            return Address {
                street1: caps["street"].trim().to_string(),
                city: caps["city"].trim().to_string(),
                state: caps["state"].to_string(),
                zip: caps["zip"].to_string(),
                country,
            };
        }

        // 退而求其次：只抓 ZIP 與其前方的州代碼，剩下的當作街道
        match Self::state_zip_pattern().captures_iter(text).last() {
            Some(caps) => {
                let whole = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
                Address {
                    street1: text[..whole].trim().trim_end_matches(',').to_string(),
                    city: String::new(),
                    state: caps
                        .name("state")
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                    zip: caps["zip"].to_string(),
                    country: "US".to_string(),
                }
            }
            None => Address {
                street1: text.to_string(),
                ..Address::default()
            },
        }
    }
}

impl AddressParser for FreeTextGuessParser {
    type Input = str;

    fn parse(&self, text: &str) -> Address {
        let mut address = Self::guess(text.trim());
        if !self.permissive {
            return address;
        }

        let mut filled = Vec::new();
        for (field, placeholder, name) in [
            (&mut address.city, PLACEHOLDER_CITY, "city"),
            (&mut address.state, PLACEHOLDER_STATE, "state"),
            (&mut address.zip, PLACEHOLDER_ZIP, "zip"),
            (&mut address.country, PLACEHOLDER_COUNTRY, "country"),
        ] {
            if field.is_empty() {
                *field = placeholder.to_string();
                filled.push(name);
            }
        }
        if !filled.is_empty() {
            tracing::warn!(
                "⚠️ Permissive free-text address: filled {:?} with placeholder values",
                filled
            );
        }
        address
    }
}

/// Resolves any accepted address shape into a canonical [`Address`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressResolver {
    free_text: FreeTextGuessParser,
}

impl AddressResolver {
    pub fn new(permissive_free_text: bool) -> Self {
        Self {
            free_text: FreeTextGuessParser::new(permissive_free_text),
        }
    }

    pub fn resolve(&self, input: &AddressInput) -> Address {
        let shape = classify(input);
        let parsed = match shape {
            AddressShape::Structured(fields) => StructuredAddressParser.parse(fields),
            AddressShape::LegacyLine(line) => LegacyLineParser.parse(line),
            AddressShape::FreeText(text) => self.free_text.parse(text),
        };
        tracing::debug!("Resolved {} address: {:?}", shape_name(&shape), parsed);
        normalize_locale(parsed)
    }
}

fn shape_name(shape: &AddressShape<'_>) -> &'static str {
    match shape {
        AddressShape::Structured(_) => "structured",
        AddressShape::LegacyLine(_) => "legacy line",
        AddressShape::FreeText(_) => "free text",
    }
}

fn normalize_locale(mut address: Address) -> Address {
    if !address.country.is_empty() {
        address.country = locale::country(&address.country);
    }
    if !address.state.is_empty() {
        address.state = locale::state(&address.country, &address.state);
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(s: &str) -> AddressInput {
        AddressInput::Line(s.to_string())
    }

    fn address(street1: &str, city: &str, state: &str, zip: &str, country: &str) -> Address {
        Address {
            street1: street1.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: zip.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn test_classify_by_structure() {
        let structured = AddressInput::Structured(StructuredAddress::default());
        assert!(matches!(classify(&structured), AddressShape::Structured(_)));
        assert!(matches!(classify(&line("a, b")), AddressShape::LegacyLine("a, b")));
        assert!(matches!(classify(&line("a b")), AddressShape::FreeText("a b")));
    }

    #[test]
    fn test_legacy_line_round_trip() {
        let resolved = AddressResolver::default()
            .resolve(&line("20102 NW 27th Cir, Miami Gardens, FL 33056, US"));
        assert_eq!(
            resolved,
            address("20102 NW 27th Cir", "Miami Gardens", "FL", "33056", "US")
        );
    }

    #[test]
    fn test_legacy_line_missing_parts_stay_empty() {
        let resolved = LegacyLineParser.parse("1 Main St, Austin");
        assert_eq!(resolved, address("1 Main St", "Austin", "", "", ""));
    }

    #[test]
    fn test_legacy_line_state_name_and_zip_plus_four() {
        let resolved =
            AddressResolver::default().resolve(&line("1 Ocean Dr, Miami, Florida 33139-1234, USA"));
        assert_eq!(
            resolved,
            address("1 Ocean Dr", "Miami", "FL", "33139-1234", "US")
        );
    }

    #[test]
    fn test_legacy_line_part_without_zip() {
        assert_eq!(
            LegacyLineParser::state_and_zip("Jalisco"),
            ("Jalisco".to_string(), String::new())
        );
        assert_eq!(
            LegacyLineParser::state_and_zip("44100"),
            (String::new(), "44100".to_string())
        );
    }

    #[test]
    fn test_legacy_line_spanish_country() {
        let resolved =
            AddressResolver::default().resolve(&line("Av. Juárez 100, Guadalajara, jal 44100, México"));
        assert_eq!(resolved.country, "MX");
        assert_eq!(resolved.state, "JAL");
        assert_eq!(resolved.zip, "44100");
    }

    #[test]
    fn test_structured_is_identity_modulo_normalization() {
        let input = AddressInput::Structured(StructuredAddress {
            street1: Some("  417 Montgomery St ".to_string()),
            city: Some("San Francisco".to_string()),
            state: Some("california".to_string()),
            zip: Some("94104".to_string()),
            country: Some("us".to_string()),
        });
        assert_eq!(
            AddressResolver::default().resolve(&input),
            address("417 Montgomery St", "San Francisco", "CA", "94104", "US")
        );
    }

    #[test]
    fn test_free_text_full_match() {
        let resolved =
            AddressResolver::default().resolve(&line("20102 NW 27th Cir Miami Gardens FL 33056"));
        assert_eq!(
            resolved,
            address("20102 NW 27th Cir", "Miami Gardens", "FL", "33056", "US")
        );
    }

    #[test]
    fn test_free_text_partial_match_leaves_city_empty_in_strict_mode() {
        let resolved = AddressResolver::new(false).resolve(&line("Plaza Mayor 3 TX 75001"));
        assert_eq!(resolved, address("Plaza Mayor 3", "", "TX", "75001", "US"));
    }

    #[test]
    fn test_free_text_unparseable_strict_vs_permissive() {
        let strict = AddressResolver::new(false).resolve(&line("somewhere over the rainbow"));
        assert_eq!(strict, address("somewhere over the rainbow", "", "", "", ""));

        let permissive = AddressResolver::new(true).resolve(&line("somewhere over the rainbow"));
        assert_eq!(
            permissive,
            address(
                "somewhere over the rainbow",
                PLACEHOLDER_CITY,
                PLACEHOLDER_STATE,
                PLACEHOLDER_ZIP,
                PLACEHOLDER_COUNTRY
            )
        );
    }
}
