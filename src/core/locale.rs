//! Country and state name normalization.
//!
//! Clients send country and state either as codes or as free-text names in
//! English or Spanish. Both lookups are case-insensitive and ignore accents,
//! dots and repeated whitespace.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_COUNTRY: &str = "US";

static COUNTRY_SYNONYMS: &[(&str, &str)] = &[
    ("usa", "US"),
    ("us", "US"),
    ("u s a", "US"),
    ("united states", "US"),
    ("united states of america", "US"),
    ("estados unidos", "US"),
    ("estados unidos de america", "US"),
    ("eeuu", "US"),
    ("ee uu", "US"),
    ("mexico", "MX"),
    ("estados unidos mexicanos", "MX"),
    ("canada", "CA"),
    ("guatemala", "GT"),
    ("el salvador", "SV"),
    ("honduras", "HN"),
    ("nicaragua", "NI"),
    ("costa rica", "CR"),
    ("panama", "PA"),
    ("colombia", "CO"),
    ("venezuela", "VE"),
    ("ecuador", "EC"),
    ("peru", "PE"),
    ("bolivia", "BO"),
    ("chile", "CL"),
    ("argentina", "AR"),
    ("uruguay", "UY"),
    ("paraguay", "PY"),
    ("brazil", "BR"),
    ("brasil", "BR"),
    ("puerto rico", "PR"),
    ("dominican republic", "DO"),
    ("republica dominicana", "DO"),
    ("cuba", "CU"),
    ("spain", "ES"),
    ("espana", "ES"),
    ("united kingdom", "GB"),
    ("reino unido", "GB"),
    ("great britain", "GB"),
    ("france", "FR"),
    ("francia", "FR"),
    ("germany", "DE"),
    ("alemania", "DE"),
    ("italy", "IT"),
    ("italia", "IT"),
    ("portugal", "PT"),
];

static US_STATE_SYNONYMS: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("hawai", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("luisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("misisipi", "MS"),
    ("missouri", "MO"),
    ("misuri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("nuevo hampshire", "NH"),
    ("new jersey", "NJ"),
    ("nueva jersey", "NJ"),
    ("new mexico", "NM"),
    ("nuevo mexico", "NM"),
    ("new york", "NY"),
    ("nueva york", "NY"),
    ("north carolina", "NC"),
    ("carolina del norte", "NC"),
    ("north dakota", "ND"),
    ("dakota del norte", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("pensilvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("carolina del sur", "SC"),
    ("south dakota", "SD"),
    ("dakota del sur", "SD"),
    ("tennessee", "TN"),
    ("tenesi", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("virginia occidental", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
    ("district of columbia", "DC"),
    ("distrito de columbia", "DC"),
    ("washington dc", "DC"),
    ("washington d c", "DC"),
];

/// Normalize a country name or code to ISO 3166-1 alpha-2.
///
/// Unknown names fall back to [`DEFAULT_COUNTRY`].
pub fn country(input: &str) -> String {
    let trimmed = input.trim();
    if is_two_letter_code(trimmed) {
        return trimmed.to_ascii_uppercase();
    }

    let key = fold(trimmed);
    match lookup(COUNTRY_SYNONYMS, &key) {
        Some(code) => code.to_string(),
        None => {
            tracing::debug!("Unknown country '{}', defaulting to {}", trimmed, DEFAULT_COUNTRY);
            DEFAULT_COUNTRY.to_string()
        }
    }
}

/// Normalize a state for the given (already normalized) country.
pub fn state(country: &str, input: &str) -> String {
    let trimmed = input.trim();
    if !country.eq_ignore_ascii_case("US") || is_two_letter_code(trimmed) {
        return trimmed.to_uppercase();
    }

    lookup(US_STATE_SYNONYMS, &fold(trimmed))
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_uppercase())
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| *code)
}

fn is_two_letter_code(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// 小寫、去重音、去句點、壓縮空白
fn fold(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            '.' => None,
            c if c.is_whitespace() || c == '-' || c == '_' => Some(' '),
            c => Some(c),
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
