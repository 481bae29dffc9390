//! Country token normalization for address strings.
//!
//! Tokens are uppercase letters only (`"UNITEDSTATES"`, `"CANADA"`), so two
//! spellings of the same country compare equal after normalization.

const UNITED_STATES: &str = "UNITEDSTATES";
const CANADA: &str = "CANADA";

/// Aliases checked before region codes, so `"CA"` is Canada, not California.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("US", UNITED_STATES),
    ("USA", UNITED_STATES),
    ("AMERICA", UNITED_STATES),
    ("UNITEDSTATESOFAMERICA", UNITED_STATES),
    ("CA", CANADA),
    ("CAN", CANADA),
    ("UK", "UNITEDKINGDOM"),
    ("GB", "UNITEDKINGDOM"),
    ("GBR", "UNITEDKINGDOM"),
    ("BRITAIN", "UNITEDKINGDOM"),
    ("GREATBRITAIN", "UNITEDKINGDOM"),
    ("ENGLAND", "UNITEDKINGDOM"),
    ("SCOTLAND", "UNITEDKINGDOM"),
    ("WALES", "UNITEDKINGDOM"),
    ("NORTHERNIRELAND", "UNITEDKINGDOM"),
    ("UAE", "UNITEDARABEMIRATES"),
    ("MX", "MEXICO"),
    ("MEX", "MEXICO"),
    ("MÉXICO", "MEXICO"),
    ("FR", "FRANCE"),
    ("DEUTSCHLAND", "GERMANY"),
    ("ESPAÑA", "SPAIN"),
    ("ITALIA", "ITALY"),
    ("NEDERLAND", "NETHERLANDS"),
    ("HOLLAND", "NETHERLANDS"),
    ("THENETHERLANDS", "NETHERLANDS"),
];

/// US states, DC and territories that show up in geocoded addresses.
const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "PR",
];

const CANADIAN_PROVINCE_CODES: &[&str] = &[
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

/// Country tokens `extract_country` accepts from the tail of an address.
const KNOWN_COUNTRIES: &[&str] = &[
    UNITED_STATES, CANADA, "MEXICO", "UNITEDKINGDOM", "IRELAND", "FRANCE", "GERMANY",
    "SPAIN", "PORTUGAL", "ITALY", "NETHERLANDS", "BELGIUM", "LUXEMBOURG", "SWITZERLAND",
    "AUSTRIA", "DENMARK", "NORWAY", "SWEDEN", "FINLAND", "ICELAND", "POLAND", "CZECHIA",
    "CZECHREPUBLIC", "HUNGARY", "GREECE", "TURKEY", "CROATIA", "MONACO", "ISRAEL",
    "UNITEDARABEMIRATES", "QATAR", "SAUDIARABIA", "EGYPT", "MOROCCO", "SOUTHAFRICA",
    "INDIA", "CHINA", "JAPAN", "SOUTHKOREA", "SINGAPORE", "THAILAND", "AUSTRALIA",
    "NEWZEALAND", "BRAZIL", "ARGENTINA", "CHILE", "COLOMBIA", "PERU", "COSTARICA",
    "PANAMA", "BAHAMAS", "JAMAICA", "DOMINICANREPUBLIC", "PUERTORICO",
];

/// Normalize a country, state or province string into a country token.
///
/// Digits, punctuation and whitespace are stripped (`"France75001"` ->
/// `"FRANCE"`). Returns `None` when nothing is left.
pub fn normalize_country(raw: &str) -> Option<String> {
    let token: String = raw
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect();
    if token.is_empty() {
        return None;
    }

    if let Some((_, country)) = COUNTRY_ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Some((*country).to_string());
    }
    if US_STATE_CODES.contains(&token.as_str()) {
        return Some(UNITED_STATES.to_string());
    }
    if CANADIAN_PROVINCE_CODES.contains(&token.as_str()) {
        return Some(CANADA.to_string());
    }
    Some(token)
}

/// Country of a free-text address, read from its last comma-separated part.
///
/// `"1 Main St, Boston, MA 02110, USA"` -> `UNITEDSTATES`;
/// `"10 Rue de Rivoli, Paris 75001, France"` -> `FRANCE`.
/// A single-part address (`"Fenway"`) carries no country, and neither does
/// one ending in a city (`"123 Main St, Boston"`).
pub fn extract_country(address: &str) -> Option<String> {
    if !address.contains(',') {
        return None;
    }
    address
        .rsplit(',')
        .map(str::trim)
        .find(|part| part.chars().any(char::is_alphabetic))
        .and_then(normalize_country)
        .filter(|token| KNOWN_COUNTRIES.contains(&token.as_str()))
}
