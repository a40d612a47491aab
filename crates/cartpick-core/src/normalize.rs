//! Raw record to candidate product normalization.

use std::sync::OnceLock;

use regex::Regex;

use crate::{CandidateProduct, Marketplace, RawRecord, ValidationError};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Capacity parsed out of a product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCapacity {
    pub units: i64,
    pub label: &'static str,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn measure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*(kg|ml|l|g)(?:[^a-z]|$)")
            .expect("valid regex")
    })
}

fn multipack_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[xX×*]\s*(\d+)").expect("valid regex"))
}

fn count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\s*(?:개입|개|입|구|봉)").expect("valid regex"))
}

/// Strips markup (Naver wraps matches in `<b>`), decodes the common entities
/// and collapses whitespace. Brackets and marketplace prefixes are kept.
pub fn clean_name(raw: &str) -> String {
    let stripped = tag_pattern().replace_all(raw, "");
    let decoded = stripped
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the per-item capacity from a product name.
///
/// Volumes normalize to millilitres, weights to grams. A trailing multipack
/// count (`200ml x 24팩`) multiplies the measure. Without a usable measure,
/// an item count (`2입`, `30구`) is used. Thousands separators (`1,000ml`)
/// are accepted. Values that do not fit `i64` count as unparsed.
pub fn parse_capacity(name: &str) -> Option<ParsedCapacity> {
    parse_measure(name).or_else(|| parse_count(name))
}

fn parse_measure(name: &str) -> Option<ParsedCapacity> {
    let captures = measure_pattern().captures(name)?;
    let amount = captures
        .get(1)?
        .as_str()
        .replace(',', "")
        .parse::<f64>()
        .ok()?;
    let unit = captures.get(2)?;
    let (factor, label) = match unit.as_str().to_ascii_lowercase().as_str() {
        "kg" => (1000.0, "g"),
        "l" => (1000.0, "ml"),
        "ml" => (1.0, "ml"),
        _ => (1.0, "g"),
    };

    let packs = multipack_pattern()
        .captures(&name[unit.end()..])
        .and_then(|packs| packs.get(1)?.as_str().parse::<i64>().ok())
        .filter(|packs| *packs >= 1)
        .unwrap_or(1);

    let units = whole_units(amount * factor)?.checked_mul(packs)?;
    (units >= 1).then_some(ParsedCapacity { units, label })
}

fn parse_count(name: &str) -> Option<ParsedCapacity> {
    let count = count_pattern()
        .captures(name)?
        .get(1)?
        .as_str()
        .parse::<i64>()
        .ok()?;
    (count >= 1).then_some(ParsedCapacity {
        units: count,
        label: "개",
    })
}

fn whole_units(value: f64) -> Option<i64> {
    let rounded = value.round();
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    (rounded.is_finite() && rounded >= 0.0 && rounded < 9_223_372_036_854_775_808.0)
        .then_some(rounded as i64)
}

/// Deterministic identifier for records that come without one.
pub fn fallback_source_id(name: &str) -> String {
    let hash = name.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    format!("fnv-{hash:016x}")
}

/// Builds a candidate tagged with `marketplace` from an adapter record.
///
/// # Errors
///
/// Returns [`ValidationError`] for records that break candidate invariants
/// (empty name, negative price). Strategies drop such records.
pub fn to_candidate(
    marketplace: Marketplace,
    record: RawRecord,
    keyword: &str,
) -> Result<CandidateProduct, ValidationError> {
    let name = clean_name(&record.name);
    if name.is_empty() {
        return Err(ValidationError::EmptyProductName);
    }
    if record.price < 0 {
        return Err(ValidationError::NegativePrice {
            value: record.price,
        });
    }

    let parsed = parse_capacity(&name);
    let (capacity, parsed_label) = match record.capacity.filter(|capacity| *capacity >= 1) {
        Some(capacity) => (capacity, None),
        None => match parsed {
            Some(parsed) => (parsed.units, Some(parsed.label)),
            None => (1, None),
        },
    };
    let unit_label = record
        .unit
        .filter(|unit| !unit.trim().is_empty())
        .or_else(|| parsed_label.map(String::from))
        .unwrap_or_else(|| String::from("개"));

    let source_id = record
        .source_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| fallback_source_id(&name));
    let source_url = record
        .url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| marketplace.search_url(keyword));

    CandidateProduct::new(marketplace, source_id, name, record.price, capacity)?
        .with_unit_label(unit_label)
        .with_in_stock(record.in_stock.unwrap_or(true))
        .with_source_url(source_url)
        .with_sugar_per_100g(record.sugar_per_100g)
}
