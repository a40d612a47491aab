use crate::data_source::{AdapterFuture, RawRecord, SourceAdapter};
use crate::normalize::fallback_source_id;
use crate::Marketplace;

const PLACEHOLDER_BASE_PRICE: u64 = 5_000;
const PLACEHOLDER_PRICE_SPREAD: u64 = 5_000;

#[derive(Debug, Clone, Copy)]
struct CatalogItem {
    category: &'static str,
    id: &'static str,
    name: &'static str,
    price: i64,
    capacity: i64,
    unit: &'static str,
    sugar_per_100g: Option<f64>,
}

const fn item(
    category: &'static str,
    id: &'static str,
    name: &'static str,
    price: i64,
    capacity: i64,
    unit: &'static str,
    sugar_per_100g: Option<f64>,
) -> CatalogItem {
    CatalogItem {
        category,
        id,
        name,
        price,
        capacity,
        unit,
        sugar_per_100g,
    }
}

const COUPANG_ITEMS: &[CatalogItem] = &[
    item("우유", "cp-milk-200x24", "서울우유 멸균우유 200ml x 24팩", 18_900, 4_800, "ml", Some(4.5)),
    item("우유", "cp-milk-1lx12", "매일우유 1L x 12개", 31_000, 12_000, "ml", Some(4.7)),
    item("양파", "cp-onion-3kg", "곰곰 국내산 양파 3kg", 6_500, 3_000, "g", Some(4.1)),
    item("소고기", "cp-beef-300", "곰곰 호주산 소고기 국거리 300g", 9_900, 300, "g", Some(0.0)),
    item("계란", "cp-egg-30", "곰곰 신선한 계란 특란 30구", 7_990, 30, "개", Some(0.4)),
];

const BMART_ITEMS: &[CatalogItem] = &[
    item("우유", "bm-milk-easy-900", "[B마트 전용] 배민이지 우유 900ml", 2_690, 900, "ml", Some(4.6)),
    item("우유", "bm-milk-seoul-1l", "서울우유 나100% 1L", 2_980, 1_000, "ml", Some(4.5)),
    item("우유", "bm-milk-maeil-900", "매일우유 오리지널 900ml", 2_850, 900, "ml", Some(4.8)),
    item("양파", "bm-onion-1.5kg", "국산 흙강 양파 1.5kg망", 3_980, 1_500, "g", Some(4.2)),
    item("양파", "bm-onion-peeled-2", "깐 양파 2입 (팩)", 2_400, 2, "개", Some(4.0)),
    item("소고기", "bm-beef-hanwoo-200", "한우 소고기 국거리 200g", 12_900, 200, "g", Some(0.0)),
    item("소고기", "bm-beef-chuck-300", "호주산 소고기 척아이롤 300g", 8_900, 300, "g", None),
];

const KURLY_ITEMS: &[CatalogItem] = &[
    item("우유", "ku-5051234", "[서울우유] 나100% 우유 1L", 2_990, 1_000, "ml", None),
    item("양파", "ku-5060011", "[KF365] 양파 1.5kg", 3_990, 1_500, "g", None),
    item("소고기", "ku-5070042", "[KF365] 1+등급 한우 소고기 국거리 300g", 15_900, 300, "g", None),
];

const NAVER_ITEMS: &[CatalogItem] = &[
    item("우유", "nv-88120001", "서울우유 나100% 우유 1L", 2_890, 1_000, "ml", None),
    item("양파", "nv-88120002", "무안 햇양파 5kg", 8_900, 5_000, "g", None),
    item("소고기", "nv-88120003", "미국산 소고기 부채살 500g", 13_900, 500, "g", None),
];

/// Deterministic in-memory catalog standing in for a marketplace whose
/// product data has no public API.
///
/// Items are keyed by staple category and returned when the keyword and
/// category contain one another. The B-mart catalog synthesizes a
/// `[B마트 신선] <keyword>` placeholder when nothing matches.
#[derive(Debug, Clone)]
pub struct CatalogAdapter {
    marketplace: Marketplace,
    items: &'static [CatalogItem],
    placeholder: bool,
    nutrition: bool,
}

impl CatalogAdapter {
    pub fn for_marketplace(marketplace: Marketplace) -> Self {
        match marketplace {
            Marketplace::Coupang => Self::coupang(),
            Marketplace::Kurly => Self::kurly(),
            Marketplace::Bmart => Self::bmart(),
            Marketplace::Naver => Self::naver(),
        }
    }

    pub fn coupang() -> Self {
        Self {
            marketplace: Marketplace::Coupang,
            items: COUPANG_ITEMS,
            placeholder: false,
            nutrition: true,
        }
    }

    pub fn bmart() -> Self {
        Self {
            marketplace: Marketplace::Bmart,
            items: BMART_ITEMS,
            placeholder: true,
            nutrition: true,
        }
    }

    pub fn kurly() -> Self {
        Self {
            marketplace: Marketplace::Kurly,
            items: KURLY_ITEMS,
            placeholder: false,
            nutrition: false,
        }
    }

    pub fn naver() -> Self {
        Self {
            marketplace: Marketplace::Naver,
            items: NAVER_ITEMS,
            placeholder: false,
            nutrition: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    fn lookup(&self, keyword: &str) -> Vec<RawRecord> {
        let needle = keyword
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect::<String>();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut records = self
            .items
            .iter()
            .filter(|item| needle.contains(item.category) || item.category.contains(&needle))
            .map(|item| {
                let record = RawRecord::new(item.name, item.price)
                    .with_source_id(item.id)
                    .with_capacity(item.capacity, item.unit);
                match item.sugar_per_100g {
                    Some(sugar) => record.with_sugar_per_100g(sugar),
                    None => record,
                }
            })
            .collect::<Vec<_>>();

        if records.is_empty() && self.placeholder {
            records.push(placeholder_record(keyword.trim()));
        }
        records
    }
}

fn placeholder_record(keyword: &str) -> RawRecord {
    let id = fallback_source_id(keyword);
    let seed = id
        .trim_start_matches("fnv-")
        .get(..8)
        .and_then(|prefix| u64::from_str_radix(prefix, 16).ok())
        .unwrap_or_default();
    let price = PLACEHOLDER_BASE_PRICE + seed % PLACEHOLDER_PRICE_SPREAD;

    RawRecord::new(
        format!("[B마트 신선] {keyword}"),
        i64::try_from(price).unwrap_or(i64::MAX),
    )
    .with_source_id(format!("bmart-sim-{}", id.trim_start_matches("fnv-")))
}

impl SourceAdapter for CatalogAdapter {
    fn name(&self) -> &'static str {
        match self.marketplace {
            Marketplace::Coupang => "coupang-catalog",
            Marketplace::Kurly => "kurly-catalog",
            Marketplace::Bmart => "bmart-catalog",
            Marketplace::Naver => "naver-catalog",
        }
    }

    fn fetch<'a>(&'a self, keyword: &'a str) -> AdapterFuture<'a> {
        let records = self.lookup(keyword);
        Box::pin(async move { Ok(records) })
    }

    fn reports_nutrition(&self) -> bool {
        self.nutrition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_seeded_items_for_a_staple() {
        let records = CatalogAdapter::bmart().fetch("우유").await.expect("catalog never fails");

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.capacity.is_some()));
        assert_eq!(records[1].name, "서울우유 나100% 1L");
        assert_eq!(records[1].capacity, Some(1000));
    }

    #[tokio::test]
    async fn longer_keyword_still_hits_its_category() {
        let records = CatalogAdapter::coupang()
            .fetch("국산 양파")
            .await
            .expect("catalog never fails");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_id.as_deref(), Some("cp-onion-3kg"));
    }

    #[tokio::test]
    async fn bmart_placeholder_is_deterministic_and_bounded() {
        let adapter = CatalogAdapter::bmart();
        let first = adapter.fetch("아보카도").await.expect("catalog never fails");
        let second = adapter.fetch("아보카도").await.expect("catalog never fails");

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "[B마트 신선] 아보카도");
        assert!((5_000..10_000).contains(&first[0].price));
    }

    #[tokio::test]
    async fn unknown_keyword_without_placeholder_is_empty() {
        let records = CatalogAdapter::coupang().fetch("xyz123").await.expect("catalog never fails");
        assert!(records.is_empty());

        let records = CatalogAdapter::bmart()
            .with_placeholder(false)
            .fetch("xyz123")
            .await
            .expect("catalog never fails");
        assert!(records.is_empty());
    }
}
