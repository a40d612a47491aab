//! Heuristic relevance check for raw marketplace results.
//!
//! Upstream searches return accessory SKUs and unrelated products that merely
//! share a substring with the keyword. [`is_relevant`] rejects the obvious
//! false positives while staying loose enough to keep terse product names.
//!
//! Rules, on lowercased input with all whitespace removed. The first rule
//! that decides wins:
//!
//! 1. a keyword of at most one character is a plain substring test;
//! 2. every space separated keyword token (or the token without a trailing
//!    `고기`) appears in the name: accept. A bare `고기` token has no
//!    shortened form, so it must appear as is;
//! 3. the name (two characters or more) is contained in the keyword: accept;
//! 4. an accessory term found in the name but absent from the keyword:
//!    reject;
//! 5. the first two keyword characters appear in the name, or failing that
//!    the first character does.
//!
//! The veto only guards the loose fallback. A name that carries every
//! keyword token is accepted even when it also names an accessory.

/// Accessory terms that mark a result as a non-food SKU.
pub const ACCESSORY_TERMS: [&str; 15] = [
    "배터리", "필터", "공병", "박스", "케이스", "건전지", "가이드", "설명서", "battery", "filter",
    "emptybottle", "box", "case", "guide", "manual",
];

const MEAT_SUFFIX: &str = "고기";

/// Returns whether `candidate_name` is a legitimate match for `keyword`.
pub fn is_relevant(candidate_name: &str, keyword: &str) -> bool {
    let name = clean(candidate_name);
    let cleaned_keyword = clean(keyword);

    if cleaned_keyword.chars().count() <= 1 {
        return name.contains(&cleaned_keyword);
    }

    if all_tokens_match(&name, keyword) {
        return true;
    }

    if name.chars().count() >= 2 && cleaned_keyword.contains(&name) {
        return true;
    }

    if has_foreign_accessory_term(&name, &cleaned_keyword) {
        return false;
    }

    let prefix = cleaned_keyword.chars().take(2).collect::<String>();
    if name.contains(&prefix) {
        return true;
    }

    let first = cleaned_keyword.chars().take(1).collect::<String>();
    name.contains(&first)
}

/// Returns the accessory term that would veto `candidate_name`, if any.
pub fn vetoing_term(candidate_name: &str, keyword: &str) -> Option<&'static str> {
    let name = clean(candidate_name);
    let keyword = clean(keyword);
    ACCESSORY_TERMS
        .iter()
        .copied()
        .find(|term| name.contains(term) && !keyword.contains(term))
}

fn has_foreign_accessory_term(name: &str, keyword: &str) -> bool {
    ACCESSORY_TERMS
        .iter()
        .any(|term| name.contains(term) && !keyword.contains(term))
}

fn all_tokens_match(name: &str, keyword: &str) -> bool {
    let mut tokens = keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .peekable();
    if tokens.peek().is_none() {
        return false;
    }

    tokens.all(|token| {
        if name.contains(&token) {
            return true;
        }
        token
            .strip_suffix(MEAT_SUFFIX)
            .filter(|short| !short.is_empty())
            .is_some_and(|short| name.contains(short))
    })
}

fn clean(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_equal_to_keyword_is_relevant() {
        for keyword in ["우유", "양파", "소고기", "Greek Yogurt", "a"] {
            assert!(is_relevant(keyword, keyword), "keyword {keyword}");
        }
    }

    #[test]
    fn single_character_keyword_is_plain_containment() {
        assert!(is_relevant("국산 무 1개", "무"));
        assert!(!is_relevant("양파 1.5kg", "무"));
        assert!(is_relevant("AAA 배터리", "a"));
    }

    #[test]
    fn tokens_match_with_meat_suffix_stripped() {
        assert!(is_relevant("한우 소 국거리 200g", "소고기"));
        assert!(is_relevant("호주산 돼지 앞다리", "돼지고기 앞다리"));
    }

    #[test]
    fn bare_meat_keyword_needs_the_word_itself() {
        assert!(is_relevant("돼지고기 앞다리살 500g", "고기"));
        assert!(!is_relevant("서울우유 나100% 1L", "고기"));
    }

    #[test]
    fn whitespace_and_case_are_ignored() {
        assert!(is_relevant("서울 우유 나100% 1L", "서울우유"));
        assert!(is_relevant("GREEK yogurt 450g", "greek yogurt"));
    }

    #[test]
    fn reverse_containment_accepts_terse_names() {
        assert!(is_relevant("대파", "국산 대파 한단"));
    }

    #[test]
    fn accessory_term_vetoes_loose_matches() {
        assert!(!is_relevant("battery guide for onion-peeler", "양파"));
        assert!(!is_relevant("battery guide for onion-peeler", "onion peeler set"));
        assert!(!is_relevant("우유 거품기 건전지", "우유식빵"));
        assert_eq!(vetoing_term("정수기 필터 우유맛", "우유"), Some("필터"));
    }

    #[test]
    fn full_token_match_is_decided_before_the_veto() {
        assert!(is_relevant("우유 공병 10개", "우유"));
        assert!(is_relevant("양파 껍질 벗기기 가이드", "양파"));
    }

    #[test]
    fn accessory_term_shared_with_keyword_does_not_veto() {
        assert!(is_relevant("브리타 정수기 필터 3개입", "정수기 필터"));
        assert_eq!(vetoing_term("브리타 정수기 필터", "정수기 필터"), None);
    }

    #[test]
    fn veto_takes_precedence_over_loose_prefix_match() {
        // "우유" prefix is present, but "케이스" is not part of the keyword.
        assert!(!is_relevant("우유팩 보관 케이스", "우유식빵"));
        assert!(is_relevant("우유팩 보관함", "우유식빵"));
    }

    #[test]
    fn loose_fallback_uses_first_character() {
        assert!(is_relevant("양배추 1통", "양상추"));
        assert!(!is_relevant("블렌더 믹서기", "양상추"));
    }

    #[test]
    fn verdict_is_deterministic() {
        let name = "[B마트 신선] 국산 양파 1.5kg망";
        let first = is_relevant(name, "양파");
        for _ in 0..10 {
            assert_eq!(is_relevant(name, "양파"), first);
        }
    }
}
