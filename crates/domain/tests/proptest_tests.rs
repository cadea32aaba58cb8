//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use domain::value_objects::{EmailAddress, MAX_SEARCH_BUDGET, ReportWindow, SearchBudget};
use domain::{ContentBlock, transcript::joined_text};
use proptest::prelude::*;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 .. roughly 2090
    (0i64..33_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
    })
}

// ============================================================================
// ReportWindow Property Tests
// ============================================================================

mod report_window_tests {
    use super::*;

    proptest! {
        #[test]
        fn previous_week_is_always_monday_to_sunday(today in any_date()) {
            let window = ReportWindow::previous_week(today);
            prop_assert_eq!(window.start().weekday(), Weekday::Mon);
            prop_assert_eq!(window.end().weekday(), Weekday::Sun);
            prop_assert_eq!(window.end() - window.start(), Duration::days(6));
        }

        #[test]
        fn previous_week_ends_before_today(today in any_date()) {
            let window = ReportWindow::previous_week(today);
            prop_assert!(window.end() < today);
            prop_assert!(today - window.end() <= Duration::days(7));
        }

        #[test]
        fn new_accepts_ordered_ranges(start in any_date(), len in 0i64..60) {
            let end = start + Duration::days(len);
            let window = ReportWindow::new(start, end);
            prop_assert!(window.is_ok());
            let window = window.unwrap();
            prop_assert!(window.contains(start));
            prop_assert!(window.contains(end));
        }
    }
}

// ============================================================================
// SearchBudget Property Tests
// ============================================================================

mod search_budget_tests {
    use super::*;

    proptest! {
        #[test]
        fn consumption_never_exceeds_limit(limit in 0u32..40, requests in 0usize..100) {
            let mut budget = SearchBudget::new(limit);
            let cap = limit.min(MAX_SEARCH_BUDGET);
            let granted = (0..requests).filter_map(|_| budget.try_consume()).count();

            prop_assert!(granted <= cap as usize);
            prop_assert_eq!(granted, requests.min(cap as usize));
            prop_assert_eq!(budget.used() + budget.remaining(), cap);
        }

        #[test]
        fn sequence_numbers_are_contiguous(limit in 1u32..=MAX_SEARCH_BUDGET) {
            let mut budget = SearchBudget::new(limit);
            let sequence: Vec<u32> = std::iter::from_fn(|| budget.try_consume()).collect();
            let expected: Vec<u32> = (1..=limit).collect();
            prop_assert_eq!(sequence, expected);
            prop_assert!(budget.is_exhausted());
        }
    }
}

// ============================================================================
// EmailAddress Property Tests
// ============================================================================

mod email_address_tests {
    use super::*;

    proptest! {
        #[test]
        fn accepted_addresses_are_lowercase_and_trimmed(
            local in "[A-Za-z][A-Za-z0-9]{0,12}",
            domain in "[A-Za-z][a-z0-9]{0,10}\\.[a-z]{2,4}",
            pad in " {0,3}",
        ) {
            let input = format!("{pad}{local}@{domain}{pad}");
            if let Ok(email) = EmailAddress::new(&input) {
                prop_assert_eq!(email.as_str(), email.as_str().trim());
                prop_assert_eq!(email.as_str().to_string(), email.as_str().to_lowercase());
                prop_assert_eq!(email.domain(), domain.to_lowercase());
            }
        }

        #[test]
        fn strings_without_at_sign_are_rejected(input in "[a-z0-9.]{0,30}") {
            prop_assert!(EmailAddress::new(&input).is_err());
        }
    }
}

// ============================================================================
// Transcript text extraction
// ============================================================================

mod transcript_tests {
    use super::*;

    proptest! {
        #[test]
        fn joined_text_never_contains_blank_segments(
            texts in prop::collection::vec("[ \\n]{0,3}|[a-z ]{1,20}", 1..8)
        ) {
            let blocks: Vec<ContentBlock> = texts.iter().map(ContentBlock::text).collect();
            let joined = joined_text(&blocks);
            prop_assert!(joined.is_some());
            for segment in joined.unwrap().split("\n\n") {
                if !segment.is_empty() {
                    prop_assert!(!segment.trim().is_empty());
                }
            }
        }
    }
}
