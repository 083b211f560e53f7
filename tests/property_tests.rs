//! Property-based tests for keyword classification and slot rewriting
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use kwsync_core::classify::{ClassifyError, classify};
use kwsync_core::render::RenderConfig;
use kwsync_core::{TOTAL_SLOT_CAPACITY, slots};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_#@][a-zA-Z0-9_\\-]{0,10}"
}

fn groups_strategy(max_groups: usize) -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(ident_strategy(), 0..12), 0..=max_groups)
}

/// A generated source with `generated` slots for NP2LEX_PROP, surrounded by unrelated code.
fn slotted_file(generated: usize, newline: &str) -> String {
    let mut out = format!("#include \"EditLexer.h\"{newline}static KEYWORDLIST Keywords = {{{{{newline}");
    for index in 0..generated {
        out.push_str(&format!("//++Autogenerated NP2LEX_PROP {index}{newline}"));
        out.push_str(&format!("NULL{newline}"));
        out.push_str(&format!("//--Autogenerated NP2LEX_PROP {index}{newline}"));
        out.push_str(&format!(", {newline}"));
    }
    out.push_str(&format!("}}}};{newline}"));
    out
}

// =============================================================================
// Classifier Properties
// =============================================================================

proptest! {
    /// Property: a successful classification yields exactly `generated` sorted, duplicate-free groups
    #[test]
    fn classify_fills_every_slot(groups in groups_strategy(6), generated in 1usize..=TOTAL_SLOT_CAPACITY) {
        match classify(groups.clone(), generated) {
            Ok(out) => {
                prop_assert_eq!(out.len(), generated);
                for group in &out {
                    let words = group.words();
                    prop_assert!(words.windows(2).all(|w| w[0] < w[1]));
                }
            }
            Err(ClassifyError::CapacityViolation { produced, capacity }) => {
                prop_assert_eq!(capacity, generated);
                prop_assert!(produced > generated);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }

    /// Property: classification never invents or drops identifiers
    #[test]
    fn classify_preserves_word_sets(groups in groups_strategy(4)) {
        let out = classify(groups.clone(), TOTAL_SLOT_CAPACITY).expect("four groups always fit");
        for (index, raw) in groups.iter().enumerate() {
            let mut expected: Vec<&str> = raw.iter().map(String::as_str).collect();
            expected.sort_unstable();
            expected.dedup();
            let got: Vec<&str> = out[index].words().iter().map(String::as_str).collect();
            prop_assert_eq!(got, expected);
        }
    }

    /// Property: classifying an already-classified result is a no-op
    #[test]
    fn classify_is_idempotent(groups in groups_strategy(5)) {
        let once = classify(groups, 8).expect("five groups fit in eight slots");
        let again = classify(once.iter().map(|g| g.words().to_vec()).collect(), 8).expect("same shape");
        prop_assert_eq!(once, again);
    }
}

// =============================================================================
// Slot Rewriting Properties
// =============================================================================

proptest! {
    /// Property: rewriting with the same groups twice changes nothing the second time
    #[test]
    fn replace_slots_is_idempotent(
        groups in groups_strategy(3),
        line_length in 20usize..200,
        crlf in any::<bool>(),
    ) {
        let newline = if crlf { "\r\n" } else { "\n" };
        let file = slotted_file(3, newline);
        let config = RenderConfig::default().with_line_length(line_length);
        let groups = classify(groups, 3).expect("three groups fit");

        let first = slots::replace_slots(&file, "NP2LEX_PROP", &groups, TOTAL_SLOT_CAPACITY, &config)
            .expect("markers present");
        let second = slots::replace_slots(&first, "NP2LEX_PROP", &groups, TOTAL_SLOT_CAPACITY, &config)
            .expect("markers survive a rewrite");
        prop_assert_eq!(&first, &second);

        // Surrounding code and newline style are untouched
        prop_assert!(first.starts_with("#include \"EditLexer.h\""));
        if !crlf {
            prop_assert!(!first.contains('\r'));
        }
    }

    /// Property: populated slot count matches the non-empty groups written
    #[test]
    fn populated_count_matches_written_groups(groups in groups_strategy(4)) {
        let file = slotted_file(4, "\n");
        let groups = classify(groups, 4).expect("four groups fit");
        let text = slots::replace_slots(&file, "NP2LEX_PROP", &groups, TOTAL_SLOT_CAPACITY, &RenderConfig::default())
            .expect("markers present");

        let expected = groups.iter().filter(|g| !g.is_empty()).count();
        let counted = slots::populated_count(&text, "NP2LEX_PROP", TOTAL_SLOT_CAPACITY).expect("well formed");
        prop_assert_eq!(counted, Some(expected));
    }
}
