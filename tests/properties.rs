//! Property tests for the adaptive testing engine.

use cat_engine::{
    calculate_score, initialize_state, select_next_question, should_continue, update_ability,
    CatSettings, CatState,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Answer sequences with difficulties slightly beyond the nominal [0, 1] range.
fn arb_answers(max_len: usize) -> impl Strategy<Value = Vec<(f64, bool)>> {
    prop::collection::vec((-0.2f64..1.2, any::<bool>()), 0..max_len)
}

fn arb_settings() -> impl Strategy<Value = CatSettings> {
    (0.05f64..1.0, 1usize..15, 1usize..40, -2.0f64..2.0).prop_map(
        |(precision_threshold, min_questions, max_questions, initial_ability)| CatSettings {
            initial_ability,
            precision_threshold,
            min_questions,
            max_questions,
        },
    )
}

fn replay(answers: &[(f64, bool)]) -> CatState {
    answers
        .iter()
        .fold(initialize_state(None), |state, &(difficulty, is_correct)| {
            update_ability(&state, difficulty, is_correct)
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn score_is_monotonic(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calculate_score(lo) <= calculate_score(hi));
        prop_assert!(calculate_score(hi) <= 100);
    }

    #[test]
    fn theta_stays_on_scale(answers in arb_answers(40)) {
        let state = replay(&answers);
        prop_assert!(state.ability_estimate >= -3.0);
        prop_assert!(state.ability_estimate <= 3.0);
        prop_assert!(state.standard_error.is_finite());
        prop_assert!(state.standard_error > 0.0);
    }

    #[test]
    fn response_count_matches_updates(answers in arb_answers(40)) {
        let state = replay(&answers);
        prop_assert_eq!(state.questions_administered, answers.len());
        prop_assert_eq!(state.responses.len(), answers.len());
        prop_assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn update_is_pure(answers in arb_answers(15), difficulty in 0.0f64..1.0, correct in any::<bool>()) {
        let before = replay(&answers);
        let snapshot = before.clone();
        let _ = update_ability(&before, difficulty, correct);
        prop_assert_eq!(before, snapshot);
    }

    #[test]
    fn empty_pool_stops(answers in arb_answers(20), settings in arb_settings()) {
        let state = replay(&answers);
        let pool: Vec<f64> = Vec::new();
        prop_assert!(select_next_question(&state, &pool, &settings).is_stop());
    }

    #[test]
    fn should_continue_agrees_with_selection(
        answers in arb_answers(30),
        settings in arb_settings(),
        pool in prop::collection::vec(0.0f64..1.0, 1..20),
    ) {
        let state = replay(&answers);
        let selection = select_next_question(&state, &pool, &settings);
        prop_assert_eq!(should_continue(&state, &settings), !selection.is_stop());
    }

    #[test]
    fn selected_item_has_maximal_information(
        answers in arb_answers(10),
        pool in prop::collection::vec(0.0f64..1.0, 1..25),
    ) {
        let state = replay(&answers);
        let next = select_next_question(&state, &pool, &CatSettings::default())
            .into_next()
            .expect("default settings cannot stop within ten items");
        for &d in &pool {
            prop_assert!(cat_engine::irt::item_information(state.ability_estimate, d) <= next.information);
        }
    }
}
