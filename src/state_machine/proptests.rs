//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::{transition, ConvState, Effect, Event};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,40}"
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        Just(ConvState::AwaitingName),
        arb_name().prop_map(|name| ConvState::AwaitingAge { name }),
        (arb_name(), 13u8..=120).prop_map(|(name, age)| ConvState::AwaitingAddress { name, age }),
    ]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        any::<bool>().prop_map(|chat_is_private| Event::Start { chat_is_private }),
        Just(Event::Cancel),
        Just(Event::Delete),
        Just(Event::Help),
        Just(Event::IdleTimeout),
        "/[a-z]{1,8}".prop_map(|command| Event::UnknownCommand { command }),
        "\\PC{0,300}".prop_map(Event::text),
        (-50i32..300).prop_map(|n| Event::text(n.to_string())),
    ]
}

fn save_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::SaveRecord { .. }))
        .count()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every user event other than the idle timeout produces some effect.
    #[test]
    fn prop_user_events_always_produce_an_effect(state in arb_state(), event in arb_user_event()) {
        let is_timeout = matches!(event, Event::IdleTimeout);
        let result = transition(&state, event);
        if is_timeout {
            prop_assert!(result.effects.is_empty());
        } else {
            prop_assert!(!result.effects.is_empty());
        }
    }

    /// A save is only ever requested when leaving AwaitingAddress, and the
    /// saved fields satisfy the store's constraints.
    #[test]
    fn prop_save_only_from_address_step(state in arb_state(), event in arb_user_event()) {
        let was_address = matches!(state, ConvState::AwaitingAddress { .. });
        let result = transition(&state, event);
        let saves = save_count(&result.effects);
        prop_assert!(saves <= 1);
        if saves == 1 {
            prop_assert!(was_address);
            prop_assert_eq!(&result.new_state, &ConvState::Idle);
            for effect in &result.effects {
                if let Effect::SaveRecord { name, age, address } = effect {
                    prop_assert!(crate::validate::is_valid_name(name));
                    prop_assert!((13u8..=120).contains(age));
                    prop_assert!(crate::validate::is_valid_address(address));
                }
            }
        }
    }

    /// Private start always lands on AwaitingName regardless of prior progress.
    #[test]
    fn prop_private_start_resets(state in arb_state()) {
        let result = transition(&state, Event::Start { chat_is_private: true });
        prop_assert_eq!(result.new_state, ConvState::AwaitingName);
        prop_assert_eq!(save_count(&result.effects), 0);
    }

    /// A group start never changes the state, whatever was in progress.
    #[test]
    fn prop_group_start_keeps_state(state in arb_state()) {
        let result = transition(&state, Event::Start { chat_is_private: false });
        prop_assert_eq!(result.new_state, state);
        prop_assert_eq!(save_count(&result.effects), 0);
    }

    /// Cancel, delete and timeout always end with no active session.
    #[test]
    fn prop_exit_events_end_session(state in arb_state()) {
        for event in [Event::Cancel, Event::Delete, Event::IdleTimeout] {
            let result = transition(&state, event);
            prop_assert!(!result.new_state.is_active());
            prop_assert_eq!(save_count(&result.effects), 0);
        }
    }

    /// Over any event sequence, the number of saves never exceeds the number
    /// of times the dialogue was (re)started.
    #[test]
    fn prop_at_most_one_save_per_start(events in proptest::collection::vec(arb_user_event(), 0..40)) {
        let mut state = ConvState::Idle;
        let mut starts = 0usize;
        let mut saves = 0usize;
        for event in events {
            if matches!(event, Event::Start { chat_is_private: true }) {
                starts += 1;
            }
            let result = transition(&state, event);
            saves += save_count(&result.effects);
            state = result.new_state;
        }
        prop_assert!(saves <= starts);
    }

    /// Valid answers walk the dialogue forward one step each.
    #[test]
    fn prop_valid_answers_complete_dialogue(
        name in arb_name(),
        age in 13u8..=120,
        address in "[A-Za-z0-9][A-Za-z0-9 ,.]{0,100}",
    ) {
        let mut state = transition(&ConvState::Idle, Event::Start { chat_is_private: true }).new_state;
        state = transition(&state, Event::text(name.clone())).new_state;
        prop_assert_eq!(&state, &ConvState::AwaitingAge { name: name.trim().to_string() });
        state = transition(&state, Event::text(age.to_string())).new_state;
        prop_assert_eq!(&state, &ConvState::AwaitingAddress { name: name.trim().to_string(), age });
        let result = transition(&state, Event::text(address.clone()));
        prop_assert_eq!(result.new_state, ConvState::Idle);
        prop_assert_eq!(result.effects, vec![Effect::SaveRecord {
            name: name.trim().to_string(),
            age,
            address: address.trim().to_string(),
        }]);
    }
}
