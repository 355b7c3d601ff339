//! Property tests for transport input mapping.

use proptest::prelude::*;
use stickflow_engine::{InputUpdate, SharedInput};
use stickflow_pipeline::Button;

const AXES: [&str; 6] = ["lx", "ly", "rx", "ry", "l2", "r2"];

fn expected_byte(value: i32) -> u8 {
    u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX)
}

proptest! {
    #[test]
    fn axis_values_clamp_to_byte_range(
        index in 0usize..AXES.len(),
        value in any::<i32>(),
        upper in any::<bool>(),
    ) {
        let name = AXES.get(index).copied().unwrap_or("lx");
        let name = if upper { name.to_ascii_uppercase() } else { name.to_string() };
        let update = InputUpdate::from_named(&name, value);
        let byte = match update {
            Some(
                InputUpdate::LeftX(v)
                | InputUpdate::LeftY(v)
                | InputUpdate::RightX(v)
                | InputUpdate::RightY(v)
                | InputUpdate::L2(v)
                | InputUpdate::R2(v),
            ) => v,
            other => return Err(TestCaseError::fail(format!("{name} mapped to {other:?}"))),
        };
        prop_assert_eq!(byte, expected_byte(value));
    }

    #[test]
    fn buttons_press_for_positive_values(value in any::<i32>()) {
        prop_assert_eq!(
            InputUpdate::from_named("Cross", value),
            Some(InputUpdate::Button(Button::Cross, value > 0))
        );
    }

    #[test]
    fn unknown_names_are_ignored(name in "[a-z_]{1,12}", value in any::<i32>()) {
        let known = AXES.contains(&name.as_str()) || Button::from_name(&name).is_some();
        prop_assume!(!known);
        prop_assert_eq!(InputUpdate::from_named(&name, value), None);
    }

    #[test]
    fn snapshot_reflects_last_write(values in proptest::collection::vec(any::<i32>(), 1..32)) {
        let shared = SharedInput::new();
        for v in &values {
            let update = InputUpdate::from_named("ry", *v);
            prop_assert!(update.is_some());
            if let Some(update) = update {
                shared.apply_batch(&[update]);
            }
        }
        let last = values.last().copied().unwrap_or(0);
        prop_assert_eq!(shared.snapshot().right_y, expected_byte(last));
    }
}
