//! Property tests for HTS code normalization.

use hts_model::{CODE_WIDTH, HtsCode};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in ".{0,24}") {
        let once = HtsCode::normalize(&raw);
        let twice = HtsCode::normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_yields_fixed_width_digits(raw in "[0-9. \\-]{0,16}") {
        let code = HtsCode::normalize(&raw);
        prop_assert_eq!(code.as_str().len(), CODE_WIDTH);
        prop_assert!(code.as_str().chars().all(|ch| ch.is_ascii_digit()));
    }

    #[test]
    fn separators_do_not_change_the_key(
        heading in "[1-9][0-9]{3}",
        sub in "[0-9]{2}",
        stat in "[0-9]{2}",
    ) {
        let dotted = HtsCode::normalize(&format!("{heading}.{sub}.{stat}"));
        let plain = HtsCode::normalize(&format!("{heading}{sub}{stat}"));
        prop_assert_eq!(dotted, plain);
    }
}

#[test]
fn only_the_zero_key_starts_with_zero() {
    for raw in ["0", "00000000", "0000.00.00", "abc"] {
        assert_eq!(HtsCode::normalize(raw).as_str(), "00000000");
    }
    assert_eq!(HtsCode::normalize("0901.11.00").as_str(), "90111000");
}
