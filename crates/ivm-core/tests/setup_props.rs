use ivm_core::prelude::*;
use ivm_test_utils::{memory_router, succeeding_service, words};
use proptest::prelude::*;
use std::time::Duration;

fn setup() -> InterviewSetup {
    let (router, _) = memory_router();
    InterviewSetup::new(
        succeeding_service(Duration::ZERO),
        router,
        AuthState::resolved_with(None),
    )
}

proptest! {
    #[test]
    fn gating_matches_rules(company in "[ a-zA-Z]{0,6}", n in 0usize..80, pad in "[ \t\n]{0,3}") {
        let mut form = setup();
        form.set_company_name(company.clone());
        form.set_job_description(format!("{pad}{}{pad}", words(n)));

        prop_assert_eq!(form.word_count(), n);
        let expected = company.trim().chars().count() >= 2 && n >= 50;
        prop_assert_eq!(form.can_generate(), expected);
    }
}
