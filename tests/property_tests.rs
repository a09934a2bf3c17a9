use chrono::{Days, NaiveDate};
use liability_engine::amortization::{
    compute_installment, decompose, project, project_group, project_with_config, GroupLoan, ProjectionConfig,
    ROUNDING_TOLERANCE,
};
use liability_engine::ledger::{amount_repaid_after_add, amount_repaid_after_delete, replay_history};
use liability_engine::loan::{Liability, LoanTerms, PaymentEvent};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Principal between 1,000 and 500,000 in whole cents.
fn arb_principal() -> impl Strategy<Value = f64> {
    (100_000u64..50_000_000u64).prop_map(|cents| cents as f64 / 100.0)
}

/// Annual rate between 0% and 30% in basis points.
fn arb_rate() -> impl Strategy<Value = f64> {
    (0u32..3_000u32).prop_map(|bp| bp as f64 / 100.0)
}

/// A loan whose installment retires it within its term.
fn arb_group_loan() -> impl Strategy<Value = LoanTerms> {
    (arb_principal(), arb_rate(), 6u32..240u32).prop_map(|(p, r, t)| LoanTerms::with_term(p, r, t))
}

/// An ordered payment history of 1..20 small payments.
fn arb_history() -> impl Strategy<Value = Vec<PaymentEvent>> {
    prop::collection::vec(1u64..50_000u64, 1..20).prop_map(|amounts| {
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, cents)| {
                let date = start() + Days::new(30 * i as u64);
                PaymentEvent::new(format!("p{}", i), cents as f64 / 100.0, date, i as u64)
            })
            .collect()
    })
}

/// A liability large enough that no generated history can overpay it.
fn arb_liability() -> impl Strategy<Value = Liability> {
    (20_000u32..200_000u32, prop::option::of(arb_rate()))
        .prop_map(|(initial, rate)| {
            let mut liability = Liability::new(initial as f64, start());
            liability.annual_rate_percent = rate;
            liability
        })
}

fn replayed_total(liability: &Liability, history: &[PaymentEvent]) -> f64 {
    replay_history(liability, history)
        .unwrap()
        .iter()
        .map(|p| p.decomposition.principal_paid)
        .sum()
}

proptest! {
    // ===================================================================
    // A computed installment pays the loan off in its term.
    //
    // Projecting with compute_installment(P, r, n) and no extra finishes
    // within one month of n, and the principal paid sums back to P.
    // ===================================================================
    #[test]
    fn installment_retires_loan_in_term(
        principal in arb_principal(),
        rate in arb_rate(),
        term in 1u32..360u32,
    ) {
        let installment = compute_installment(principal, rate, term);
        let result = project(principal, rate, installment, 0.0, start());
        let schedule = result.as_finite().expect("installment must pay off the loan");

        prop_assert!(
            (schedule.term_months as i64 - term as i64).abs() <= 1,
            "term {} should be within one month of {}",
            schedule.term_months,
            term
        );
        prop_assert!((schedule.total_principal_paid() - principal).abs() <= ROUNDING_TOLERANCE);
    }

    // ===================================================================
    // Decomposition never creates or loses money.
    // ===================================================================
    #[test]
    fn decomposition_sums_to_payment(
        outstanding in arb_principal(),
        rate in arb_rate(),
        payment_cents in 1u64..10_000_000u64,
    ) {
        let payment = payment_cents as f64 / 100.0;
        let split = decompose(outstanding, rate, payment);

        prop_assert!(split.interest_paid >= 0.0);
        prop_assert!(split.principal_paid >= 0.0);
        prop_assert!(split.interest_paid <= payment);
        prop_assert!((split.total() - payment).abs() <= ROUNDING_TOLERANCE);
    }

    // ===================================================================
    // Paying more every month never takes longer or costs more interest.
    // ===================================================================
    #[test]
    fn more_extra_never_slows_payoff(
        principal in arb_principal(),
        rate in arb_rate(),
        term in 12u32..360u32,
        extra_low in 0u32..500u32,
        extra_step in 1u32..500u32,
    ) {
        let installment = compute_installment(principal, rate, term);
        let low = project(principal, rate, installment, extra_low as f64, start());
        let high = project(principal, rate, installment, (extra_low + extra_step) as f64, start());

        let low = low.as_finite().expect("installment alone pays off");
        let high = high.as_finite().expect("more than the installment pays off");
        prop_assert!(high.term_months <= low.term_months);
        prop_assert!(high.total_interest_paid <= low.total_interest_paid + ROUNDING_TOLERANCE);
    }

    // ===================================================================
    // With no extra and no rollover, a group is just its loans projected
    // one by one.
    // ===================================================================
    #[test]
    fn zero_extra_group_matches_single_projections(
        terms in prop::collection::vec(arb_group_loan(), 1..6),
    ) {
        let loans: Vec<GroupLoan> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| GroupLoan::new(format!("loan-{}", i), t.clone()))
            .collect();
        let config = ProjectionConfig::default().without_rollover();
        let group = project_group(&loans, 0.0, start(), &config);

        for (loan, projection) in loans.iter().zip(&group.loans) {
            let single = project_with_config(
                &config,
                loan.terms.principal,
                loan.terms.annual_rate_percent,
                loan.terms.resolved_installment(),
                0.0,
                start(),
            );
            prop_assert_eq!(projection.result.term_months(), single.term_months());
            let group_interest = projection.result.total_interest_paid().unwrap_or(0.0);
            let single_interest = single.total_interest_paid().unwrap_or(0.0);
            prop_assert!((group_interest - single_interest).abs() <= 1e-9);
            prop_assert_eq!(projection.extra_received, 0.0);
        }
    }

    // ===================================================================
    // Without rollover each loan keeps its own installment, so extra from
    // the pool can only speed the group up.
    // ===================================================================
    #[test]
    fn group_extra_never_slows_payoff(
        terms in prop::collection::vec(arb_group_loan(), 1..6),
        extra in 1u32..2_000u32,
    ) {
        let loans: Vec<GroupLoan> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| GroupLoan::new(format!("loan-{}", i), t.clone()))
            .collect();
        let config = ProjectionConfig::default().without_rollover();
        let baseline = project_group(&loans, 0.0, start(), &config);
        let boosted = project_group(&loans, extra as f64, start(), &config);

        let baseline_term = baseline.overall.term_months().expect("installments pay off every loan");
        let boosted_term = boosted.overall.term_months().expect("extra keeps every loan payable");
        prop_assert!(boosted_term <= baseline_term);

        for (slow, fast) in baseline.loans.iter().zip(&boosted.loans) {
            prop_assert!(fast.result.term_months() <= slow.result.term_months());
        }
    }

    // ===================================================================
    // Recording payments one at a time reaches the full replay total.
    // ===================================================================
    #[test]
    fn incremental_adds_match_full_replay(
        liability in arb_liability(),
        history in arb_history(),
    ) {
        let mut repaid = 0.0;
        for (i, payment) in history.iter().enumerate() {
            let current = liability.clone().with_amount_repaid(repaid);
            repaid = amount_repaid_after_add(&current, &history[..i], payment).unwrap();
        }

        let expected = replayed_total(&liability, &history);
        prop_assert!((repaid - expected).abs() <= 1e-6, "{} != {}", repaid, expected);
    }

    // ===================================================================
    // Deleting a payment and recording it again restores amount_repaid.
    // ===================================================================
    #[test]
    fn delete_then_readd_is_stable(
        liability in arb_liability(),
        history in arb_history(),
        pick in any::<prop::sample::Index>(),
    ) {
        let liability = {
            let total = replayed_total(&liability, &history);
            liability.with_amount_repaid(total)
        };
        let target = history[pick.index(history.len())].clone();

        let after_delete = amount_repaid_after_delete(&liability, &history, &target.id).unwrap();
        let remaining: Vec<PaymentEvent> = history.iter().filter(|p| p.id != target.id).cloned().collect();
        let deleted = liability.clone().with_amount_repaid(after_delete);
        let restored = amount_repaid_after_add(&deleted, &remaining, &target).unwrap();

        prop_assert!((restored - liability.amount_repaid).abs() <= 1e-6);
    }
}
