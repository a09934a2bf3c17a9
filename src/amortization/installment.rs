//! Fixed monthly installment calculation

/// Compute the fixed monthly installment that retires `principal` over
/// `term_months` at `annual_rate_percent`.
///
/// Returns 0 for inputs a form may hold while still being filled in
/// (non-positive principal or term, negative rate) and for inputs that
/// overflow the formula.
pub fn compute_installment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    if !(principal > 0.0) || !(annual_rate_percent >= 0.0) || term_months == 0 {
        return 0.0;
    }

    if annual_rate_percent == 0.0 {
        return principal / term_months as f64;
    }

    let r = super::monthly_rate(annual_rate_percent);
    let growth = (1.0 + r).powf(term_months as f64);
    let installment = principal * r * growth / (growth - 1.0);

    if installment.is_finite() {
        installment
    } else {
        0.0
    }
}
