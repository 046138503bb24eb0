//! Best rational approximation of a number in `[0, 1]` under a denominator cap.
//!
//! This is a Stern-Brocot / Farey descent that keeps `a/b <= target <= c/d` and narrows
//! the interval with mediants. Taking one mediant per step is hopeless when the target
//! sits close to a fraction with a small denominator (approximating `1e-6` would walk
//! through `1/1, 1/2, 1/3, ...` a million times), so every step works out how many
//! consecutive mediants would replace the same side and takes them all at once.

/// Outer-loop cap. Fast-forwarding keeps real inputs far below this.
const MAX_ITERATIONS: u32 = 100;

/// Added before flooring the fast-forward count so that counts that are integral in
/// exact arithmetic do not round down to the integer below.
const FLOOR_EPSILON: f64 = 1e-10;

/// Periods-per-buffer as an exact fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
    /// Outer-loop iterations spent finding this fraction.
    pub iterations: u32,
}

impl Rational {
    const fn new(numerator: u64, denominator: u64, iterations: u32) -> Self {
        Self {
            numerator: numerator as u32,
            denominator: denominator as u32,
            iterations,
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Finds the `p/q` closest to `target` with `q <= max_denominator`.
///
/// Targets above 1 give `1/1` and targets below 0 (or NaN) give `0/1`; a cap of 0 is
/// treated as 1.
pub fn approximate(target: f64, max_denominator: u32) -> Rational {
    if target > 1.0 {
        return Rational::new(1, 1, 0);
    }
    if !(target >= 0.0) {
        return Rational::new(0, 1, 0);
    }

    let max_denominator = u64::from(max_denominator.max(1));
    // A side whose distance to the target is below this cannot be beaten by any other
    // fraction with an allowed denominator.
    let n_denom_min = 1.0 / (10.0 * max_denominator as f64);

    let (mut a, mut b, mut c, mut d) = (0u64, 1u64, 1u64, 1u64);
    let mut iterations = 0;

    loop {
        if b + d > max_denominator || iterations > MAX_ITERATIONS {
            let below = target - a as f64 / b as f64;
            let above = c as f64 / d as f64 - target;
            return if below < above {
                Rational::new(a, b, iterations)
            } else {
                Rational::new(c, d, iterations)
            };
        }

        let mediant = (a + c) as f64 / (b + d) as f64;
        if target < mediant {
            // c/d gets replaced. (c + N*a) / (d + N*b) stays above the target for
            // N <= (c - target*d) / (target*b - a).
            let n_denom = target * b as f64 - a as f64;
            if n_denom < n_denom_min {
                return Rational::new(a, b, iterations);
            }
            let n = (c as f64 - target * d as f64) / n_denom;
            let n = fast_forward_count(n, d, b, max_denominator);
            c += n * a;
            d += n * b;
        } else {
            // a/b gets replaced. (a + N*c) / (b + N*d) stays below the target for
            // N <= (target*b - a) / (c - target*d).
            let n_denom = c as f64 - target * d as f64;
            if n_denom < n_denom_min {
                return Rational::new(c, d, iterations);
            }
            let n = (target * b as f64 - a as f64) / n_denom;
            let n = fast_forward_count(n, b, d, max_denominator);
            a += n * c;
            b += n * d;
        }
        iterations += 1;
    }
}

/// Turns the analytic step count into a usable integer: at least one step (the mediant
/// test already proved one is due), and never so many that `moving + n*fixed` exceeds
/// the cap.
fn fast_forward_count(n: f64, moving: u64, fixed: u64, max_denominator: u64) -> u64 {
    let mut steps = if n + FLOOR_EPSILON >= 1.0 {
        (n + FLOOR_EPSILON) as u64
    } else {
        1
    };
    if moving + steps.saturating_mul(fixed) > max_denominator {
        steps = (max_denominator - moving) / fixed;
    }
    steps.max(1)
}
