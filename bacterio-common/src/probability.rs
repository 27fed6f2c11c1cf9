use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest number of fractional digits whose scale (10^d) still fits in a u64.
pub const MAX_DIGITS: u32 = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbabilityError {
    #[error("'{0}' is not a decimal number")]
    NotDecimal(String),
    #[error("'{0}' is outside [0, 1]")]
    OutOfRange(String),
    #[error("'{0}' has more than 18 fractional digits")]
    TooPrecise(String),
}

/// A probability written as a short decimal fraction, kept in the scaled
/// integer domain: `scaled / 10^digits`.
///
/// A trial draws a uniform integer in `[0, 10^digits)` and succeeds iff it is
/// below `scaled`, so "0.1" succeeds with frequency exactly 1/10 instead of
/// whatever the nearest binary float happens to be.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ProbabilityRepr", into = "String")]
pub struct Probability {
    scaled: u64,
    digits: u32,
}

impl Probability {
    pub const NEVER: Probability = Probability { scaled: 0, digits: 0 };
    pub const ALWAYS: Probability = Probability { scaled: 1, digits: 0 };

    /// `scaled / 10^digits`, checked at compile time when used in a const.
    ///
    /// Panics if `digits` exceeds 18 or the value is above 1.
    pub const fn from_scaled(scaled: u64, digits: u32) -> Self {
        assert!(digits <= MAX_DIGITS, "too many fractional digits");
        assert!(scaled <= 10u64.pow(digits), "probability above 1");
        Probability { scaled, digits }
    }

    /// Number of digits after the decimal point, trailing zeros included.
    pub fn decimal_places(&self) -> u32 {
        self.digits
    }

    /// The probability scaled by `10^decimal_places`.
    pub fn scaled(&self) -> u64 {
        self.scaled
    }

    /// `10^decimal_places`, the size of the integer range a trial draws from.
    pub fn bound(&self) -> u64 {
        10u64.pow(self.digits)
    }

    /// Converts a binary float through its shortest round-trip decimal text,
    /// so `0.7` is treated as "0.7" and not as 0.6999999999999999555910790149937.
    pub fn from_f64(p: f64) -> Result<Self, ProbabilityError> {
        if !p.is_finite() {
            return Err(ProbabilityError::NotDecimal(p.to_string()));
        }
        format!("{}", p).parse()
    }

    /// One Bernoulli trial.
    #[inline]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> bool {
        if self.scaled == 0 {
            return false;
        }
        rng.random_range(0..self.bound()) < self.scaled
    }
}

impl FromStr for Probability {
    type Err = ProbabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let not_decimal = || ProbabilityError::NotDecimal(s.to_string());
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        let int_part = int_part.strip_prefix('+').unwrap_or(int_part);
        if int_part.starts_with('-') {
            return Err(ProbabilityError::OutOfRange(s.to_string()));
        }
        if (int_part.is_empty() && frac_part.is_empty())
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(not_decimal());
        }
        let digits = frac_part.len() as u32;
        if digits > MAX_DIGITS {
            return Err(ProbabilityError::TooPrecise(s.to_string()));
        }

        let int_value: u64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| ProbabilityError::OutOfRange(s.to_string()))?
        };
        let frac_value: u64 = if frac_part.is_empty() { 0 } else { frac_part.parse().map_err(|_| not_decimal())? };
        let bound = 10u64.pow(digits);

        // Anything with an integer part above 1, or 1 with a non-zero fraction, exceeds 1.
        if int_value > 1 || (int_value == 1 && frac_value > 0) {
            return Err(ProbabilityError::OutOfRange(s.to_string()));
        }
        Ok(Self {
            scaled: int_value * bound + frac_value,
            digits,
        })
    }
}

impl TryFrom<f64> for Probability {
    type Error = ProbabilityError;

    fn try_from(p: f64) -> Result<Self, Self::Error> {
        Self::from_f64(p)
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.digits == 0 {
            return write!(f, "{}", self.scaled);
        }
        let bound = self.bound();
        write!(
            f,
            "{}.{:0width$}",
            self.scaled / bound,
            self.scaled % bound,
            width = self.digits as usize
        )
    }
}

impl fmt::Debug for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probability({})", self)
    }
}

impl From<Probability> for String {
    fn from(p: Probability) -> Self {
        p.to_string()
    }
}

/// Config files may spell a probability either as a string ("0.05") or as
/// a plain number (0.05).
#[derive(Deserialize)]
#[serde(untagged)]
enum ProbabilityRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<ProbabilityRepr> for Probability {
    type Error = ProbabilityError;

    fn try_from(repr: ProbabilityRepr) -> Result<Self, Self::Error> {
        match repr {
            ProbabilityRepr::Text(s) => s.parse(),
            ProbabilityRepr::Number(p) => Self::from_f64(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn p(s: &str) -> Probability {
        s.parse().unwrap()
    }

    fn successes(prob: Probability, trials: u32, seed: u64) -> u32 {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..trials).filter(|_| prob.sample(&mut rng)).count() as u32
    }

    #[test]
    fn counts_decimal_places() {
        assert_eq!(p("0").decimal_places(), 0);
        assert_eq!(p("0.5").decimal_places(), 1);
        assert_eq!(p("0.503").decimal_places(), 3);
        assert_eq!(p("0.550066").decimal_places(), 6);
        assert_eq!(p("0.50").decimal_places(), 2);
    }

    #[test]
    fn floats_use_their_shortest_decimal_form() {
        assert_eq!(Probability::from_f64(0.0).unwrap().decimal_places(), 0);
        assert_eq!(Probability::from_f64(0.5).unwrap().decimal_places(), 1);
        assert_eq!(Probability::from_f64(0.503).unwrap().decimal_places(), 3);
        assert_eq!(Probability::from_f64(0.550066).unwrap().decimal_places(), 6);
        assert_eq!(Probability::from_f64(0.7).unwrap(), p("0.7"));
        assert_eq!(Probability::from_f64(1.0).unwrap(), Probability::ALWAYS);
    }

    #[test]
    fn scaled_value_is_exact() {
        let prob = p("0.123");
        assert_eq!(prob.scaled(), 123);
        assert_eq!(prob.bound(), 1000);
        assert_eq!(p("1").scaled(), 1);
        assert_eq!(p("1.000").scaled(), 1000);
        assert_eq!(p(".25").scaled(), 25);
    }

    #[test]
    fn rejects_bad_literals() {
        assert!(matches!("1.01".parse::<Probability>(), Err(ProbabilityError::OutOfRange(_))));
        assert!(matches!("2".parse::<Probability>(), Err(ProbabilityError::OutOfRange(_))));
        assert!(matches!("-0.1".parse::<Probability>(), Err(ProbabilityError::OutOfRange(_))));
        assert!(matches!("abc".parse::<Probability>(), Err(ProbabilityError::NotDecimal(_))));
        assert!(matches!("0.1.2".parse::<Probability>(), Err(ProbabilityError::NotDecimal(_))));
        assert!(matches!(".".parse::<Probability>(), Err(ProbabilityError::NotDecimal(_))));
        assert!(matches!(
            "0.1234567890123456789".parse::<Probability>(),
            Err(ProbabilityError::TooPrecise(_))
        ));
        assert!(Probability::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn scaled_constructor_matches_parsing() {
        const FIVE_HUNDREDTHS: Probability = Probability::from_scaled(5, 2);
        assert_eq!(FIVE_HUNDREDTHS, "0.05".parse().unwrap());
        assert_eq!(Probability::from_scaled(1, 0), Probability::ALWAYS);
        assert_eq!(Probability::from_scaled(10, 1).to_string(), "1.0");
    }

    #[test]
    #[should_panic(expected = "probability above 1")]
    fn scaled_constructor_rejects_values_above_one() {
        let _ = Probability::from_scaled(11, 1);
    }

    #[test]
    fn display_keeps_all_digits() {
        assert_eq!(p("0.050").to_string(), "0.050");
        assert_eq!(p("0.7").to_string(), "0.7");
        assert_eq!(p("1").to_string(), "1");
    }

    #[test]
    fn never_and_always_are_certain() {
        assert_eq!(successes(Probability::NEVER, 10_000, 1), 0);
        assert_eq!(successes(Probability::ALWAYS, 10_000, 1), 10_000);
        assert_eq!(successes(p("0.000"), 10_000, 2), 0);
        assert_eq!(successes(p("1.00"), 10_000, 2), 10_000);
    }

    #[test]
    fn one_tenth_converges() {
        let s = successes(p("0.1"), 100_000, 42);
        assert!((9_500..=10_500).contains(&s), "got {}", s);
    }

    #[test]
    fn seven_tenths_converges() {
        let s = successes(p("0.7"), 100_000, 7);
        assert!((69_500..=70_500).contains(&s), "got {}", s);
        let s = successes(Probability::from_f64(0.7).unwrap(), 100_000, 8);
        assert!((69_500..=70_500).contains(&s), "got {}", s);
    }

    #[test]
    fn deserializes_from_string_or_number() {
        #[derive(Deserialize)]
        struct Holder {
            a: Probability,
            b: Probability,
        }
        let h: Holder = toml::from_str("a = \"0.05\"\nb = 0.25\n").unwrap();
        assert_eq!(h.a, p("0.05"));
        assert_eq!(h.b, p("0.25"));
        assert!(toml::from_str::<Holder>("a = \"1.5\"\nb = 0.1\n").is_err());
    }
}
