use std::fmt;

pub type UInt = u64;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Whether a dice term's log entry is shown when the query log is built.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DisplayBehavior {
    Hide,
    #[default]
    Default,
    Show,
}

impl DisplayBehavior {
    /// One step toward [`DisplayBehavior::Hide`], clamped.
    pub fn hide(self) -> Self {
        match self {
            Self::Show => Self::Default,
            _ => Self::Hide,
        }
    }

    /// One step toward [`DisplayBehavior::Show`], clamped.
    pub fn show(self) -> Self {
        match self {
            Self::Hide => Self::Default,
            _ => Self::Show,
        }
    }
}

/// Whether a dice term's individual rolls are listed in its log entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Default,
    Verbose,
}

impl Verbosity {
    pub fn quieter(self) -> Self {
        match self {
            Self::Verbose => Self::Default,
            _ => Self::Quiet,
        }
    }

    pub fn louder(self) -> Self {
        match self {
            Self::Quiet => Self::Default,
            _ => Self::Verbose,
        }
    }
}

/// Formats a float with at most eight decimals and no trailing zeros,
/// rendering infinities as `∞` and `-∞`.
pub struct Decimal(pub Float);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x.is_nan() {
            return f.write_str("NaN");
        }
        if x.is_infinite() {
            return f.write_str(if x > 0.0 { "∞" } else { "-∞" });
        }
        let s = format!("{:.8}", x);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        // "-0" would otherwise leak out of tiny negative values
        if s == "-0" {
            f.write_str("0")
        } else {
            f.write_str(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(Decimal(70.0).to_string(), "70");
        assert_eq!(Decimal(100.0).to_string(), "100");
        assert_eq!(Decimal(2.5).to_string(), "2.5");
        assert_eq!(Decimal(-2.0).to_string(), "-2");
        assert_eq!(Decimal(0.01).to_string(), "0.01");
        assert_eq!(Decimal(1.0 / 3.0).to_string(), "0.33333333");
        assert_eq!(Decimal(Float::INFINITY).to_string(), "∞");
        assert_eq!(Decimal(Float::NEG_INFINITY).to_string(), "-∞");
        assert_eq!(Decimal(-0.000000001).to_string(), "0");
    }

    #[test]
    fn test_nudges_clamp() {
        use DisplayBehavior as D;
        assert_eq!(D::Default.hide().hide(), D::Hide);
        assert_eq!(D::Default.show().hide(), D::Default);
        assert_eq!(D::Hide.show().show().show(), D::Show);

        use Verbosity as V;
        assert_eq!(V::Default.quieter().quieter(), V::Quiet);
        assert_eq!(V::Default.louder().quieter(), V::Default);
    }
}
