use std::fmt;

/// Price band of a place, parsed from strings such as `"$$"` or `"€€€"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceLevel {
    Budget = 1,
    Moderate = 2,
    Expensive = 3,
    Luxury = 4,
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₩', '₹', '₺', '₽', '₪', '฿', '₫', '₱'];

impl PriceLevel {
    /// Level used for places whose price is missing or unparsable.
    pub const UNKNOWN_DEFAULT: Self = Self::Moderate;

    /// Parses a run of one repeated currency symbol.
    ///
    /// The level is the run length in characters, clamped to [`PriceLevel::Luxury`].
    /// Empty strings, mixed symbols and ranges like `"€10–20"` yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut chars = raw.chars();
        let symbol = chars.next()?;
        if !CURRENCY_SYMBOLS.contains(&symbol) || chars.any(|c| c != symbol) {
            return None;
        }

        Some(Self::from_count(raw.chars().count()))
    }

    fn from_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Budget,
            2 => Self::Moderate,
            3 => Self::Expensive,
            _ => Self::Luxury,
        }
    }

    pub const fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Budget => "budget",
            Self::Moderate => "moderate",
            Self::Expensive => "expensive",
            Self::Luxury => "luxury",
        };
        f.write_str(name)
    }
}
