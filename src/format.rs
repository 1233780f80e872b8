use crate::types::Rates;

/// Text shown before the first cycle has published anything
pub const INITIAL_DISPLAY: &str = "↓ 0 B/s ↑ 0 B/s";

const STEP: f64 = 1024.0;

/// Units a rate can be scaled to, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeedUnit {
    BytesPerSec,
    KilobytesPerSec,
    MegabytesPerSec,
    GigabytesPerSec,
}

impl SpeedUnit {
    pub const ALL: [Self; 4] = [
        Self::BytesPerSec,
        Self::KilobytesPerSec,
        Self::MegabytesPerSec,
        Self::GigabytesPerSec,
    ];

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::BytesPerSec => "B/s",
            Self::KilobytesPerSec => "KB/s",
            Self::MegabytesPerSec => "MB/s",
            Self::GigabytesPerSec => "GB/s",
        }
    }

    /// Position in [`Self::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The next larger unit, if any
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::BytesPerSec => Some(Self::KilobytesPerSec),
            Self::KilobytesPerSec => Some(Self::MegabytesPerSec),
            Self::MegabytesPerSec => Some(Self::GigabytesPerSec),
            Self::GigabytesPerSec => None,
        }
    }
}

impl std::fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A rate scaled to a display unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedValue {
    pub magnitude: f64,
    pub unit: SpeedUnit,
}

impl SpeedValue {
    /// Scale by 1024 while the magnitude is at least 1024 and a larger unit
    /// exists. Negative rates never scale and stay in `B/s`.
    #[must_use]
    pub fn from_bytes_per_sec(bytes_per_sec: f64) -> Self {
        let mut magnitude = bytes_per_sec;
        let mut unit = SpeedUnit::BytesPerSec;

        while magnitude >= STEP {
            match unit.next() {
                Some(next) => {
                    magnitude /= STEP;
                    unit = next;
                }
                None => break,
            }
        }

        Self { magnitude, unit }
    }
}

impl std::fmt::Display for SpeedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if is_exact_tie(self.magnitude) {
            let rounded = (self.magnitude * 10.0).round() / 10.0;
            write!(f, "{rounded:.1} {}", self.unit)
        } else {
            write!(f, "{:.1} {}", self.magnitude, self.unit)
        }
    }
}

/// True when `value` lies exactly halfway between two one-decimal values.
///
/// `{:.1}` rounds those to even; they go away from zero instead. A binary
/// float can only hold such a tie when it is an odd number of quarters
/// (`x.25`, `x.75`), and multiplying by 4 is exact.
fn is_exact_tie(value: f64) -> bool {
    let quarters = value * 4.0;
    quarters.is_finite() && quarters.fract() == 0.0 && quarters % 2.0 != 0.0
}

/// Render a rate such as `"1.5 MB/s"`
#[must_use]
pub fn format_speed(bytes_per_sec: f64) -> String {
    SpeedValue::from_bytes_per_sec(bytes_per_sec).to_string()
}

/// Render both directions as `"↓ <down> ↑ <up>"`
#[must_use]
pub fn format_display(rates: &Rates) -> String {
    format!("↓ {} ↑ {}", format_speed(rates.rx), format_speed(rates.tx))
}
