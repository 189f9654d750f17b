//! SPI clock register derivation
//!
//! The ESP32 SPI clock register packs a prescaler and a counter:
//!
//! | bits   | field   |
//! |--------|---------|
//! | 0..6   | `l`     |
//! | 6..12  | `h`     |
//! | 12..18 | `n`     |
//! | 18..31 | `pre`   |
//! | 31     | sysclk  |
//!
//! The bus runs at `apb / ((pre + 1) * (n + 1))`, or straight at the APB clock
//! when the sysclk bit is set.

/// APB clock feeding the SPI peripherals
pub const APB_CLK_FREQ: u32 = 80_000_000;

/// Clock used when `begin` gets no speed and the config has none either
pub const DEFAULT_SPEED: u32 = 40_000_000;

const SYSCLK_BIT: u32 = 1 << 31;
const FIELD_MASK: u32 = 0x3F;
const PRE_MASK: u32 = 0x1FFF;
/// Slowest setting: `pre` and `n` at their maximum
const MIN_REG: u32 = 0x7FFF_F000;

/// Raw value for the SPI clock register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockDivider(u32);

impl ClockDivider {
    /// Bypass the divider and clock the bus from APB
    pub const SYSCLK: Self = Self(SYSCLK_BIT);

    /// Wrap an already computed register value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Register value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    pub const fn l(&self) -> u32 {
        self.0 & FIELD_MASK
    }

    pub const fn h(&self) -> u32 {
        (self.0 >> 6) & FIELD_MASK
    }

    pub const fn n(&self) -> u32 {
        (self.0 >> 12) & FIELD_MASK
    }

    pub const fn pre(&self) -> u32 {
        (self.0 >> 18) & PRE_MASK
    }

    pub const fn equals_sysclk(&self) -> bool {
        self.0 & SYSCLK_BIT != 0
    }

    const fn pack(pre: u32, n: u32, l: u32) -> Self {
        Self(((pre & PRE_MASK) << 18) | ((n & FIELD_MASK) << 12) | (l & FIELD_MASK))
    }

    /// Bus clock this register produces from `apb`
    pub const fn frequency(&self, apb: u32) -> u32 {
        if self.equals_sysclk() {
            apb
        } else {
            apb / ((self.pre() + 1) * (self.n() + 1))
        }
    }

    /// Find the register setting closest to `freq` without going over it.
    ///
    /// Requests at or above `apb` select [`ClockDivider::SYSCLK`]; requests
    /// below the slowest achievable clock get the slowest setting.
    pub fn from_frequency(freq: u32, apb: u32) -> Self {
        if freq >= apb {
            return Self::SYSCLK;
        }

        let slowest = Self(MIN_REG);
        if freq < slowest.frequency(apb) {
            return slowest;
        }

        let mut best = Self(0);
        let mut best_freq = 0u32;

        for n in 1..=FIELD_MASK {
            let base = i64::from(apb / (n + 1) / freq) - 1;
            for offset in -1..=2 {
                let pre = (base + offset).clamp(0, i64::from(PRE_MASK)) as u32;
                let candidate = Self::pack(pre, n, (n + 1) / 2);
                let candidate_freq = candidate.frequency(apb);

                if candidate_freq == freq {
                    return candidate;
                }
                if candidate_freq < freq && freq - candidate_freq < freq.abs_diff(best_freq) {
                    best = candidate;
                    best_freq = candidate_freq;
                }
            }
        }

        best
    }
}
