use std::fmt::{Display, Formatter, Result as FmtResult};

/// Strength of an effect, from `0` (off) to `100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(u8);
impl Level {
    pub const OFF: Level = Level(0);
    pub const MAX: Level = Level(100);

    /// Any integer is accepted and clamped into `0..=100`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn is_off(&self) -> bool {
        self.0 == 0
    }
}
impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::clamped(i64::from(value))
    }
}
impl From<i64> for Level {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}
impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
