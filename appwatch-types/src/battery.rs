//! Battery charging state.

/// Charging state reported by the host's power source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargeState {
    /// The host cannot determine the charging state.
    #[default]
    Unknown,
    /// On battery power.
    Unplugged,
    /// Plugged in and charging.
    Charging,
    /// Plugged in at full charge.
    Full,
}

impl ChargeState {
    /// Whether external power is attached.
    pub fn is_plugged(&self) -> bool {
        matches!(self, ChargeState::Charging | ChargeState::Full)
    }
}
