/// Hard fork identifiers, ordered by activation.
///
/// The numeric ordering is load bearing: [`SpecId::is_enabled_in`]
/// compares discriminants.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecId {
    Frontier = 0,
    Homestead,
    /// EIP-150: gas cost changes for IO-heavy operations.
    Tangerine,
    /// EIP-158/161: state clearing.
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    #[default]
    London,
}

impl SpecId {
    /// Returns `true` if `self` is at or past the given fork.
    #[inline]
    pub const fn is_enabled_in(self, other: SpecId) -> bool {
        self as u8 >= other as u8
    }
}

impl core::str::FromStr for SpecId {
    type Err = UnknownSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.to_ascii_lowercase().as_str() {
            "frontier" => Self::Frontier,
            "homestead" => Self::Homestead,
            "tangerine" => Self::Tangerine,
            "spuriousdragon" | "spurious-dragon" => Self::SpuriousDragon,
            "byzantium" => Self::Byzantium,
            "constantinople" => Self::Constantinople,
            "petersburg" => Self::Petersburg,
            "istanbul" => Self::Istanbul,
            "berlin" => Self::Berlin,
            "london" => Self::London,
            _ => return Err(UnknownSpec),
        };
        Ok(id)
    }
}

/// Returned when parsing an unrecognized hard fork name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownSpec;

impl core::fmt::Display for UnknownSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown hard fork name")
    }
}

impl std::error::Error for UnknownSpec {}
