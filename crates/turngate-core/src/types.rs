use crate::{
    Result,
    constants::DIRECTION_SEPARATOR,
    error::Error,
    validator::is_admissible,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logic level of a digital output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite logic level.
    #[inline]
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Returns `true` if the level is High.
    #[inline]
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Relay polarity: which level the pin rests at between pulses.
///
/// With `RestHigh` a pulse drives the line Low, with `RestLow` it drives
/// the line High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    RestLow,
    RestHigh,
}

impl Polarity {
    /// Map the persisted `high_mode` flag to a polarity.
    #[inline]
    #[must_use]
    pub fn from_high_mode(high_mode: bool) -> Self {
        if high_mode {
            Polarity::RestHigh
        } else {
            Polarity::RestLow
        }
    }

    /// Level the pin is held at while no pulse is running.
    #[inline]
    #[must_use]
    pub fn resting(self) -> Level {
        match self {
            Polarity::RestLow => Level::Low,
            Polarity::RestHigh => Level::High,
        }
    }

    /// Level the pin is driven to for the duration of a pulse.
    #[inline]
    #[must_use]
    pub fn active(self) -> Level {
        self.resting().inverted()
    }
}

/// Direction a ticket holder is passing the gate.
///
/// The backend encodes it as `0` for inbound and `1` for outbound, both in
/// the `accessDir` request field and in the `:0`/`:1` guid suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccessDirection {
    Inbound = 0,
    Outbound = 1,
}

impl AccessDirection {
    /// Map the persisted `direction_out` flag to a direction.
    #[inline]
    #[must_use]
    pub fn from_direction_out(direction_out: bool) -> Self {
        if direction_out {
            AccessDirection::Outbound
        } else {
            AccessDirection::Inbound
        }
    }

    /// Wire code sent to the backend.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AccessDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccessDirection::Inbound => write!(f, "Inbound"),
            AccessDirection::Outbound => write!(f, "Outbound"),
        }
    }
}

/// Identifier of the GPIO line that drives the relay.
///
/// Persisted either as a bare number (`relay_pin: 17`) or as a name
/// (`relay_pin: GPIO17`, `relay_pin: P1_11`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinId {
    Number(u32),
    Name(String),
}

/// Raspberry Pi 40-pin header positions wired to a GPIO line, as (pin, BCM line).
const RPI_HEADER: [(u32, u32); 28] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

impl PinId {
    /// Resolve the identifier to a numeric GPIO line.
    ///
    /// Accepts plain numbers, `GPIO<n>` / `BCM<n>` names and Raspberry Pi
    /// header names of the form `P1_<pin>`.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the name is not recognized or the header
    /// position is not a GPIO line (power, ground).
    pub fn line(&self) -> Result<u32> {
        let name = match self {
            PinId::Number(n) => return Ok(*n),
            PinId::Name(name) => name.trim(),
        };

        let upper = name.to_ascii_uppercase();
        if let Ok(n) = upper.parse::<u32>() {
            return Ok(n);
        }

        if let Some(rest) = upper
            .strip_prefix("GPIO")
            .or_else(|| upper.strip_prefix("BCM"))
        {
            return rest
                .parse()
                .map_err(|_| Error::InvalidPin(name.to_string()));
        }

        if let Some(rest) = upper.strip_prefix("P1_") {
            let header: u32 = rest
                .parse()
                .map_err(|_| Error::InvalidPin(name.to_string()))?;
            return RPI_HEADER
                .iter()
                .find(|(pin, _)| *pin == header)
                .map(|(_, line)| *line)
                .ok_or_else(|| Error::InvalidPin(name.to_string()));
        }

        Err(Error::InvalidPin(name.to_string()))
    }
}

impl Default for PinId {
    fn default() -> Self {
        PinId::Number(crate::constants::DEFAULT_RELAY_PIN)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinId::Number(n) => write!(f, "{n}"),
            PinId::Name(name) => write!(f, "{name}"),
        }
    }
}

impl std::str::FromStr for PinId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidPin(s.to_string()));
        }
        let pin = match s.parse::<u32>() {
            Ok(n) => PinId::Number(n),
            Err(_) => PinId::Name(s.to_string()),
        };
        pin.line()?;
        Ok(pin)
    }
}

/// A scanned string that passed the prefix filter.
///
/// The code is kept verbatim; it may already carry a `:0`/`:1` direction
/// suffix when the scanner encodes one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketCode(String);

impl TicketCode {
    /// Accept a raw scan as a ticket code.
    ///
    /// # Errors
    /// Returns `Error::Rejected` carrying the raw text if it does not start
    /// with one of the permitted prefixes.
    pub fn parse(text: &str) -> Result<Self> {
        if is_admissible(text) {
            Ok(TicketCode(text.to_string()))
        } else {
            Err(Error::Rejected(text.to_string()))
        }
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code already carries a direction suffix.
    #[must_use]
    pub fn has_direction(&self) -> bool {
        self.0.contains(DIRECTION_SEPARATOR)
    }

    /// Build the guid sent to the consume endpoint.
    ///
    /// Codes without a direction suffix get `:0` or `:1` appended; codes
    /// that already contain a colon are sent unchanged.
    #[must_use]
    pub fn guid(&self, direction: AccessDirection) -> String {
        if self.has_direction() {
            self.0.clone()
        } else {
            format!("{}{}{}", self.0, DIRECTION_SEPARATOR, direction.code())
        }
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TicketCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TicketCode::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_level_inverted() {
        assert_eq!(Level::High.inverted(), Level::Low);
        assert_eq!(Level::Low.inverted(), Level::High);
        assert!(Level::High.is_high());
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn test_polarity_levels() {
        let high = Polarity::from_high_mode(true);
        assert_eq!(high, Polarity::RestHigh);
        assert_eq!(high.resting(), Level::High);
        assert_eq!(high.active(), Level::Low);

        let low = Polarity::from_high_mode(false);
        assert_eq!(low, Polarity::RestLow);
        assert_eq!(low.resting(), Level::Low);
        assert_eq!(low.active(), Level::High);
    }

    #[test]
    fn test_access_direction_codes() {
        assert_eq!(AccessDirection::from_direction_out(false).code(), 0);
        assert_eq!(AccessDirection::from_direction_out(true).code(), 1);
        assert_eq!(AccessDirection::Outbound.to_string(), "Outbound");
    }

    #[rstest]
    #[case(PinId::Number(17), 17)]
    #[case(PinId::Name("22".to_string()), 22)]
    #[case(PinId::Name("GPIO27".to_string()), 27)]
    #[case(PinId::Name("gpio4".to_string()), 4)]
    #[case(PinId::Name("BCM18".to_string()), 18)]
    #[case(PinId::Name("P1_11".to_string()), 17)]
    #[case(PinId::Name("P1_40".to_string()), 21)]
    fn test_pin_id_line(#[case] pin: PinId, #[case] expected: u32) {
        assert_eq!(pin.line().unwrap(), expected);
    }

    #[rstest]
    #[case("P1_1")] // 3.3V supply
    #[case("P1_6")] // ground
    #[case("GPIOX")]
    #[case("relay")]
    fn test_pin_id_line_invalid(#[case] name: &str) {
        let pin = PinId::Name(name.to_string());
        assert!(matches!(pin.line(), Err(Error::InvalidPin(_))));
    }

    #[test]
    fn test_pin_id_from_str() {
        assert_eq!("17".parse::<PinId>().unwrap(), PinId::Number(17));
        assert_eq!(
            "P1_11".parse::<PinId>().unwrap(),
            PinId::Name("P1_11".to_string())
        );
        assert!("".parse::<PinId>().is_err());
        assert!("nonsense".parse::<PinId>().is_err());
    }

    #[test]
    fn test_pin_id_default() {
        assert_eq!(PinId::default(), PinId::Number(17));
    }

    #[rstest]
    #[case("SU_ABC123", AccessDirection::Inbound, "SU_ABC123:0")]
    #[case("SU_ABC123", AccessDirection::Outbound, "SU_ABC123:1")]
    #[case("SU_ABC123:1", AccessDirection::Inbound, "SU_ABC123:1")]
    #[case("EV_X:0", AccessDirection::Outbound, "EV_X:0")]
    fn test_ticket_code_guid(
        #[case] code: &str,
        #[case] direction: AccessDirection,
        #[case] expected: &str,
    ) {
        let ticket = TicketCode::parse(code).unwrap();
        assert_eq!(ticket.guid(direction), expected);
    }

    #[test]
    fn test_ticket_code_rejects_unknown_prefix() {
        let err = TicketCode::parse("GC_123").unwrap_err();
        assert_eq!(err.to_string(), "GC_123 is not permitted");
    }
}
