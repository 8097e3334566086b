#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tracked signal [Carrier]. It defines the wavelength used to convert
/// Doppler shifts to pseudo range rates, and the nominal code rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 C/A (GPS/QZSS/SBAS) same frequency as E1 and B1aB1c
    #[default]
    L1,
    /// L2C (GPS/QZSS)
    L2,
    /// L5 (GPS/QZSS/SBAS) same frequency as E5A and B2A
    L5,
    /// E1 (Galileo)
    E1,
    /// E5A (Galileo) same frequency as L5
    E5A,
    /// E5B (Galileo) same frequency as B2iB2b
    E5B,
    /// B1I (BDS)
    B1I,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
            Self::E1 => write!(f, "E1"),
            Self::E5A => write!(f, "E5A"),
            Self::E5B => write!(f, "E5B"),
            Self::B1I => write!(f, "B1I"),
        }
    }
}

impl Carrier {
    /// Carrier frequency in Hz
    pub fn frequency(&self) -> f64 {
        match self {
            Self::L1 | Self::E1 => 1575.42E6_f64,
            Self::L2 => 1227.60E6_f64,
            Self::L5 | Self::E5A => 1176.45E6_f64,
            Self::E5B => 1207.14E6_f64,
            Self::B1I => 1561.098E6_f64,
        }
    }

    /// Wavelength in meters, for given speed of light (m.s⁻¹)
    pub fn wavelength(&self, speed_of_light_m_s: f64) -> f64 {
        speed_of_light_m_s / self.frequency()
    }

    /// Nominal spreading code rate, in chips.s⁻¹
    pub fn chipping_rate(&self) -> f64 {
        match self {
            Self::L1 | Self::E1 => 1.023E6_f64,
            Self::L2 => 1.023E6_f64,
            Self::L5 | Self::E5A | Self::E5B => 10.23E6_f64,
            Self::B1I => 2.046E6_f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Carrier;
    use crate::constants::SPEED_OF_LIGHT_M_S;

    #[test]
    fn l1_wavelength() {
        let lambda = Carrier::L1.wavelength(SPEED_OF_LIGHT_M_S);
        assert!((lambda - 0.190293672798365).abs() < 1.0E-12);
    }

    #[test]
    fn carrier_to_code_ratio() {
        // 1540 carrier cycles per C/A chip
        let ratio = Carrier::L1.frequency() / Carrier::L1.chipping_rate();
        assert!((ratio - 1540.0).abs() < 1.0E-9);

        // 115 carrier cycles per L5 chip
        let ratio = Carrier::L5.frequency() / Carrier::L5.chipping_rate();
        assert!((ratio - 115.0).abs() < 1.0E-9);
    }
}
