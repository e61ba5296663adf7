use serde::{Deserialize, Serialize};
use std::fmt;

/// Planets that carry natural-satellite designations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub fn letter(self) -> char {
        match self {
            Planet::Earth => 'E',
            Planet::Mars => 'M',
            Planet::Jupiter => 'J',
            Planet::Saturn => 'S',
            Planet::Uranus => 'U',
            Planet::Neptune => 'N',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'E' => Some(Planet::Earth),
            'M' => Some(Planet::Mars),
            'J' => Some(Planet::Jupiter),
            'S' => Some(Planet::Saturn),
            'U' => Some(Planet::Uranus),
            'N' => Some(Planet::Neptune),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        }
    }
}

/// Comet orbit classification letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CometOrbitType {
    /// `C` — long-period
    LongPeriod,
    /// `P` — periodic
    Periodic,
    /// `D` — defunct or lost
    Defunct,
    /// `X` — orbit not computable
    Uncertain,
    /// `I` — interstellar
    Interstellar,
    /// `A` — minor planet given a cometary designation
    Asteroidal,
}

impl CometOrbitType {
    pub fn letter(self) -> char {
        match self {
            CometOrbitType::LongPeriod => 'C',
            CometOrbitType::Periodic => 'P',
            CometOrbitType::Defunct => 'D',
            CometOrbitType::Uncertain => 'X',
            CometOrbitType::Interstellar => 'I',
            CometOrbitType::Asteroidal => 'A',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'C' => Some(CometOrbitType::LongPeriod),
            'P' => Some(CometOrbitType::Periodic),
            'D' => Some(CometOrbitType::Defunct),
            'X' => Some(CometOrbitType::Uncertain),
            'I' => Some(CometOrbitType::Interstellar),
            'A' => Some(CometOrbitType::Asteroidal),
            _ => None,
        }
    }
}

/// Provisional minor-planet designation, e.g. `1998 SQ108`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvisionalMp {
    pub year: i32,
    /// Half-month letter, `A`-`Y` excluding `I`.
    pub half_month: char,
    /// Order letter within the half month, `A`-`Z` excluding `I`.
    pub order: char,
    /// Number of completed order-letter cycles, 0 for the first pass.
    pub cycle: u32,
}

/// Provisional comet designation, e.g. `1995 A1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CometProvisional {
    pub year: i32,
    pub half_month: char,
    /// Running number within the half month, starting at 1.
    pub order: u32,
}

/// Comet designation: a periodic number, a provisional part, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CometDesignation {
    pub orbit_type: Option<CometOrbitType>,
    pub number: Option<u32>,
    pub provisional: Option<CometProvisional>,
    /// Fragment letter of a split comet, stored upper-case.
    pub fragment: Option<char>,
}

/// Natural-satellite designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatelliteDesignation {
    /// e.g. Jupiter XIII
    Permanent { planet: Planet, number: u32 },
    /// e.g. S/2003 J 2
    Provisional { year: i32, planet: Planet, order: u32 },
}

/// Canonical object identifier, one of the four designation schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    MinorPlanet(u32),
    ProvisionalMinorPlanet(ProvisionalMp),
    Comet(CometDesignation),
    Satellite(SatelliteDesignation),
}

fn roman(mut n: u32) -> String {
    const TABLE: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

impl fmt::Display for ProvisionalMp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.year, self.half_month, self.order)?;
        if self.cycle > 0 {
            write!(f, "{}", self.cycle)?;
        }
        Ok(())
    }
}

impl fmt::Display for CometProvisional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.year, self.half_month, self.order)
    }
}

impl fmt::Display for CometDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.number, self.orbit_type, self.provisional) {
            (Some(n), Some(t), _) => write!(f, "{}{}", n, t.letter())?,
            (_, Some(t), Some(p)) => write!(f, "{}/{}", t.letter(), p)?,
            (_, None, Some(p)) => write!(f, "{}", p)?,
            (Some(n), None, None) => write!(f, "{}", n)?,
            (None, Some(t), None) => write!(f, "{}/?", t.letter())?,
            (None, None, None) => write!(f, "?")?,
        }
        if let Some(frag) = self.fragment {
            write!(f, "-{}", frag.to_ascii_uppercase())?;
        }
        Ok(())
    }
}

impl fmt::Display for SatelliteDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatelliteDesignation::Permanent { planet, number } => {
                write!(f, "{} {}", planet.name(), roman(*number))
            }
            SatelliteDesignation::Provisional {
                year,
                planet,
                order,
            } => write!(f, "S/{} {} {}", year, planet.letter(), order),
        }
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Designation::MinorPlanet(n) => write!(f, "({n})"),
            Designation::ProvisionalMinorPlanet(p) => write!(f, "{p}"),
            Designation::Comet(c) => write!(f, "{c}"),
            Designation::Satellite(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Designation::MinorPlanet(3708).to_string(), "(3708)");
        assert_eq!(
            Designation::ProvisionalMinorPlanet(ProvisionalMp {
                year: 1998,
                half_month: 'S',
                order: 'Q',
                cycle: 108
            })
            .to_string(),
            "1998 SQ108"
        );
        assert_eq!(
            Designation::ProvisionalMinorPlanet(ProvisionalMp {
                year: 1995,
                half_month: 'X',
                order: 'A',
                cycle: 0
            })
            .to_string(),
            "1995 XA"
        );
        assert_eq!(
            Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Interstellar),
                number: Some(3),
                provisional: None,
                fragment: None
            })
            .to_string(),
            "3I"
        );
        assert_eq!(
            Designation::Comet(CometDesignation {
                orbit_type: None,
                number: None,
                provisional: Some(CometProvisional {
                    year: 1994,
                    half_month: 'P',
                    order: 1
                }),
                fragment: Some('B')
            })
            .to_string(),
            "1994 P1-B"
        );
        assert_eq!(
            Designation::Satellite(SatelliteDesignation::Permanent {
                planet: Planet::Jupiter,
                number: 13
            })
            .to_string(),
            "Jupiter XIII"
        );
        assert_eq!(
            Designation::Satellite(SatelliteDesignation::Provisional {
                year: 2003,
                planet: Planet::Jupiter,
                order: 2
            })
            .to_string(),
            "S/2003 J 2"
        );
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(roman(1), "I");
        assert_eq!(roman(4), "IV");
        assert_eq!(roman(13), "XIII");
        assert_eq!(roman(99), "XCIX");
        assert_eq!(roman(444), "CDXLIV");
    }
}
