use crate::designation::types::{
    CometDesignation, CometOrbitType, CometProvisional, Designation, Planet, ProvisionalMp,
    SatelliteDesignation,
};
use crate::prelude::{CoreError, CoreResult};

/// Width of the packed designation field.
pub const PACKED_WIDTH: usize = 7;

/// Largest minor-planet number the packed form can carry:
/// 620000 + 62^4 - 1 under the tilde extension.
pub const MAX_MINOR_PLANET_NUMBER: u32 = 620_000 + 62 * 62 * 62 * 62 - 1;

fn base62_char(value: u32) -> Option<char> {
    match value {
        0..=9 => Some((b'0' + value as u8) as char),
        10..=35 => Some((b'A' + (value - 10) as u8) as char),
        36..=61 => Some((b'a' + (value - 36) as u8) as char),
        _ => None,
    }
}

fn base62_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 36),
        _ => None,
    }
}

fn century_letter(year: i32) -> CoreResult<(char, u8)> {
    let letter = match year / 100 {
        18 => 'I',
        19 => 'J',
        20 => 'K',
        _ => {
            return Err(CoreError::UnrepresentableDesignation(format!(
                "year {year} is outside the packable range 1800-2099"
            )))
        }
    };
    Ok((letter, (year % 100) as u8))
}

fn century_from_letter(c: char) -> Option<i32> {
    match c {
        'I' => Some(1800),
        'J' => Some(1900),
        'K' => Some(2000),
        _ => None,
    }
}

fn valid_half_month(c: char) -> bool {
    ('A'..='Y').contains(&c) && c != 'I'
}

fn valid_order_letter(c: char) -> bool {
    c.is_ascii_uppercase() && c != 'I'
}

/// Pack a cycle/order count into the two-character field: plain digits up to
/// 99, then a base-62 lead character up to 619.
fn pack_two_char(value: u32, what: &str) -> CoreResult<[char; 2]> {
    if value > 619 {
        return Err(CoreError::UnrepresentableDesignation(format!(
            "{what} {value} exceeds the two-character budget (max 619)"
        )));
    }
    let lead = base62_char(value / 10).expect("value/10 <= 61");
    let tail = (b'0' + (value % 10) as u8) as char;
    Ok([lead, tail])
}

fn unpack_two_char(c1: char, c2: char, what: &str) -> CoreResult<u32> {
    let tail = c2
        .to_digit(10)
        .ok_or_else(|| CoreError::MalformedPackedForm(format!("bad {what} digit {c2:?}")))?;
    let lead = base62_value(c1)
        .ok_or_else(|| CoreError::MalformedPackedForm(format!("bad {what} character {c1:?}")))?;
    Ok(lead * 10 + tail)
}

/// Pack a minor-planet number into its five-character form.
pub fn pack_minor_planet_number(number: u32) -> CoreResult<String> {
    if number == 0 {
        return Err(CoreError::UnrepresentableDesignation(
            "minor-planet numbers start at 1".into(),
        ));
    }
    if number < 100_000 {
        return Ok(format!("{number:05}"));
    }
    if number < 620_000 {
        let lead = base62_char(number / 10_000).expect("62 > number/10000 >= 10");
        return Ok(format!("{lead}{:04}", number % 10_000));
    }
    if number <= MAX_MINOR_PLANET_NUMBER {
        let mut rest = number - 620_000;
        let mut digits = ['0'; 4];
        for slot in digits.iter_mut().rev() {
            *slot = base62_char(rest % 62).expect("base62 digit");
            rest /= 62;
        }
        return Ok(format!("~{}{}{}{}", digits[0], digits[1], digits[2], digits[3]));
    }
    Err(CoreError::UnrepresentableDesignation(format!(
        "minor-planet number {number} exceeds the packed budget ({MAX_MINOR_PLANET_NUMBER})"
    )))
}

/// Unpack a five-character minor-planet number.
pub fn unpack_minor_planet_number(s: &str) -> CoreResult<u32> {
    if !s.is_ascii() {
        return Err(CoreError::MalformedPackedForm(format!(
            "minor-planet number field {s:?} contains non-ASCII characters"
        )));
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 5 {
        return Err(CoreError::MalformedPackedForm(format!(
            "minor-planet number field {s:?} is not 5 characters"
        )));
    }
    if chars[0] == '~' {
        let mut value = 0u32;
        for &c in &chars[1..] {
            let digit = base62_value(c).ok_or_else(|| {
                CoreError::MalformedPackedForm(format!("bad extended-number digit {c:?} in {s:?}"))
            })?;
            value = value * 62 + digit;
        }
        return Ok(620_000 + value);
    }
    let tail: Option<u32> = s[1..].parse().ok();
    let tail = tail.filter(|_| chars[1..].iter().all(|c| c.is_ascii_digit()));
    let (lead, tail) = match (base62_value(chars[0]), tail) {
        (Some(lead), Some(tail)) => (lead, tail),
        _ => {
            return Err(CoreError::MalformedPackedForm(format!(
                "bad minor-planet number {s:?}"
            )))
        }
    };
    let number = lead * 10_000 + tail;
    if number == 0 {
        return Err(CoreError::MalformedPackedForm(
            "minor-planet number 0 does not exist".into(),
        ));
    }
    Ok(number)
}

/// Pack a provisional minor-planet designation into its seven-character form,
/// e.g. `1998 SQ108` -> `J98SA8Q`.
pub fn pack_provisional_mp(p: &ProvisionalMp) -> CoreResult<String> {
    let (century, yy) = century_letter(p.year)?;
    if !valid_half_month(p.half_month) {
        return Err(CoreError::UnrepresentableDesignation(format!(
            "invalid half-month letter {:?}",
            p.half_month
        )));
    }
    if !valid_order_letter(p.order) {
        return Err(CoreError::UnrepresentableDesignation(format!(
            "invalid order letter {:?}",
            p.order
        )));
    }
    let cycle = pack_two_char(p.cycle, "cycle count")?;
    Ok(format!(
        "{century}{yy:02}{}{}{}{}",
        p.half_month, cycle[0], cycle[1], p.order
    ))
}

/// Unpack a seven-character provisional minor-planet designation.
pub fn unpack_provisional_mp(s: &str) -> CoreResult<ProvisionalMp> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != PACKED_WIDTH {
        return Err(CoreError::MalformedPackedForm(format!(
            "provisional designation {s:?} is not 7 characters"
        )));
    }
    let century = century_from_letter(chars[0]).ok_or_else(|| {
        CoreError::MalformedPackedForm(format!("bad century letter {:?} in {s:?}", chars[0]))
    })?;
    let yy = two_digits(chars[1], chars[2], s)?;
    if !valid_half_month(chars[3]) {
        return Err(CoreError::MalformedPackedForm(format!(
            "bad half-month letter {:?} in {s:?}",
            chars[3]
        )));
    }
    if !valid_order_letter(chars[6]) {
        return Err(CoreError::MalformedPackedForm(format!(
            "bad order letter {:?} in {s:?}",
            chars[6]
        )));
    }
    Ok(ProvisionalMp {
        year: century + yy as i32,
        half_month: chars[3],
        order: chars[6],
        cycle: unpack_two_char(chars[4], chars[5], "cycle count")?,
    })
}

/// Pack a provisional comet designation (with optional fragment) into its
/// seven-character form, e.g. `1995 A1` -> `J95A010`, `1994 P1-B` -> `J94P01b`.
pub fn pack_comet_provisional(
    p: &CometProvisional,
    fragment: Option<char>,
) -> CoreResult<String> {
    let (century, yy) = century_letter(p.year)?;
    if !valid_half_month(p.half_month) {
        return Err(CoreError::UnrepresentableDesignation(format!(
            "invalid half-month letter {:?}",
            p.half_month
        )));
    }
    if p.order == 0 {
        return Err(CoreError::UnrepresentableDesignation(
            "comet order numbers start at 1".into(),
        ));
    }
    let order = pack_two_char(p.order, "order number")?;
    let tail = match fragment {
        None => '0',
        Some(f) if f.is_ascii_alphabetic() => f.to_ascii_lowercase(),
        Some(f) => {
            return Err(CoreError::UnrepresentableDesignation(format!(
                "invalid fragment letter {f:?}"
            )))
        }
    };
    Ok(format!(
        "{century}{yy:02}{}{}{}{tail}",
        p.half_month, order[0], order[1]
    ))
}

/// Unpack a seven-character provisional comet designation.
pub fn unpack_comet_provisional(s: &str) -> CoreResult<(CometProvisional, Option<char>)> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != PACKED_WIDTH {
        return Err(CoreError::MalformedPackedForm(format!(
            "comet designation {s:?} is not 7 characters"
        )));
    }
    let century = century_from_letter(chars[0]).ok_or_else(|| {
        CoreError::MalformedPackedForm(format!("bad century letter {:?} in {s:?}", chars[0]))
    })?;
    let yy = two_digits(chars[1], chars[2], s)?;
    if !valid_half_month(chars[3]) {
        return Err(CoreError::MalformedPackedForm(format!(
            "bad half-month letter {:?} in {s:?}",
            chars[3]
        )));
    }
    let order = unpack_two_char(chars[4], chars[5], "order number")?;
    if order == 0 {
        return Err(CoreError::MalformedPackedForm(format!(
            "comet order 0 in {s:?}"
        )));
    }
    let fragment = match chars[6] {
        '0' => None,
        c if c.is_ascii_lowercase() => Some(c.to_ascii_uppercase()),
        c => {
            return Err(CoreError::MalformedPackedForm(format!(
                "bad fragment column {c:?} in {s:?}"
            )))
        }
    };
    Ok((
        CometProvisional {
            year: century + yy as i32,
            half_month: chars[3],
            order,
        },
        fragment,
    ))
}

/// Pack a satellite designation: `J013S` for Jupiter XIII, `SK03J02` for
/// S/2003 J 2.
pub fn pack_satellite(sat: &SatelliteDesignation) -> CoreResult<String> {
    match sat {
        SatelliteDesignation::Permanent { planet, number } => {
            if *number == 0 || *number > 999 {
                return Err(CoreError::UnrepresentableDesignation(format!(
                    "satellite number {number} is outside 1-999"
                )));
            }
            Ok(format!("{}{number:03}S", planet.letter()))
        }
        SatelliteDesignation::Provisional {
            year,
            planet,
            order,
        } => {
            let (century, yy) = century_letter(*year)?;
            if *order == 0 || *order > 99 {
                return Err(CoreError::UnrepresentableDesignation(format!(
                    "satellite order {order} is outside 1-99"
                )));
            }
            Ok(format!("S{century}{yy:02}{}{order:02}", planet.letter()))
        }
    }
}

fn two_digits(c1: char, c2: char, context: &str) -> CoreResult<u32> {
    match (c1.to_digit(10), c2.to_digit(10)) {
        (Some(a), Some(b)) => Ok(a * 10 + b),
        _ => Err(CoreError::MalformedPackedForm(format!(
            "expected digits, got {c1:?}{c2:?} in {context:?}"
        ))),
    }
}

/// Pack any designation into the 7-character packed field, right-padded with
/// spaces for the shorter schemes. Fails with `UnrepresentableDesignation`
/// for values outside the character budget; never truncates.
pub fn pack(designation: &Designation) -> CoreResult<String> {
    let packed = match designation {
        Designation::MinorPlanet(number) => format!("{}  ", pack_minor_planet_number(*number)?),
        Designation::ProvisionalMinorPlanet(p) => pack_provisional_mp(p)?,
        Designation::Comet(c) => pack_comet(c)?,
        Designation::Satellite(sat) => {
            let packed = pack_satellite(sat)?;
            format!("{:<width$}", packed, width = PACKED_WIDTH)
        }
    };
    debug_assert_eq!(packed.len(), PACKED_WIDTH);
    Ok(packed)
}

fn pack_comet(c: &CometDesignation) -> CoreResult<String> {
    match (c.number, c.provisional) {
        (Some(_), Some(_)) => Err(CoreError::UnrepresentableDesignation(
            "a numbered comet with a provisional part needs the 12-column record layout".into(),
        )),
        (None, Some(p)) => {
            if c.orbit_type.is_some() {
                return Err(CoreError::UnrepresentableDesignation(
                    "a comet orbit type does not fit the 7-character form; use the record layout"
                        .into(),
                ));
            }
            pack_comet_provisional(&p, c.fragment)
        }
        (Some(number), None) => {
            let orbit_type = c.orbit_type.ok_or_else(|| {
                CoreError::UnrepresentableDesignation(
                    "a numbered comet needs its orbit-type letter".into(),
                )
            })?;
            if number == 0 || number > 9999 {
                return Err(CoreError::UnrepresentableDesignation(format!(
                    "periodic comet number {number} is outside 1-9999"
                )));
            }
            if c.fragment.is_some() {
                return Err(CoreError::UnrepresentableDesignation(
                    "a numbered-comet fragment needs the 12-column record layout".into(),
                ));
            }
            Ok(format!("{number:04}{}  ", orbit_type.letter()))
        }
        (None, None) => Err(CoreError::UnrepresentableDesignation(
            "comet designation has neither a number nor a provisional part".into(),
        )),
    }
}

/// Unpack a packed designation field (5 or 7 significant characters, with or
/// without right padding). Ambiguous or malformed codes are rejected, never
/// guessed at.
pub fn unpack(packed: &str) -> CoreResult<Designation> {
    if !packed.is_ascii() {
        return Err(CoreError::MalformedPackedForm(format!(
            "packed designation {packed:?} contains non-ASCII characters"
        )));
    }
    let trimmed = packed.trim_end_matches(' ');
    let chars: Vec<char> = trimmed.chars().collect();
    match chars.len() {
        5 => unpack_five(trimmed, &chars),
        7 => unpack_seven(trimmed, &chars),
        _ => Err(CoreError::MalformedPackedForm(format!(
            "packed designation {packed:?} has unsupported length {}",
            chars.len()
        ))),
    }
}

fn unpack_five(s: &str, chars: &[char]) -> CoreResult<Designation> {
    if chars[0] == '~' || chars.iter().all(|c| c.is_ascii_digit()) {
        return Ok(Designation::MinorPlanet(unpack_minor_planet_number(s)?));
    }
    // Numbered comet: four digits and an orbit-type letter.
    if chars[..4].iter().all(|c| c.is_ascii_digit()) {
        if let Some(orbit_type) = CometOrbitType::from_letter(chars[4]) {
            let number = two_digits(chars[0], chars[1], s)? * 100 + two_digits(chars[2], chars[3], s)?;
            if number == 0 {
                return Err(CoreError::MalformedPackedForm(format!(
                    "periodic comet number 0 in {s:?}"
                )));
            }
            return Ok(Designation::Comet(CometDesignation {
                orbit_type: Some(orbit_type),
                number: Some(number),
                provisional: None,
                fragment: None,
            }));
        }
        return Err(CoreError::MalformedPackedForm(format!(
            "bad orbit-type letter {:?} in {s:?}",
            chars[4]
        )));
    }
    // Permanent satellite: planet letter, three digits, trailing S.
    if chars[4] == 'S' && chars[1..4].iter().all(|c| c.is_ascii_digit()) {
        let planet = Planet::from_letter(chars[0]).ok_or_else(|| {
            CoreError::MalformedPackedForm(format!("bad planet letter {:?} in {s:?}", chars[0]))
        })?;
        let number = two_digits(chars[1], chars[2], s)? * 10
            + chars[3].to_digit(10).expect("checked digit");
        if number == 0 {
            return Err(CoreError::MalformedPackedForm(format!(
                "satellite number 0 in {s:?}"
            )));
        }
        return Ok(Designation::Satellite(SatelliteDesignation::Permanent {
            planet,
            number,
        }));
    }
    // High-numbered minor planet: base-62 lead character, four digits.
    if chars[0].is_ascii_alphabetic() && chars[1..].iter().all(|c| c.is_ascii_digit()) {
        return Ok(Designation::MinorPlanet(unpack_minor_planet_number(s)?));
    }
    Err(CoreError::MalformedPackedForm(format!(
        "unrecognized packed designation {s:?}"
    )))
}

fn unpack_seven(s: &str, chars: &[char]) -> CoreResult<Designation> {
    if chars[0] == 'S' {
        // Provisional satellite: S + century + yy + planet + order.
        let century = century_from_letter(chars[1]).ok_or_else(|| {
            CoreError::MalformedPackedForm(format!("bad century letter {:?} in {s:?}", chars[1]))
        })?;
        let yy = two_digits(chars[2], chars[3], s)?;
        let planet = Planet::from_letter(chars[4]).ok_or_else(|| {
            CoreError::MalformedPackedForm(format!("bad planet letter {:?} in {s:?}", chars[4]))
        })?;
        let order = two_digits(chars[5], chars[6], s)?;
        if order == 0 {
            return Err(CoreError::MalformedPackedForm(format!(
                "satellite order 0 in {s:?}"
            )));
        }
        return Ok(Designation::Satellite(SatelliteDesignation::Provisional {
            year: century + yy as i32,
            planet,
            order,
        }));
    }
    if century_from_letter(chars[0]).is_some() {
        // The trailing column separates the minor-planet form (an order
        // letter) from the comet form (a fragment letter or '0').
        return match chars[6] {
            c if c.is_ascii_uppercase() => Ok(Designation::ProvisionalMinorPlanet(
                unpack_provisional_mp(s)?,
            )),
            '0' | 'a'..='z' => {
                let (provisional, fragment) = unpack_comet_provisional(s)?;
                Ok(Designation::Comet(CometDesignation {
                    orbit_type: None,
                    number: None,
                    provisional: Some(provisional),
                    fragment,
                }))
            }
            c => Err(CoreError::MalformedPackedForm(format!(
                "bad trailing column {c:?} in {s:?}"
            ))),
        };
    }
    Err(CoreError::MalformedPackedForm(format!(
        "unrecognized packed designation {s:?}"
    )))
}

/// Lay a designation out over the report's columns 1-12.
///
/// Numbered schemes occupy columns 1-5, provisional parts columns 6-12;
/// comets put the periodic number in 1-4, the orbit-type letter in 5, and a
/// lower-case fragment letter in column 12.
pub fn pack_record_columns(designation: &Designation) -> CoreResult<String> {
    let columns = match designation {
        Designation::MinorPlanet(number) => {
            format!("{}       ", pack_minor_planet_number(*number)?)
        }
        Designation::ProvisionalMinorPlanet(p) => format!("     {}", pack_provisional_mp(p)?),
        Designation::Satellite(sat) => {
            let packed = pack_satellite(sat)?;
            match sat {
                SatelliteDesignation::Permanent { .. } => format!("{packed}       "),
                SatelliteDesignation::Provisional { .. } => format!("     {packed}"),
            }
        }
        Designation::Comet(c) => {
            let orbit_type = c.orbit_type.ok_or_else(|| {
                CoreError::UnrepresentableDesignation(
                    "a comet record requires an orbit-type letter".into(),
                )
            })?;
            let number_field = match c.number {
                Some(n) if n >= 1 && n <= 9999 => format!("{n:04}"),
                Some(n) => {
                    return Err(CoreError::UnrepresentableDesignation(format!(
                        "periodic comet number {n} is outside 1-9999"
                    )))
                }
                None => "    ".into(),
            };
            let tail = match (c.provisional, c.fragment) {
                (Some(p), fragment) => pack_comet_provisional(&p, fragment)?,
                (None, Some(f)) if f.is_ascii_alphabetic() => {
                    format!("      {}", f.to_ascii_lowercase())
                }
                (None, Some(f)) => {
                    return Err(CoreError::UnrepresentableDesignation(format!(
                        "invalid fragment letter {f:?}"
                    )))
                }
                (None, None) => "       ".into(),
            };
            format!("{number_field}{}{tail}", orbit_type.letter())
        }
    };
    debug_assert_eq!(columns.len(), 12);
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisional_mp(year: i32, half_month: char, order: char, cycle: u32) -> Designation {
        Designation::ProvisionalMinorPlanet(ProvisionalMp {
            year,
            half_month,
            order,
            cycle,
        })
    }

    fn comet_provisional(year: i32, half_month: char, order: u32, fragment: Option<char>) -> Designation {
        Designation::Comet(CometDesignation {
            orbit_type: None,
            number: None,
            provisional: Some(CometProvisional {
                year,
                half_month,
                order,
            }),
            fragment,
        })
    }

    #[test]
    fn minor_planet_numbers_pack_exactly() {
        assert_eq!(pack_minor_planet_number(1).unwrap(), "00001");
        assert_eq!(pack_minor_planet_number(3708).unwrap(), "03708");
        assert_eq!(pack_minor_planet_number(99999).unwrap(), "99999");
        assert_eq!(pack_minor_planet_number(100345).unwrap(), "A0345");
        assert_eq!(pack_minor_planet_number(360439).unwrap(), "a0439");
        assert_eq!(pack_minor_planet_number(619999).unwrap(), "z9999");
        assert_eq!(pack_minor_planet_number(620000).unwrap(), "~0000");
        assert_eq!(pack_minor_planet_number(620061).unwrap(), "~000z");
        assert_eq!(
            pack_minor_planet_number(MAX_MINOR_PLANET_NUMBER).unwrap(),
            "~zzzz"
        );
    }

    #[test]
    fn minor_planet_number_overflow_is_rejected() {
        assert!(matches!(
            pack_minor_planet_number(MAX_MINOR_PLANET_NUMBER + 1),
            Err(CoreError::UnrepresentableDesignation(_))
        ));
        assert!(pack_minor_planet_number(0).is_err());
    }

    #[test]
    fn spec_worked_examples() {
        assert_eq!(
            pack(&comet_provisional(1995, 'A', 1, None)).unwrap(),
            "J95A010"
        );
        assert_eq!(
            pack(&comet_provisional(1994, 'P', 1, Some('B'))).unwrap(),
            "J94P01b"
        );
        let decoded = unpack("J94P010").unwrap();
        assert_eq!(decoded, comet_provisional(1994, 'P', 1, None));
        assert_eq!(decoded.to_string(), "1994 P1");
    }

    #[test]
    fn provisional_minor_planet_examples() {
        assert_eq!(
            pack(&provisional_mp(1998, 'S', 'Q', 108)).unwrap(),
            "J98SA8Q"
        );
        assert_eq!(pack(&provisional_mp(1995, 'X', 'A', 0)).unwrap(), "J95X00A");
        assert_eq!(pack(&provisional_mp(2025, 'D', 'B', 50)).unwrap(), "K25D50B");
        assert_eq!(pack(&provisional_mp(1898, 'D', 'Q', 0)).unwrap(), "I98D00Q");
    }

    #[test]
    fn roundtrip_every_scheme() {
        let designations = vec![
            Designation::MinorPlanet(1),
            Designation::MinorPlanet(99_999),
            Designation::MinorPlanet(100_345),
            Designation::MinorPlanet(619_999),
            Designation::MinorPlanet(620_000),
            Designation::MinorPlanet(MAX_MINOR_PLANET_NUMBER),
            provisional_mp(1995, 'X', 'A', 0),
            provisional_mp(1998, 'S', 'Q', 108),
            provisional_mp(2025, 'D', 'Z', 619),
            comet_provisional(1995, 'A', 1, None),
            comet_provisional(1994, 'P', 1, Some('B')),
            comet_provisional(2019, 'Q', 4, None),
            Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Interstellar),
                number: Some(3),
                provisional: None,
                fragment: None,
            }),
            Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Periodic),
                number: Some(1),
                provisional: None,
                fragment: None,
            }),
            Designation::Satellite(SatelliteDesignation::Permanent {
                planet: Planet::Jupiter,
                number: 13,
            }),
            Designation::Satellite(SatelliteDesignation::Provisional {
                year: 2003,
                planet: Planet::Jupiter,
                order: 2,
            }),
        ];
        for d in designations {
            let packed = pack(&d).unwrap();
            assert_eq!(packed.len(), PACKED_WIDTH, "{d:?} -> {packed:?}");
            let decoded = unpack(&packed).unwrap();
            assert_eq!(decoded, d, "{packed:?}");
        }
    }

    #[test]
    fn known_packed_forms_decode() {
        assert_eq!(unpack("00001").unwrap(), Designation::MinorPlanet(1));
        assert_eq!(unpack("A0345").unwrap(), Designation::MinorPlanet(100_345));
        assert_eq!(unpack("~0000").unwrap(), Designation::MinorPlanet(620_000));
        assert_eq!(
            unpack("0003I  ").unwrap(),
            Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Interstellar),
                number: Some(3),
                provisional: None,
                fragment: None,
            })
        );
        assert_eq!(
            unpack("J013S").unwrap(),
            Designation::Satellite(SatelliteDesignation::Permanent {
                planet: Planet::Jupiter,
                number: 13,
            })
        );
        assert_eq!(
            unpack("SK03J02").unwrap(),
            Designation::Satellite(SatelliteDesignation::Provisional {
                year: 2003,
                planet: Planet::Jupiter,
                order: 2,
            })
        );
        assert_eq!(
            unpack("J98SA8Q").unwrap(),
            provisional_mp(1998, 'S', 'Q', 108)
        );
    }

    #[test]
    fn malformed_forms_are_rejected_not_guessed() {
        for bad in [
            "",
            "123",
            "123456",
            "J95A0100", // too long
            "00000",    // number 0
            "0000C",    // comet number 0
            "J95I010",  // half-month I
            "J95Z010",  // half-month Z
            "Z95A010",  // bad century letter
            "J9!A010",  // bad year digit
            "J95A00I",  // order letter I
            "J95A001",  // digit other than 0 in the fragment column
            "Q013S",    // bad planet letter
            "SK03Q02",  // bad planet letter, provisional satellite
            "~00!0",    // bad extended digit
            "0003Z",    // bad orbit-type letter
        ] {
            assert!(
                matches!(unpack(bad), Err(CoreError::MalformedPackedForm(_))),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn unrepresentable_values_fail_to_pack() {
        assert!(pack(&provisional_mp(2100, 'A', 'B', 0)).is_err());
        assert!(pack(&provisional_mp(2025, 'I', 'B', 0)).is_err());
        assert!(pack(&provisional_mp(2025, 'A', 'B', 620)).is_err());
        assert!(pack(&comet_provisional(2025, 'A', 0, None)).is_err());
        assert!(pack(&Designation::Satellite(SatelliteDesignation::Permanent {
            planet: Planet::Mars,
            number: 1000,
        }))
        .is_err());
        // A typed or numbered-with-provisional comet exceeds the 7-character
        // budget and needs the record layout.
        assert!(pack(&Designation::Comet(CometDesignation {
            orbit_type: Some(CometOrbitType::LongPeriod),
            number: None,
            provisional: Some(CometProvisional {
                year: 1995,
                half_month: 'O',
                order: 1,
            }),
            fragment: None,
        }))
        .is_err());
    }

    #[test]
    fn record_columns_layouts() {
        assert_eq!(
            pack_record_columns(&Designation::MinorPlanet(3708)).unwrap(),
            "03708       "
        );
        assert_eq!(
            pack_record_columns(&provisional_mp(1998, 'S', 'Q', 108)).unwrap(),
            "     J98SA8Q"
        );
        assert_eq!(
            pack_record_columns(&Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Interstellar),
                number: Some(3),
                provisional: None,
                fragment: None,
            }))
            .unwrap(),
            "0003I       "
        );
        assert_eq!(
            pack_record_columns(&Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::LongPeriod),
                number: None,
                provisional: Some(CometProvisional {
                    year: 1995,
                    half_month: 'O',
                    order: 1,
                }),
                fragment: None,
            }))
            .unwrap(),
            "    CJ95O010"
        );
        assert_eq!(
            pack_record_columns(&Designation::Comet(CometDesignation {
                orbit_type: Some(CometOrbitType::Periodic),
                number: Some(73),
                provisional: None,
                fragment: Some('B'),
            }))
            .unwrap(),
            "0073P      b"
        );
        assert_eq!(
            pack_record_columns(&Designation::Satellite(SatelliteDesignation::Permanent {
                planet: Planet::Jupiter,
                number: 13,
            }))
            .unwrap(),
            "J013S       "
        );
        // Every layout is exactly 12 columns.
        for d in [
            Designation::MinorPlanet(620_000),
            provisional_mp(1995, 'X', 'A', 0),
            Designation::Satellite(SatelliteDesignation::Provisional {
                year: 2003,
                planet: Planet::Jupiter,
                order: 2,
            }),
        ] {
            assert_eq!(pack_record_columns(&d).unwrap().len(), 12);
        }
    }

    #[test]
    fn comet_record_without_orbit_type_is_rejected() {
        let d = comet_provisional(1995, 'A', 1, None);
        assert!(matches!(
            pack_record_columns(&d),
            Err(CoreError::UnrepresentableDesignation(_))
        ));
    }
}
