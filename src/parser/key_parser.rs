use crate::transpose::pitch_class::{Key, PitchClass};
use crate::TransposeError;
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, map, map_opt, opt};
use nom::{IResult, Parser};
use std::str::FromStr;

/// Natural note letter to pitch class value
const fn natural_value(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse the root letter `A-G`
fn parse_natural(i: &str) -> IResult<&str, i32> {
    map_opt(one_of("CDEFGAB"), natural_value).parse(i)
}

/// Parse an optional `#` (+1) or `b` (-1)
fn parse_accidental(i: &str) -> IResult<&str, i32> {
    map(opt(one_of("#b")), |accidental| match accidental {
        Some('#') => 1,
        Some(_) => -1,
        None => 0,
    })
    .parse(i)
}

/// Parse the optional minor marker
fn parse_minor(i: &str) -> IResult<&str, bool> {
    map(opt(char('m')), |m| m.is_some()).parse(i)
}

/// Parse a key token such as `C`, `G#`, `Eb` or `Am`.
///
/// The accidental is applied before the modulo reduction, `Cb` is `B`.
pub fn parse_key_token(i: &str) -> IResult<&str, Key> {
    let (i, (natural, accidental, is_minor)) =
        (parse_natural, parse_accidental, parse_minor).parse(i)?;
    let key = Key::new(PitchClass::new(natural + accidental), is_minor);
    Ok((i, key))
}

/// Resolve a complete key token, rejecting anything left unparsed.
pub fn resolve_key(token: &str) -> Result<Key, TransposeError> {
    all_consuming(parse_key_token)
        .parse(token)
        .map(|(_, key)| key)
        .map_err(|err| {
            log::debug!("Could not parse key token {token:?}: {err}");
            TransposeError::InvalidKey(token.to_string())
        })
}

impl FromStr for Key {
    type Err = TransposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_key(s)
    }
}
