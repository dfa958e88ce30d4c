//! RFC 3986 percent-encoding for expansion values.

use crate::operator::CharClass;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::str::Utf8Error;

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const EXTENDED: &AsciiSet = &UNRESERVED
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Percent-encodes every character of `s` outside `allowed`, as uppercase
/// `%XX` over its UTF-8 bytes. `%` is outside both classes.
pub fn encode(s: &str, allowed: CharClass) -> String {
    let set = match allowed {
        CharClass::Unreserved => UNRESERVED,
        CharClass::Extended => EXTENDED,
    };
    utf8_percent_encode(s, set).to_string()
}

pub fn decode(s: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(s).decode_utf8()
}
