//! The eight RFC 6570 expression operators and their expansion rules.

/// Characters left unescaped when percent-encoding a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `A-Za-z0-9-._~`
    Unreserved,
    /// Unreserved plus the RFC 3986 gen-delims and sub-delims.
    Extended,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::Unreserved => is_unreserved(c),
            CharClass::Extended => is_unreserved(c) || is_reserved(c),
        }
    }

    /// Regex bracket-expression body matching one allowed character.
    pub(crate) fn regex_set(self) -> &'static str {
        match self {
            CharClass::Unreserved => r"A-Za-z0-9\-._~",
            CharClass::Extended => r"A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=",
        }
    }
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

fn is_reserved(c: char) -> bool {
    matches!(
        c,
        ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+'
            | ',' | ';' | '='
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    Path,
    Parameter,
    Query,
    QueryContinuation,
}

impl Operator {
    /// Dispatch order.
    pub const ALL: [Operator; 8] = [
        Operator::Simple,
        Operator::Reserved,
        Operator::Fragment,
        Operator::Label,
        Operator::Path,
        Operator::Parameter,
        Operator::Query,
        Operator::QueryContinuation,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Reserved),
            '#' => Some(Operator::Fragment),
            '.' => Some(Operator::Label),
            '/' => Some(Operator::Path),
            ';' => Some(Operator::Parameter),
            '?' => Some(Operator::Query),
            '&' => Some(Operator::QueryContinuation),
            _ => None,
        }
    }

    /// The operator character written inside the braces.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Simple => "",
            Operator::Reserved => "+",
            Operator::Fragment => "#",
            Operator::Label => ".",
            Operator::Path => "/",
            Operator::Parameter => ";",
            Operator::Query => "?",
            Operator::QueryContinuation => "&",
        }
    }

    /// The string prepended to a non-empty expansion.
    pub fn lead(self) -> &'static str {
        match self {
            Operator::Simple | Operator::Reserved => "",
            other => other.symbol(),
        }
    }

    /// Joins exploded members and the names of a multi-name expression.
    pub fn separator(self) -> char {
        match self {
            Operator::Simple | Operator::Reserved | Operator::Fragment => ',',
            Operator::Label => '.',
            Operator::Path => '/',
            Operator::Parameter => ';',
            Operator::Query | Operator::QueryContinuation => '&',
        }
    }

    pub fn emits_key_value(self) -> bool {
        matches!(
            self,
            Operator::Parameter | Operator::Query | Operator::QueryContinuation
        )
    }

    pub fn omits_equals_when_empty(self) -> bool {
        self == Operator::Parameter
    }

    pub fn allowed_characters(self) -> CharClass {
        match self {
            Operator::Reserved | Operator::Fragment => CharClass::Extended,
            _ => CharClass::Unreserved,
        }
    }

    pub fn regex_prefix(self) -> String {
        regex::escape(self.lead())
    }

    pub fn continuation(self) -> Operator {
        match self {
            Operator::Query => Operator::QueryContinuation,
            other => other,
        }
    }
}
