//! Spoken names for punctuation and blank characters.

/// Lowest echo level at which an embedded mark is spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoLevel {
    Some,
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct Mark {
    pub symbol: char,
    pub name: &'static str,
    pub plural: &'static str,
    pub level: EchoLevel,
    /// High-frequency marks that stay silent inside text unless every mark
    /// is echoed. Silenced marks are never summarized at the lower levels.
    pub silenced: bool,
}

const fn mark(symbol: char, name: &'static str, plural: &'static str, level: EchoLevel) -> Mark {
    Mark {
        symbol,
        name,
        plural,
        level,
        silenced: false,
    }
}

const fn silenced(symbol: char, name: &'static str, plural: &'static str) -> Mark {
    Mark {
        symbol,
        name,
        plural,
        level: EchoLevel::All,
        silenced: true,
    }
}

const MARKS: &[Mark] = &[
    mark('$', "dollar", "dollars", EchoLevel::Some),
    mark('#', "pound", "pound signs", EchoLevel::Some),
    mark('"', "quote", "quotes", EchoLevel::Some),
    mark('*', "star", "stars", EchoLevel::Some),
    mark('<', "less than", "less than signs", EchoLevel::Some),
    mark('>', "greater than", "greater than signs", EchoLevel::Some),
    mark('\\', "backslash", "backslashes", EchoLevel::Some),
    mark('/', "slash", "slashes", EchoLevel::Some),
    mark('{', "left brace", "left braces", EchoLevel::Some),
    mark('}', "right brace", "right braces", EchoLevel::Some),
    mark('+', "plus", "plus signs", EchoLevel::Some),
    mark('=', "equal", "equal signs", EchoLevel::Some),
    mark('~', "tilde", "tildes", EchoLevel::Some),
    mark('`', "backtick", "backticks", EchoLevel::Some),
    mark('%', "percent", "percent signs", EchoLevel::Some),
    mark('\u{2022}', "bullet", "bullets", EchoLevel::Some),
    mark('\u{25e6}', "white bullet", "white bullets", EchoLevel::Some),
    mark('\u{25a0}', "square bullet", "square bullets", EchoLevel::Some),
    mark('&', "and", "ampersands", EchoLevel::All),
    mark('@', "at", "at signs", EchoLevel::All),
    mark('(', "open paren", "open parens", EchoLevel::All),
    mark(')', "close paren", "close parens", EchoLevel::All),
    mark('[', "left bracket", "left brackets", EchoLevel::All),
    mark(']', "right bracket", "right brackets", EchoLevel::All),
    mark('_', "underscore", "underscores", EchoLevel::All),
    mark('|', "vertical bar", "vertical bars", EchoLevel::All),
    mark('^', "caret", "carets", EchoLevel::All),
    silenced('.', "dot", "dots"),
    silenced(',', "comma", "commas"),
    silenced('-', "dash", "dashes"),
    silenced(';', "semicolon", "semicolons"),
    silenced(':', "colon", "colons"),
    silenced('!', "exclamation", "exclamations"),
    silenced('?', "question mark", "question marks"),
    silenced('\'', "apostrophe", "apostrophes"),
];

pub fn lookup(symbol: char) -> Option<&'static Mark> {
    MARKS.iter().find(|m| m.symbol == symbol)
}

/// Name for a character spoken on its own, if it has one.
pub fn sole_name(c: char) -> Option<&'static str> {
    match c {
        '\n' => Some("new line"),
        '\r' => Some("return"),
        '\t' => Some("tab"),
        c if c.is_whitespace() => Some("space"),
        c => lookup(c).map(|m| m.name),
    }
}
