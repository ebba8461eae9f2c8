// Constants for the Metro front end

/// Reserved words. Identifiers spelled like one of these lex as keywords.
pub const KEYWORDS: &[&str] = &[
    "fn", "struct", "let", "if", "else", "while", "loop", "return", "break", "continue", "true",
    "false", "const", "int", "float", "bool", "char", "string", "none",
];

/// Keywords that name a builtin type and may start a type name
pub const TYPE_KEYWORDS: &[&str] = &["int", "float", "bool", "char", "string", "none"];

/// Punctuators, longest first.
/// The lexer tries them in order, so `<<=` must come before `<<` and `<`.
pub const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=",
    "->", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=",
    "+", "-", "*", "/", "%", "&", "|", "^", "~", "!", "=", "<", ">", "(", ")", "[", "]", "{", "}",
    ",", ";", ":", ".",
];

/// Characters allowed after a backslash in string and char literals
pub const ESCAPES: &[u8] = b"ntr0\\'\"";

/// Maximum recursion depth the parser allows before giving up.
/// Each level costs a full trip through the precedence cascade, up to ~50 KiB
/// of stack in unoptimized builds, so the default fits a 2 MiB thread.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 24;
