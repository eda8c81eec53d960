use std::str::FromStr;

use libw12::op::{Opcode, Register};
use once_cell::sync::OnceCell;
use regex::Regex;

pub const MEMORY_OFFSET: usize = 100;
pub const MEMORY_SIZE: usize = 924;
pub const MAX_LABEL_LENGTH: usize = 31;

pub const MIN_NUM_OPERAND: i32 = -512;
pub const MAX_NUM_OPERAND: i32 = 511;
pub const MIN_DATA_OPERAND: i32 = -2048;
pub const MAX_DATA_OPERAND: i32 = 2047;

pub const MACRO_OPEN: &str = "mcro";
pub const MACRO_CLOSE: &str = "endmcro";
pub const COMMENT: char = ';';

pub static KEYWORDS: [&str; 28] = [
    "@r0", "@r1", "@r2", "@r3", "@r4", "@r5", "@r6", "@r7", "mov", "cmp", "add", "sub", "not",
    "clr", "lea", "inc", "dec", "jmp", "bne", "red", "prn", "jsr", "rts", "stop", ".entry",
    ".data", ".string", ".extern",
];

pub static LINE_REGEX: OnceCell<Regex> = OnceCell::new();
pub static INTEGER_REGEX: OnceCell<Regex> = OnceCell::new();
static LINE_REGEX_PATTERN: &str =
    r#"^[\s,]*(?:(?P<label>[^\s,]*):(?:[\s,]+|$))?(?P<keyword>[^\s,]+)?(?P<rest>.*)$"#;
static INTEGER_REGEX_PATTERN: &str = r#"^[+-]?[0-9]+$"#;

pub fn line_regex() -> &'static Regex {
    LINE_REGEX.get_or_init(|| Regex::new(LINE_REGEX_PATTERN).expect("Invalid line regex"))
}

pub fn integer_regex() -> &'static Regex {
    INTEGER_REGEX.get_or_init(|| Regex::new(INTEGER_REGEX_PATTERN).expect("Invalid integer regex"))
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn register(token: &str) -> Option<Register> {
    Register::from_str(token).ok()
}

pub fn opcode(token: &str) -> Option<Opcode> {
    Opcode::from_str(token).ok()
}

/// `[+-]digits` that fits an i32.
pub fn integer(token: &str) -> Option<i32> {
    if integer_regex().is_match(token) {
        token.parse().ok()
    } else {
        None
    }
}
