use crate::{constants::line_regex, error::AsmError};

/// One expanded source line split into its label, keyword and operand text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTokens {
    pub label: Option<String>,
    pub keyword: Option<String>,
    pub rest: String,
}

impl LineTokens {
    pub fn parse(line: &str) -> Self {
        line_regex()
            .captures(line)
            .map(|cap| LineTokens {
                label: cap.name("label").map(|m| m.as_str().to_owned()),
                keyword: cap.name("keyword").map(|m| m.as_str().to_owned()),
                rest: cap
                    .name("rest")
                    .map(|m| m.as_str().trim().to_owned())
                    .unwrap_or_default(),
            })
            .unwrap_or_default()
    }

    pub fn operands(&self) -> Vec<String> {
        operands(&self.rest)
    }
}

pub fn operands(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Two operands are separated by exactly one comma, fewer take none.
pub fn check_commas(text: &str, operand_count: usize) -> bool {
    let compact = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();

    if compact.starts_with(',') || compact.ends_with(',') || compact.contains(",,") {
        return false;
    }

    let commas = compact.matches(',').count();
    if operand_count == 2 {
        commas == 1
    } else {
        commas == 0
    }
}

/// The characters between the quotes of a `.string` operand.
pub fn string_literal(text: &str) -> Result<String, AsmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AsmError::InvalidString);
    }

    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or(AsmError::InvalidQuotes)?;

    if inner.contains('"') {
        return Err(AsmError::InvalidQuotes);
    }

    Ok(inner.to_owned())
}
