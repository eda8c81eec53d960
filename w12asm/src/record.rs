use std::fmt::Display;

/// An entry symbol and its final address, one line of the entries file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub address: usize,
}

/// A word that refers to an external symbol, one line of the externals file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUse {
    pub name: String,
    pub address: usize,
}

impl Display for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.name, self.address)
    }
}

impl Display for ExternalUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.name, self.address)
    }
}

/// One record per line, or nothing at all when there are no records.
pub fn render<T: Display>(records: &[T]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| format!("{}\n", r)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines() {
        let uses = vec![
            ExternalUse {
                name: "W".into(),
                address: 105,
            },
            ExternalUse {
                name: "W".into(),
                address: 119,
            },
        ];
        assert_eq!(render(&uses).as_deref(), Some("W\t105\nW\t119\n"));
        assert_eq!(render::<Export>(&[]), None);
    }
}
