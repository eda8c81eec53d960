use indexmap::IndexMap;

/// Parameterless macros: a name and the lines it expands to.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: IndexMap<String, Vec<String>>,
    open: Option<String>,
    discarding: bool,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts recording a body. A closed body never changes, so reopening a
    /// defined name returns `false` and the new block's lines are dropped.
    pub fn open(&mut self, name: &str) -> bool {
        self.open = Some(name.to_owned());
        self.discarding = self.macros.contains_key(name);
        if !self.discarding {
            self.macros.insert(name.to_owned(), Vec::new());
        }
        !self.discarding
    }

    pub fn append(&mut self, line: String) {
        if self.discarding {
            return;
        }
        if let Some(body) = self
            .open
            .as_ref()
            .and_then(|name| self.macros.get_mut(name))
        {
            body.push(line);
        }
    }

    /// Ends the body being recorded, returning its name.
    pub fn close(&mut self) -> Option<String> {
        self.discarding = false;
        self.open.take()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_name(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Bodies are only visible once closed.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        if !self.discarding && self.open.as_deref() == Some(name) {
            return None;
        }
        self.macros.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_lookup() {
        let mut table = MacroTable::new();
        table.open("m1");
        assert!(table.is_open());
        table.append("inc @r1".into());
        assert!(table.get("m1").is_none());
        table.append("dec @r2".into());
        assert_eq!(table.close(), Some("m1".into()));
        assert!(!table.is_open());

        assert_eq!(
            table.get("m1"),
            Some(&["inc @r1".to_owned(), "dec @r2".to_owned()][..])
        );
        assert!(table.get("m2").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn first_definition_is_kept() {
        let mut table = MacroTable::new();
        assert!(table.open("m"));
        table.append("inc @r1".into());
        table.close();

        assert!(!table.open("m"));
        table.append("dec @r1".into());
        assert_eq!(table.get("m"), Some(&["inc @r1".to_owned()][..]));
        table.close();

        assert_eq!(table.get("m"), Some(&["inc @r1".to_owned()][..]));
        assert_eq!(table.len(), 1);
        assert!(table.open("n"));
    }

    #[test]
    fn appending_without_open_macro_is_ignored() {
        let mut table = MacroTable::new();
        table.append("stop".into());
        assert!(table.is_empty());
        assert_eq!(table.close(), None);
    }
}
