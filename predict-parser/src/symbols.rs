use std::collections::HashMap;

use predict_lexer::Position;

use crate::{AlreadyDeclared, SymbolTable};

/// A declared identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Declaration order, starting at 1.
    pub serial: usize,
    pub name: String,
    /// Type keyword the identifier was declared under.
    pub ty: Option<String>,
    pub pos: Position,
}

/// Flat, single-scope [`SymbolTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    entries: HashMap<String, Entry>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.serial);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl SymbolTable for Symbols {
    fn insert(
        &mut self,
        name: &str,
        ty: Option<&str>,
        pos: Position,
    ) -> Result<(), AlreadyDeclared> {
        if let Some(existing) = self.entries.get(name) {
            return Err(AlreadyDeclared {
                name: name.to_string(),
                previous: existing.pos,
            });
        }

        let serial = self.entries.len() + 1;
        self.entries.insert(
            name.to_string(),
            Entry {
                serial,
                name: name.to_string(),
                ty: ty.map(str::to_string),
                pos,
            },
        );

        tracing::trace!(name, serial, %pos, "symbol declared");
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }
}
