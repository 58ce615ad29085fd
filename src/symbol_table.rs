use crate::syntax::Name;
use derive_more::Display;
use internment::Intern;
use std::collections::HashMap;

/// A type that is available out of the box, like `INTEGER` or `REAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{name}")]
pub struct BuiltinTypeSymbol {
    pub name: Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{name}:{type_}")]
pub struct VarSymbol {
    pub name: Name,
    pub type_: BuiltinTypeSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Symbol {
    Builtin(BuiltinTypeSymbol),
    Var(VarSymbol),
}

impl Symbol {
    pub fn name(&self) -> Name {
        match self {
            Symbol::Builtin(b) => b.name,
            Symbol::Var(v) => v.name,
        }
    }

    /// The type of the symbol; built-in types have no further type.
    pub fn type_(&self) -> Option<BuiltinTypeSymbol> {
        match self {
            Symbol::Builtin(_) => None,
            Symbol::Var(v) => Some(v.type_),
        }
    }

    pub fn as_builtin_type(&self) -> Option<BuiltinTypeSymbol> {
        match self {
            Symbol::Builtin(b) => Some(*b),
            Symbol::Var(_) => None,
        }
    }

    pub fn as_var(&self) -> Option<VarSymbol> {
        match self {
            Symbol::Var(v) => Some(*v),
            Symbol::Builtin(_) => None,
        }
    }
}

pub const BUILTIN_TYPES: [&str; 2] = ["INTEGER", "REAL"];

/// Maps declared names to symbols.
///
/// The built-in types are seeded by `new` and live apart from user
/// definitions, so `define` can never replace them.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    builtins: HashMap<Name, Symbol>,
    symbols: HashMap<Name, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let builtins = BUILTIN_TYPES
            .iter()
            .map(|name| {
                let name = Intern::new(name.to_string());
                (name, Symbol::Builtin(BuiltinTypeSymbol { name }))
            })
            .collect();

        Self {
            builtins,
            symbols: HashMap::new(),
        }
    }

    /// Inserts `symbol`, replacing any earlier definition of the same name.
    /// Returns the replaced symbol, if there was one.
    pub fn define(&mut self, symbol: VarSymbol) -> Option<Symbol> {
        self.symbols.insert(symbol.name, Symbol::Var(symbol))
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        let name = Intern::new(name.to_string());
        self.lookup_name(name)
    }

    pub fn lookup_name(&self, name: Name) -> Option<Symbol> {
        self.builtins
            .get(&name)
            .or_else(|| self.symbols.get(&name))
            .copied()
    }

    /// User-defined symbols, ordered by name.
    pub fn variables(&self) -> Vec<VarSymbol> {
        let mut vars: Vec<VarSymbol> = self.symbols.values().filter_map(Symbol::as_var).collect();
        vars.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        vars
    }

    pub fn len(&self) -> usize {
        self.builtins.len() + self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut entries: Vec<String> = BUILTIN_TYPES.iter().map(|s| s.to_string()).collect();
        entries.extend(self.variables().iter().map(|v| v.to_string()));
        write!(f, "Symbols: [{}]", entries.join(", "))
    }
}
