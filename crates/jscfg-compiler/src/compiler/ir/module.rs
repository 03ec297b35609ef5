//! IR Module
//!
//! Top-level container for a compilation unit: the functions plus the shared
//! tables (strings, regular expressions, object literal shapes) they refer to.

use super::function::Function;
use crate::interner::{Interner, Symbol};
use rustc_hash::FxHashMap;

/// Function identifier (index into `Module::functions`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Regular expression identifier (index into `Module::regexps`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegExpId(pub u32);

/// JS class identifier (index into `Module::js_classes`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// An uncompiled regular expression literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExpLiteral {
    pub pattern: Symbol,
    pub flags: Symbol,
}

/// One property slot of an object literal shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsClassMember {
    pub name: Symbol,
    pub is_accessor: bool,
}

/// Property layout shared by object literals with the same keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsClass {
    pub members: Vec<JsClassMember>,
}

/// An IR module (compilation unit)
#[derive(Debug, Clone)]
pub struct Module {
    /// Source file name or URL
    pub file_name: String,
    /// Functions in creation order
    pub functions: Vec<Function>,
    /// Outermost function produced by the last lowering run
    pub root: Option<FunctionId>,
    /// Interned identifiers, property names and string literals
    pub strings: Interner,
    pub regexps: Vec<RegExpLiteral>,
    pub js_classes: Vec<JsClass>,
    class_map: FxHashMap<JsClass, ClassId>,
}

impl Module {
    /// Create a new empty module
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            functions: Vec::new(),
            root: None,
            strings: Interner::new(),
            regexps: Vec::new(),
            js_classes: Vec::new(),
            class_map: FxHashMap::default(),
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.strings.intern(s)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings.resolve(sym)
    }

    /// Reserve a function slot; the returned id is the function's index
    pub fn new_function(&mut self, name: Symbol, outer: Option<FunctionId>) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Function::new(id, name, outer));
        id
    }

    /// Store a finished function into its reserved slot
    pub fn install(&mut self, function: Function) {
        let id = function.id;
        if let Some(slot) = self.functions.get_mut(id.0 as usize) {
            *slot = function;
        }
    }

    pub fn add_regexp(&mut self, pattern: &str, flags: &str) -> RegExpId {
        let literal = RegExpLiteral {
            pattern: self.intern(pattern),
            flags: self.intern(flags),
        };
        let id = RegExpId(self.regexps.len() as u32);
        self.regexps.push(literal);
        id
    }

    pub fn regexp(&self, id: RegExpId) -> Option<&RegExpLiteral> {
        self.regexps.get(id.0 as usize)
    }

    /// Register an object literal shape, reusing an identical one
    pub fn register_js_class(&mut self, members: Vec<JsClassMember>) -> ClassId {
        let class = JsClass { members };
        if let Some(&id) = self.class_map.get(&class) {
            return id;
        }
        let id = ClassId(self.js_classes.len() as u32);
        self.js_classes.push(class.clone());
        self.class_map.insert(class, id);
        id
    }

    /// Get a function by ID
    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.0 as usize)
    }

    /// Get a function by ID mutably
    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut Function> {
        self.functions.get_mut(id.0 as usize)
    }

    /// First function with the given name
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        let sym = self.strings.get(name)?;
        self.functions.iter().find(|f| f.name == sym)
    }

    pub fn root_function(&self) -> Option<&Function> {
        self.root.and_then(|id| self.function(id))
    }

    /// Get the number of functions
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Validate the entire module
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for func in &self.functions {
            if let Err(e) = func.validate() {
                errors.push(format!(
                    "Function '{}' ({}): {}",
                    self.resolve(func.name),
                    func.id,
                    e
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Total statement count across all functions
    pub fn total_statement_count(&self) -> usize {
        self.functions.iter().map(Function::statement_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_new() {
        let module = Module::new("test.js");
        assert_eq!(module.file_name, "test.js");
        assert_eq!(module.function_count(), 0);
        assert!(module.root_function().is_none());
    }

    #[test]
    fn test_new_function_and_install() {
        let mut module = Module::new("test.js");
        let name = module.intern("main");
        let id = module.new_function(name, None);
        assert_eq!(id, FunctionId(0));

        let mut func = Function::new(id, name, None);
        func.is_strict = true;
        module.install(func);

        let stored = module.function_by_name("main").unwrap();
        assert!(stored.is_strict);
        assert!(module.function_by_name("other").is_none());
    }

    #[test]
    fn test_js_class_dedup() {
        let mut module = Module::new("test.js");
        let a = module.intern("a");
        let b = module.intern("b");
        let shape = |is_accessor| {
            vec![
                JsClassMember {
                    name: a,
                    is_accessor: false,
                },
                JsClassMember {
                    name: b,
                    is_accessor,
                },
            ]
        };

        let first = module.register_js_class(shape(false));
        let second = module.register_js_class(shape(false));
        let third = module.register_js_class(shape(true));

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(module.js_classes.len(), 2);
    }

    #[test]
    fn test_regexp_table() {
        let mut module = Module::new("test.js");
        let id = module.add_regexp("a+b", "gi");
        let literal = module.regexp(id).unwrap();
        assert_eq!(module.resolve(literal.pattern), "a+b");
        assert_eq!(module.resolve(literal.flags), "gi");
    }
}
