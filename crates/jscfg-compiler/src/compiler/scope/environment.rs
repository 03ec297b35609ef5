//! Environment model
//!
//! One `Environment` per program or function-like node, holding the names it
//! declares and the scope-wide facts lowering needs. Environments live in an
//! arena (`EnvironmentTree`) and refer to their parent by index.

use crate::ast::{self, NodeKey};
use crate::compiler::options::CompilationMode;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Index of an environment inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(pub u32);

/// How a name was declared. Later declarations only ever raise the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemberKind {
    Undefined,
    /// `var x;`
    VariableDeclaration,
    /// `var x = e;`
    VariableDefinition,
    /// `function x() {}`
    FunctionDefinition,
}

/// A declared name
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
    pub kind: MemberKind,
    /// Slot index, assigned only in slotted compilation modes
    pub index: Option<u32>,
    /// Function bound to the name, for function definitions
    pub function: Option<&'a ast::Function>,
}

/// Whether a function body needs an `arguments` object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentsUsage {
    Unknown,
    NotUsed,
    Used,
}

#[derive(Debug, Clone)]
pub struct Environment<'a> {
    pub parent: Option<EnvId>,
    /// Function-like node the environment belongs to (None for a synthetic root)
    pub node: Option<NodeKey>,
    pub mode: CompilationMode,
    /// Declared names, ordered by name
    pub members: BTreeMap<String, Member<'a>>,
    /// Formal parameter names in declaration order
    pub formals: Vec<String>,
    pub max_number_of_arguments: u32,
    pub has_direct_eval: bool,
    pub has_nested_functions: bool,
    pub is_strict: bool,
    pub is_named_function_expression: bool,
    pub uses_this: bool,
    pub uses_arguments_object: ArgumentsUsage,
}

impl<'a> Environment<'a> {
    pub fn new(parent: Option<EnvId>, node: Option<NodeKey>, mode: CompilationMode) -> Self {
        Self {
            parent,
            node,
            mode,
            members: BTreeMap::new(),
            formals: Vec::new(),
            max_number_of_arguments: 0,
            has_direct_eval: false,
            has_nested_functions: false,
            is_strict: false,
            is_named_function_expression: false,
            uses_this: false,
            uses_arguments_object: ArgumentsUsage::Unknown,
        }
    }

    /// Declare a name.
    ///
    /// Names shadowed by a formal are ignored unless they are function
    /// definitions. Re-declaring keeps the higher kind; an equal or higher
    /// kind replaces the bound function.
    pub fn enter(&mut self, name: &str, kind: MemberKind, function: Option<&'a ast::Function>) {
        if name.is_empty() {
            return;
        }
        if kind != MemberKind::FunctionDefinition && self.formals.iter().any(|f| f == name) {
            return;
        }
        match self.members.get_mut(name) {
            Some(member) => {
                if member.kind <= kind {
                    member.kind = kind;
                    member.function = function;
                }
            }
            None => {
                self.members.insert(
                    name.to_string(),
                    Member {
                        kind,
                        index: None,
                        function,
                    },
                );
            }
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member<'a>> {
        self.members.get(name)
    }

    /// Slot of a declared name
    pub fn find_member(&self, name: &str) -> Option<u32> {
        self.members.get(name).and_then(|m| m.index)
    }

    /// Index of a formal parameter; the last one wins for duplicate names
    pub fn find_argument(&self, name: &str) -> Option<u32> {
        self.formals
            .iter()
            .rposition(|f| f == name)
            .map(|i| i as u32)
    }

    pub fn member_count(&self) -> u32 {
        self.members.len() as u32
    }

    /// Whether names in this environment get frame slots
    pub fn is_slotted(&self) -> bool {
        matches!(
            self.mode,
            CompilationMode::Function | CompilationMode::BindingExpression
        )
    }

    /// Whether the function needs an `arguments` object at entry
    pub fn needs_arguments_object(&self) -> bool {
        self.parent.is_some() && self.uses_arguments_object == ArgumentsUsage::Used
    }

    /// Assign slot indices in name order
    pub(crate) fn assign_slots(&mut self) {
        for (index, member) in self.members.values_mut().enumerate() {
            member.index = Some(index as u32);
        }
    }
}

/// All environments of one compilation, with the node side map
#[derive(Debug, Default)]
pub struct EnvironmentTree<'a> {
    envs: Vec<Environment<'a>>,
    by_node: FxHashMap<NodeKey, EnvId>,
}

impl<'a> EnvironmentTree<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, env: Environment<'a>) -> EnvId {
        let id = EnvId(self.envs.len() as u32);
        if let Some(node) = env.node {
            self.by_node.insert(node, id);
        }
        self.envs.push(env);
        id
    }

    pub fn get(&self, id: EnvId) -> Option<&Environment<'a>> {
        self.envs.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: EnvId) -> Option<&mut Environment<'a>> {
        self.envs.get_mut(id.0 as usize)
    }

    /// Environment created for an AST node
    pub fn lookup<T>(&self, node: &T) -> Option<EnvId> {
        self.by_node.get(&NodeKey::of(node)).copied()
    }

    pub fn parent(&self, id: EnvId) -> Option<EnvId> {
        self.get(id).and_then(|env| env.parent)
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnvId, &Environment<'a>)> {
        self.envs
            .iter()
            .enumerate()
            .map(|(i, env)| (EnvId(i as u32), env))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Environment<'a>> {
        self.envs.iter_mut()
    }
}
