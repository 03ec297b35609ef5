//! IR Functions
//!
//! A function owns its basic blocks, its temporary counter and the facts the
//! backend needs to build an activation frame (formals, locals, flags).

use super::block::{BasicBlock, BasicBlockId};
use super::expr::TempId;
use super::module::FunctionId;
use super::stmt::Stmt;
use crate::interner::Symbol;
use rustc_hash::{FxHashMap, FxHashSet};

/// An IR function
#[derive(Debug, Clone)]
pub struct Function {
    /// Index of this function inside its module
    pub id: FunctionId,
    /// Function name (`%entry` for programs, empty for anonymous functions)
    pub name: Symbol,
    /// Lexically enclosing function
    pub outer: Option<FunctionId>,
    /// Formal parameter names in declaration order
    pub formals: Vec<Symbol>,
    /// Slotted local names in slot order
    pub locals: Vec<Symbol>,
    /// Closure functions defined directly inside this one
    pub nested: Vec<FunctionId>,

    pub is_strict: bool,
    pub uses_this: bool,
    pub uses_arguments_object: bool,
    pub has_direct_eval: bool,
    pub has_try: bool,
    pub has_with: bool,
    pub is_named_expression: bool,
    pub is_binding: bool,

    /// Largest argument list seen in the function body
    pub max_number_of_arguments: u32,
    pub line: u32,
    pub column: u32,

    /// Entry block ID
    pub entry: BasicBlockId,
    /// Exit block ID; every return path ends here
    pub exit: BasicBlockId,

    /// Every block created for this function, inserted or not
    blocks: Vec<BasicBlock>,
    /// Block lookup map for fast access
    block_map: FxHashMap<BasicBlockId, usize>,
    /// Order in which inserted blocks appear in the function
    layout: Vec<BasicBlockId>,
    next_block: u32,
    next_temp: u32,
}

impl Function {
    /// Create a new function with no blocks
    pub fn new(id: FunctionId, name: Symbol, outer: Option<FunctionId>) -> Self {
        Self {
            id,
            name,
            outer,
            formals: Vec::new(),
            locals: Vec::new(),
            nested: Vec::new(),
            is_strict: false,
            uses_this: false,
            uses_arguments_object: false,
            has_direct_eval: false,
            has_try: false,
            has_with: false,
            is_named_expression: false,
            is_binding: false,
            max_number_of_arguments: 0,
            line: 0,
            column: 0,
            entry: BasicBlockId(0),
            exit: BasicBlockId(0),
            blocks: Vec::new(),
            block_map: FxHashMap::default(),
            layout: Vec::new(),
            next_block: 0,
            next_temp: 0,
        }
    }

    /// Create a block.
    ///
    /// Detached blocks (`insert == false`) exist but are not part of the
    /// function layout until `insert_block` is called for them.
    pub fn new_block(&mut self, handler: Option<BasicBlockId>, insert: bool) -> BasicBlockId {
        let id = BasicBlockId(self.next_block);
        self.next_block += 1;
        self.block_map.insert(id, self.blocks.len());
        self.blocks.push(BasicBlock::new(id, handler));
        if insert {
            self.layout.push(id);
        }
        id
    }

    /// Append a detached block to the layout
    pub fn insert_block(&mut self, id: BasicBlockId) {
        if self.block_map.contains_key(&id) && !self.layout.contains(&id) {
            self.layout.push(id);
        }
    }

    pub fn is_inserted(&self, id: BasicBlockId) -> bool {
        self.layout.contains(&id)
    }

    /// Allocate a fresh temporary
    pub fn new_temp(&mut self) -> TempId {
        let temp = TempId(self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Number of temporaries allocated so far
    pub fn temp_count(&self) -> u32 {
        self.next_temp
    }

    /// Get a block by ID
    pub fn block(&self, id: BasicBlockId) -> Option<&BasicBlock> {
        self.block_map.get(&id).and_then(|&idx| self.blocks.get(idx))
    }

    /// Get a mutable block by ID
    pub fn block_mut(&mut self, id: BasicBlockId) -> Option<&mut BasicBlock> {
        match self.block_map.get(&id) {
            Some(&idx) => self.blocks.get_mut(idx),
            None => None,
        }
    }

    /// Append a statement to a block; returns false when the block is
    /// missing or already terminated
    pub fn append(&mut self, id: BasicBlockId, stmt: Stmt) -> bool {
        self.block_mut(id).is_some_and(|block| block.append(stmt))
    }

    pub fn is_terminated(&self, id: BasicBlockId) -> bool {
        self.block(id).is_some_and(BasicBlock::is_terminated)
    }

    /// Inserted blocks in layout order
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.layout.iter().filter_map(|id| self.block(*id))
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BasicBlockId> + '_ {
        self.layout.iter().copied()
    }

    pub fn block_count(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Total statements across all inserted blocks
    pub fn statement_count(&self) -> usize {
        self.blocks().map(BasicBlock::len).sum()
    }

    /// Drop blocks that cannot be reached from the entry.
    ///
    /// Jumps and exception handler edges both count as reachability. The exit
    /// block is always kept.
    pub fn prune_unreachable(&mut self) {
        let mut reachable = FxHashSet::default();
        let mut worklist = vec![self.entry];
        while let Some(id) = worklist.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(block) = self.block(id) {
                worklist.extend(block.successors());
                worklist.extend(block.handler);
            }
        }
        reachable.insert(self.exit);

        let mut kept: Vec<BasicBlockId> = self
            .layout
            .iter()
            .copied()
            .filter(|id| reachable.contains(id))
            .collect();
        if !kept.contains(&self.exit) {
            kept.push(self.exit);
        }

        let mut blocks = std::mem::take(&mut self.blocks);
        let mut by_id: FxHashMap<BasicBlockId, BasicBlock> =
            blocks.drain(..).map(|b| (b.id, b)).collect();
        self.block_map.clear();
        for id in &kept {
            if let Some(block) = by_id.remove(id) {
                self.block_map.insert(*id, self.blocks.len());
                self.blocks.push(block);
            }
        }
        self.layout = kept;
    }

    /// Validate the function structure
    pub fn validate(&self) -> Result<(), String> {
        if self.layout.is_empty() {
            return Err("Function has no blocks".to_string());
        }

        if !self.is_inserted(self.entry) {
            return Err(format!("Entry block {} does not exist", self.entry));
        }

        match self.block(self.exit).and_then(BasicBlock::terminator) {
            Some(Stmt::Ret(_)) => {}
            _ => return Err(format!("Exit block {} does not return", self.exit)),
        }

        for block in self.blocks() {
            if !block.is_terminated() {
                return Err(format!("Block {} is not terminated", block.id));
            }

            for succ in block.successors() {
                if !self.is_inserted(succ) {
                    return Err(format!(
                        "Block {} references non-existent successor {}",
                        block.id, succ
                    ));
                }
            }

            if let Some(handler) = block.handler {
                if !self.is_inserted(handler) {
                    return Err(format!(
                        "Block {} references non-existent handler {}",
                        block.id, handler
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::Expr;
    use crate::interner::Interner;

    fn make_function() -> Function {
        let mut strings = Interner::new();
        Function::new(FunctionId(0), strings.intern("f"), None)
    }

    #[test]
    fn test_function_new() {
        let func = make_function();
        assert!(func.formals.is_empty());
        assert!(func.is_empty());
        assert_eq!(func.temp_count(), 0);
    }

    #[test]
    fn test_temps_strictly_increase() {
        let mut func = make_function();
        let a = func.new_temp();
        let b = func.new_temp();
        assert!(b > a);
        assert_eq!(func.temp_count(), 2);
    }

    #[test]
    fn test_detached_block_not_in_layout() {
        let mut func = make_function();
        let entry = func.new_block(None, true);
        let later = func.new_block(None, false);
        assert_eq!(func.block_count(), 1);
        assert!(func.block(later).is_some());

        func.insert_block(later);
        func.insert_block(later);
        assert_eq!(func.block_ids().collect::<Vec<_>>(), vec![entry, later]);
    }

    #[test]
    fn test_validate_unterminated() {
        let mut func = make_function();
        func.entry = func.new_block(None, true);
        func.exit = func.new_block(None, true);
        func.append(func.exit, Stmt::Ret(Expr::undefined()));

        let err = func.validate().unwrap_err();
        assert!(err.contains("not terminated"));

        func.append(func.entry, Stmt::Jump(func.exit));
        assert!(func.validate().is_ok());
    }

    #[test]
    fn test_prune_keeps_handlers_and_exit() {
        let mut func = make_function();
        func.entry = func.new_block(None, true);
        let handler = func.new_block(None, true);
        let guarded = func.new_block(Some(handler), true);
        let dead = func.new_block(None, true);
        func.exit = func.new_block(None, true);

        func.append(func.entry, Stmt::Jump(guarded));
        func.append(guarded, Stmt::Jump(func.exit));
        func.append(handler, Stmt::Jump(func.exit));
        func.append(dead, Stmt::Jump(func.exit));
        func.append(func.exit, Stmt::Ret(Expr::undefined()));

        func.prune_unreachable();

        let ids: Vec<_> = func.block_ids().collect();
        assert_eq!(ids, vec![func.entry, handler, guarded, func.exit]);
        assert!(func.block(dead).is_none());
        assert!(func.validate().is_ok());
    }
}
