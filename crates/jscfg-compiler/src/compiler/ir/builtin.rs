//! Runtime builtins called from lowered code
//!
//! Services that plain IR cannot express (scope push/pop, property deletion,
//! iteration, literal construction) are emitted as `Call` expressions whose
//! callee is `Expr::Builtin`. The runtime provides one entry point per variant.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `typeofName(name)`
    TypeofName,
    /// `typeofMember(base, name)`
    TypeofMember,
    /// `typeofSubscript(base, index)`
    TypeofSubscript,
    /// `typeofValue(value)`
    TypeofValue,
    /// `deleteMember(base, name)`
    DeleteMember,
    /// `deleteSubscript(base, index)`
    DeleteSubscript,
    /// `deleteName(name)`
    DeleteName,
    /// `throw(value)`
    Throw,
    /// `reThrow()`
    ReThrow,
    /// `unwindException()`, returns whether an exception is pending
    UnwindException,
    /// `pushCatchScope(name)`
    PushCatchScope,
    /// `pushWithScope(value)`
    PushWithScope,
    /// `popScope()`
    PopScope,
    /// `declareVar(name, deletable)`
    DeclareVar,
    /// `defineArray(elements...)`
    DefineArray,
    /// `defineObjectLiteral(count, entries..., arrayEntries...)`
    DefineObjectLiteral,
    /// `setupArgumentsObject()`
    SetupArgumentsObject,
    /// `convertThisToObject()`
    ConvertThisToObject,
    /// `foreachIteratorObject(value)`
    ForeachIteratorObject,
    /// `foreachNextPropertyName(iterator)`
    ForeachNextPropertyName,
}

impl Builtin {
    /// Name the runtime registers this builtin under
    pub fn name(self) -> &'static str {
        match self {
            Builtin::TypeofName => "typeofName",
            Builtin::TypeofMember => "typeofMember",
            Builtin::TypeofSubscript => "typeofSubscript",
            Builtin::TypeofValue => "typeofValue",
            Builtin::DeleteMember => "deleteMember",
            Builtin::DeleteSubscript => "deleteSubscript",
            Builtin::DeleteName => "deleteName",
            Builtin::Throw => "throw",
            Builtin::ReThrow => "reThrow",
            Builtin::UnwindException => "unwindException",
            Builtin::PushCatchScope => "pushCatchScope",
            Builtin::PushWithScope => "pushWithScope",
            Builtin::PopScope => "popScope",
            Builtin::DeclareVar => "declareVar",
            Builtin::DefineArray => "defineArray",
            Builtin::DefineObjectLiteral => "defineObjectLiteral",
            Builtin::SetupArgumentsObject => "setupArgumentsObject",
            Builtin::ConvertThisToObject => "convertThisToObject",
            Builtin::ForeachIteratorObject => "foreachIteratorObject",
            Builtin::ForeachNextPropertyName => "foreachNextPropertyName",
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
