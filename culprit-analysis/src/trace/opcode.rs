//! Bytecode operation categories for the cost model.

/// Category of one bytecode operation executed by a trace node.
///
/// The cost model only cares whether an operation modifies data.
/// Plumbing operations (loads, stores, returns, constant pushes)
/// move values without computing anything and contribute no cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    LoadConstant,
    LoadVariable,
    LoadFromArray,
    StoreVariable,
    StoreIntoArray,
    Return,
    Arithmetic,
    Logical,
    Comparison,
    Conversion,
    Jump,
    Invoke,
    FieldAccess,
    Allocation,
    Throw,
}

impl OpCategory {
    /// True for operations that compute or transform a value.
    pub fn is_modifying(&self) -> bool {
        !matches!(
            self,
            Self::LoadConstant
                | Self::LoadVariable
                | Self::LoadFromArray
                | Self::StoreVariable
                | Self::StoreIntoArray
                | Self::Return
        )
    }
}
