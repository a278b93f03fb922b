/// SMT-LIB sort (type) representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Fixed-width bitvector: `(_ BitVec n)`
    BitVec(u32),
}

impl Sort {
    /// Number of bits a value of this sort occupies.
    pub fn width(&self) -> u32 {
        match self {
            Sort::Bool => 1,
            Sort::BitVec(n) => *n,
        }
    }
}
