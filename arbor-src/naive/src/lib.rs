#[doc(inline)]
pub use sorted_assoc::{self, SortedAssoc};
