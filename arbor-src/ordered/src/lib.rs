#[doc(inline)]
pub use ordered_map::{self, OrderedMap};
#[doc(inline)]
pub use ordered_multiset::{self, OrderedMultiset};
#[doc(inline)]
pub use ordered_set::{self, OrderedSet};
#[doc(inline)]
pub use rb_tree::{self, RbTree};
