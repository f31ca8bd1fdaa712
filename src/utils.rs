pub use unique::UniqueExt;

mod unique {
    use std::{cmp::Eq, collections::HashSet, hash::Hash};

    /// Yields the items whose key has not been seen yet, keeping the first occurrence.
    pub struct UniqueBy<I, F, K> {
        iter: I,
        key: F,
        seen: HashSet<K>,
    }

    impl<I, F, K> Iterator for UniqueBy<I, F, K>
    where
        I: Iterator,
        F: FnMut(&I::Item) -> K,
        K: Eq + Hash,
    {
        type Item = I::Item;

        fn next(&mut self) -> Option<Self::Item> {
            for next in self.iter.by_ref() {
                if self.seen.insert((self.key)(&next)) {
                    return Some(next);
                }
            }

            None
        }
    }

    pub trait UniqueExt: Iterator {
        fn unique_by<F, K>(self, key: F) -> UniqueBy<Self, F, K>
        where
            F: FnMut(&Self::Item) -> K,
            K: Eq + Hash,
            Self: Sized,
        {
            UniqueBy {
                iter: self,
                key,
                seen: HashSet::new(),
            }
        }
    }

    impl<I: Iterator> UniqueExt for I {}
}
