/// Fixed-capacity stack living entirely on the call stack.
///
/// Used by KD-tree traversal so a ray query never touches the heap. Capacity is checked
/// when the tree is built (`max_depth + 1 <= N`), so overflowing here means the tree
/// broke that invariant.
pub struct FastStack<T: Copy + Default, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> FastStack<T, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        assert!(self.len < N, "traversal stack overflow (capacity {})", N);
        self.items[self.len] = item;
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(self.items[self.len])
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Copy + Default, const N: usize> Default for FastStack<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut stack = FastStack::<u32, 4>::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    #[should_panic]
    fn overflow_panics() {
        let mut stack = FastStack::<u32, 2>::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
    }
}
