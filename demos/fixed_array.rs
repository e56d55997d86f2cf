//! A fixed-size array parameterized by the allocator proxy.
//!
//! The array type is compiled once, against `Proxy` alone; which mechanism
//! actually serves each array is decided object by object:
//! -   `a1` runs on the process-wide default mechanism.
//! -   `a2` runs on a counting mechanism, and the demo watches the
//!     outstanding-block counter move as the array lives and dies.

extern crate polyalloc;

use std::cell::Cell;
use std::ops::{Index, IndexMut};

use polyalloc::mechanism::{GlobalMechanism, Mechanism};
use polyalloc::proxy::Proxy;
use polyalloc::registry;

//  A mechanism counting the blocks outstanding (allocated but not yet
//  released), serving the requests through the global-allocator mechanism.
#[derive(Default)]
struct CountingMechanism {
    inner: GlobalMechanism,
    outstanding: Cell<usize>,
}

impl CountingMechanism {
    fn blocks_outstanding(&self) -> usize {
        self.outstanding.get()
    }
}

impl Mechanism for CountingMechanism {
    fn allocate(&self, size: usize) -> *mut u8 {
        let block = self.inner.allocate(size);

        if !block.is_null() {
            self.outstanding.set(self.outstanding.get() + 1);
        }

        block
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        if !ptr.is_null() {
            self.outstanding.set(self.outstanding.get() - 1);
        }

        //  Safety:
        //  -   Forwarding, address unchanged.
        unsafe { self.inner.deallocate(ptr) };
    }
}

//  A fixed-length array drawing its storage, and nothing else, from the
//  proxy it was constructed with.
struct FixedArray<'m, T> {
    proxy: Proxy<'m, T>,
    length: usize,
    data: *mut T,
}

impl<'m, T: Clone> FixedArray<'m, T> {
    //  Creates an array of `length` copies of `value`.
    fn new(length: usize, value: T, proxy: Proxy<'m, T>) -> Self {
        assert!(length <= proxy.max_size());

        //  Safety:
        //  -   `length` is within `max_size`, just checked.
        let data = unsafe { proxy.allocate(length) };

        assert!(!data.is_null() || length == 0, "mechanism out of memory");

        for i in 0..length {
            //  Safety:
            //  -   `data + i` is unconstructed storage, within the
            //      freshly allocated block.
            unsafe { proxy.construct(data.add(i), value.clone()) };
        }

        FixedArray { proxy, length, data }
    }
}

impl<'m, T> FixedArray<'m, T> {
    fn len(&self) -> usize {
        self.length
    }

    fn proxy(&self) -> Proxy<'m, T> {
        self.proxy
    }
}

impl<T> Index<usize> for FixedArray<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < self.length);

        //  Safety:
        //  -   In bounds, and constructed in `new`.
        unsafe { &*self.data.add(index) }
    }
}

impl<T> IndexMut<usize> for FixedArray<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.length);

        //  Safety:
        //  -   In bounds, and constructed in `new`.
        unsafe { &mut *self.data.add(index) }
    }
}

impl<T> Drop for FixedArray<'_, T> {
    fn drop(&mut self) {
        for i in 0..self.length {
            //  Safety:
            //  -   Constructed in `new`, destroyed exactly once.
            unsafe { self.proxy.destroy(self.data.add(i)) };
        }

        //  Safety:
        //  -   Allocated in `new`, released exactly once; the count is
        //      ignored by the proxy.
        unsafe { self.proxy.deallocate(self.data, self.length) };
    }
}

fn main() {
    //  An array on the default mechanism.
    let mut a1: FixedArray<i32> = FixedArray::new(5, 0, Proxy::default());

    assert_eq!(5, a1.len());

    let default_mechanism: &dyn Mechanism = registry::current();
    assert!(a1.proxy() == default_mechanism);

    for i in 0..a1.len() {
        a1[i] = (i + 1) as i32;
    }

    //  A copy of `a1`, on a counting mechanism this time. The values are
    //  equal; the allocation strategies are not.
    let counting = CountingMechanism::default();

    let mut a2: FixedArray<i32> = FixedArray::new(a1.len(), 0, Proxy::new(&counting));

    for i in 0..a1.len() {
        a2[i] = a1[i];
    }

    for i in 0..a1.len() {
        assert_eq!(a1[i], a2[i]);
    }

    assert!(a1.proxy() != a2.proxy());

    let counting_mechanism: &dyn Mechanism = &counting;
    assert!(a2.proxy() == counting_mechanism);

    assert_eq!(1, counting.blocks_outstanding());
    println!("a2 blocks outstanding: {}", counting.blocks_outstanding());

    drop(a2);

    assert_eq!(0, counting.blocks_outstanding());
    println!("a2 dropped, blocks outstanding: {}", counting.blocks_outstanding());
}
