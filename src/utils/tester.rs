//! Internal testing utilities

use super::root::{cell, ptr};

use crate::mechanism::{GlobalMechanism, Mechanism};

//  Allocation
//
//  Description of an outstanding allocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Allocation {
    //  The size requested, in bytes.
    pub size: usize,
    //  The pointer handed out.
    pub pointer: *mut u8,
}

//  Test Mechanism
//
//  A mechanism specifically for testing:
//  -   Allows injecting allocation failures.
//  -   Checks that releases match prior allocations.
//  -   Counts the blocks outstanding.
pub struct TestMechanism {
    //  The mechanism actually serving the requests.
    pub inner: GlobalMechanism,
    //  The number of allocations still allowed; `usize::MAX` when unlimited.
    pub allowed: cell::Cell<usize>,
    //  The allocations performed and not yet released.
    pub allocations: cell::RefCell<Vec<Allocation>>,
}

impl TestMechanism {
    pub fn new() -> Self {
        TestMechanism {
            inner: GlobalMechanism,
            allowed: cell::Cell::new(usize::MAX),
            allocations: cell::RefCell::new(vec![]),
        }
    }

    //  Creates an instance refusing every allocation.
    pub fn exhausted() -> Self {
        let result = Self::new();
        result.allowed.set(0);
        result
    }

    pub fn blocks_outstanding(&self) -> usize {
        self.allocations.borrow().len()
    }

    pub fn allocation_sizes(&self) -> Vec<usize> {
        self.allocations.borrow().iter().map(|a| a.size).collect()
    }

    pub fn clear(&self) {
        for a in self.allocations.borrow().iter() {
            //  Safety:
            //  -   Was allocated by `inner`, and not released.
            unsafe { self.inner.deallocate(a.pointer) };
        }
        self.allocations.borrow_mut().clear();
    }

    fn locate(&self, pointer: *mut u8) -> Option<usize> {
        self.allocations.borrow().iter().position(|a| a.pointer == pointer)
    }
}

impl Mechanism for TestMechanism {
    fn allocate(&self, size: usize) -> *mut u8 {
        if self.allowed.get() == 0 {
            return ptr::null_mut();
        }

        if self.allowed.get() != usize::MAX {
            self.allowed.set(self.allowed.get() - 1);
        }

        let result = self.inner.allocate(size);

        if result.is_null() {
            return result;
        }

        self.allocations.borrow_mut().push(Allocation { size, pointer: result });

        result
    }

    unsafe fn deallocate(&self, pointer: *mut u8) {
        if pointer.is_null() {
            return;
        }

        let Some(index) = self.locate(pointer) else {
            panic!("Could not find {:?} in {:?}",
                pointer, &*self.allocations.borrow());
        };

        self.allocations.borrow_mut().remove(index);

        //  Safety:
        //  -   Located above, hence allocated by `inner` and not released.
        unsafe { self.inner.deallocate(pointer) };
    }
}

impl Default for TestMechanism {
    fn default() -> Self { Self::new() }
}

impl Drop for TestMechanism {
    fn drop(&mut self) { self.clear() }
}

//  SpyCount
//
//  A counter of live element instances.
pub struct SpyCount(cell::Cell<usize>);

impl SpyCount {
    pub fn zero() -> Self { SpyCount(cell::Cell::new(0)) }

    pub fn get(&self) -> usize { self.0.get() }

    fn decrement(&self) { self.0.set(self.0.get() - 1); }

    fn increment(&self) { self.0.set(self.0.get() + 1); }
}

//  Spy Element
//
//  An element tracking the number of live instances, helpful to check that
//  construct and destroy pair up.
pub struct SpyElement<'a> {
    count: &'a SpyCount,
}

impl<'a> SpyElement<'a> {
    pub fn new(count: &'a SpyCount) -> Self {
        count.increment();
        SpyElement { count }
    }
}

impl Drop for SpyElement<'_> {
    fn drop(&mut self) {
        self.count.decrement();
    }
}
