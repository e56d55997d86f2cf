//! Mechanism.
//!
//! The `Mechanism` trait is the run-time face of memory allocation: a
//! mechanism hands out blocks by byte count and takes them back by address,
//! so that a single proxy type can forward to any strategy (arena, pool,
//! counting, bump) selected when the proxy is constructed.

#[cfg(feature = "with-std")]
use log::error;

#[cfg(feature = "with-std")]
use super::root::{alloc, mem, ptr};

/// Alignment guarantee of every mechanism, in bytes.
///
/// A non-null block returned by `Mechanism::allocate` is aligned to at
/// least this boundary. Element types with stricter alignment cannot be
/// serviced through a proxy.
pub const MAX_ALIGNMENT: usize = 16;

/// Largest byte count a mechanism can be asked to allocate.
///
/// Byte counts are bounded by `isize::MAX`, the platform limit on the size
/// of a single object; only half of the unsigned range is usable.
pub const MAX_BYTES: usize = isize::MAX as usize;

/// `Mechanism`
///
/// A mechanism owns an allocation strategy; proxies reference one and
/// forward to it. The mechanism is never owned by the proxies referencing
/// it: its lifetime is controlled by whoever created it, and commonly
/// exceeds every proxy bound to it.
///
/// #   Contract
///
/// -   `allocate(0)` returns a null pointer, with no other effect.
/// -   `allocate(size)`, for a non-zero `size`, returns a pointer to at
///     least `size` uninitialized bytes aligned to `MAX_ALIGNMENT`, or
///     signals failure, by returning null or by panicking. Either signal
///     is forwarded untranslated by proxies. Counts above `MAX_BYTES` are
///     never satisfiable.
/// -   `deallocate(null)` has no effect.
///
/// Nothing here is validated by the callers; violations are the
/// implementation's to define.
pub trait Mechanism {
    /// Allocates a block of at least `size` bytes.
    fn allocate(&self, size: usize) -> *mut u8;

    /// Releases a block by address alone.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `ptr` is null, or was returned by `allocate` on
    ///     this very mechanism and was not released since.
    unsafe fn deallocate(&self, ptr: *mut u8);
}

/// `GlobalMechanism`
///
/// The default mechanism: blocks are carved out of the process global
/// allocator. Since a mechanism releases by address alone while the global
/// allocator wants the size back, each block is preceded by a header
/// recording it.
///
/// #   Example
///
/// ```
/// use polyalloc::mechanism::{GlobalMechanism, Mechanism};
///
/// let mechanism = GlobalMechanism;
///
/// let block = mechanism.allocate(64);
/// assert!(!block.is_null());
///
/// //  Safety:
/// //  -   `block` was allocated above, and is released exactly once.
/// unsafe { mechanism.deallocate(block) };
/// ```
#[cfg(feature = "with-std")]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GlobalMechanism;

#[cfg(feature = "with-std")]
impl Mechanism for GlobalMechanism {
    fn allocate(&self, size: usize) -> *mut u8 {
        if size == 0 {
            return ptr::null_mut();
        }

        let Some(layout) = block_layout(size) else {
            error!("allocation of {} bytes exceeds the mechanism limit", size);
            return ptr::null_mut();
        };

        //  Safety:
        //  -   The layout has a non-zero size.
        let block = unsafe { alloc::alloc(layout) };

        if block.is_null() {
            error!("allocation of {} bytes failed", size);
            return ptr::null_mut();
        }

        //  Safety:
        //  -   `block` is valid for a header write, per the layout.
        unsafe {
            block.cast::<Header>().write(Header { size: layout.size() });
            block.add(HEADER_SIZE)
        }
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        //  Safety:
        //  -   `ptr` was returned by `allocate`, hence sits one header past
        //      the start of a live block.
        let (block, size) = unsafe {
            let block = ptr.sub(HEADER_SIZE);
            (block, block.cast::<Header>().read().size)
        };

        //  Safety:
        //  -   The layout matches the one `allocate` used for this block.
        unsafe {
            alloc::dealloc(
                block,
                alloc::Layout::from_size_align_unchecked(size, MAX_ALIGNMENT),
            )
        };
    }
}

//
//  Implementation Details
//

//  Header preceding each block handed out by `GlobalMechanism`; sized to
//  occupy exactly one alignment unit, so the user region stays aligned.
#[cfg(feature = "with-std")]
#[repr(C, align(16))]
struct Header {
    //  Full size of the block, header included.
    size: usize,
}

#[cfg(feature = "with-std")]
const HEADER_SIZE: usize = mem::size_of::<Header>();

#[cfg(feature = "with-std")]
const _: () = assert!(HEADER_SIZE == MAX_ALIGNMENT);

//  Returns the layout of a block serving `size` user bytes, header
//  included, or None if the total cannot be represented.
#[cfg(feature = "with-std")]
fn block_layout(size: usize) -> Option<alloc::Layout> {
    let total = size.checked_add(HEADER_SIZE)?;

    alloc::Layout::from_size_align(total, MAX_ALIGNMENT).ok()
}

#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn global_allocate_zero() {
        let mechanism = GlobalMechanism;

        assert!(mechanism.allocate(0).is_null());
    }

    #[test]
    fn global_allocate_roundtrip() {
        let mechanism = GlobalMechanism;

        let block = mechanism.allocate(40);
        assert!(!block.is_null());
        assert_eq!(0, block as usize % MAX_ALIGNMENT);

        //  Safety:
        //  -   The block is 40 bytes, all within bounds.
        unsafe {
            block.write_bytes(0xAB, 40);
            assert_eq!(0xAB, *block);
            assert_eq!(0xAB, *block.add(39));
        }

        //  Safety:
        //  -   Allocated above, released exactly once.
        unsafe { mechanism.deallocate(block) };
    }

    #[test]
    fn global_deallocate_null() {
        let mechanism = GlobalMechanism;

        //  Safety:
        //  -   Null is a no-op per the contract.
        unsafe { mechanism.deallocate(ptr::null_mut()) };
    }

    #[test]
    fn global_allocate_excessive() {
        let mechanism = GlobalMechanism;

        assert!(mechanism.allocate(usize::MAX).is_null());
        assert!(mechanism.allocate(MAX_BYTES).is_null());
    }

    #[test]
    fn block_layout_bounds() {
        assert!(block_layout(1).is_some());
        assert!(block_layout(1usize << 40).is_some());
        assert!(block_layout(MAX_BYTES).is_none());
        assert!(block_layout(usize::MAX).is_none());
    }

    proptest! {
        #[test]
        fn global_allocate_any_size(size in 1usize..4096) {
            let mechanism = GlobalMechanism;

            let block = mechanism.allocate(size);
            prop_assert!(!block.is_null());
            prop_assert_eq!(0, block as usize % MAX_ALIGNMENT);

            //  Safety:
            //  -   The block spans `size` bytes.
            unsafe {
                block.write_bytes(0xCD, size);
            }

            //  Safety:
            //  -   Allocated above, released exactly once.
            unsafe { mechanism.deallocate(block) };
        }
    }
}
