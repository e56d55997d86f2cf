//! The Proxy

use super::root::{fmt, marker, mem, ptr};

use super::addr;
use super::failure::{Failure, Result};
use super::mechanism::{Mechanism, MAX_ALIGNMENT, MAX_BYTES};
use super::RawProxy;

#[cfg(feature = "with-std")]
use super::registry;

/// `Proxy`
///
/// A copyable allocator handle forwarding every memory operation to the
/// mechanism it references. A container holds one by value; which strategy
/// actually serves the container was decided by whoever constructed the
/// proxy.
///
/// The proxy owns nothing: dropping it leaves the mechanism untouched, and
/// copying it merely copies the reference.
///
/// #   Example of not Send.
///
/// A `Proxy` does not cross threads; share a `Sync` mechanism instead, and
/// construct one proxy per thread.
///
/// ```compile_fail
/// # use polyalloc::mechanism::GlobalMechanism;
/// # use polyalloc::proxy::Proxy;
/// fn ensure_send<T: Send>(_: T) {}
///
/// let mechanism = GlobalMechanism;
/// let proxy: Proxy<i32> = Proxy::new(&mechanism);
///
/// ensure_send(proxy);
/// ```
pub struct Proxy<'m, T> {
    //  The mechanism every operation forwards to. Never dangling; not owned.
    mechanism: &'m dyn Mechanism,
    //  Element marker; `fn() -> T` keeps auto-traits and variance
    //  independent of `T`.
    _element: marker::PhantomData<fn() -> T>,
}

impl<'m, T> Proxy<'m, T> {
    /// Creates a proxy forwarding to `mechanism`.
    pub fn new(mechanism: &'m dyn Mechanism) -> Self {
        Self { mechanism, _element: marker::PhantomData }
    }

    /// Creates a proxy forwarding to `mechanism` if supplied, and to the
    /// process-wide default otherwise.
    #[cfg(feature = "with-std")]
    pub fn or_default(mechanism: Option<&'m dyn Mechanism>) -> Self {
        Self::new(registry::resolve(mechanism))
    }

    /// Returns the mechanism this proxy forwards to.
    pub fn mechanism(&self) -> &'m dyn Mechanism {
        self.mechanism
    }

    /// Re-parameterizes this proxy for elements of type `U`, preserving the
    /// mechanism.
    ///
    /// The result compares equal to `self`.
    pub fn rebind<U>(self) -> Proxy<'m, U> {
        Proxy::new(self.mechanism)
    }

    /// Allocates uninitialized storage for `n` elements of type `T`.
    ///
    /// Forwards a request of `n * size_of::<T>()` bytes to the mechanism;
    /// whatever failure signal the mechanism raises, a null return or an
    /// unwinding panic, passes through untranslated. Zero-sized element
    /// types are served a dangling, well-aligned pointer without involving
    /// the mechanism.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `n <= self.max_size()`.
    /// -   Assumes that `align_of::<T>()` is at most `MAX_ALIGNMENT`.
    pub unsafe fn allocate(&self, n: usize) -> *mut T {
        debug_assert!(n <= self.max_size());
        debug_assert!(mem::align_of::<T>() <= MAX_ALIGNMENT);

        if mem::size_of::<T>() == 0 {
            return ptr::NonNull::dangling().as_ptr();
        }

        self.mechanism.allocate(n * mem::size_of::<T>()).cast()
    }

    /// Allocates uninitialized storage for `n` elements of type `T`,
    /// checked.
    ///
    /// The checked companion of `allocate`: counts the mechanism byte
    /// counter cannot represent are rejected rather than undefined, and a
    /// null return is reported as a `Failure`. Requests for zero bytes are
    /// served a dangling, well-aligned placeholder: the mechanism is not
    /// involved, and the placeholder must not be released through
    /// `deallocate`.
    pub fn try_allocate(&self, n: usize) -> Result<ptr::NonNull<T>> {
        if mem::align_of::<T>() > MAX_ALIGNMENT {
            return Err(Failure::UnsupportedAlignment);
        }

        if n > self.max_size() {
            return Err(Failure::ElementsOverflow);
        }

        if n == 0 || mem::size_of::<T>() == 0 {
            return Ok(ptr::NonNull::dangling());
        }

        //  Safety:
        //  -   `n` and the alignment were just checked.
        let pointer = unsafe { self.allocate(n) };

        ptr::NonNull::new(pointer).ok_or(Failure::OutOfMemory)
    }

    /// Returns the storage of `n` elements of type `T` to the mechanism.
    ///
    /// The element count is ignored: mechanisms release by address alone.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer` is null, or was obtained from `allocate`
    ///     or `try_allocate` on a proxy equal to this one and was not
    ///     released since.
    pub unsafe fn deallocate(&self, pointer: *mut T, _n: usize) {
        if mem::size_of::<T>() == 0 {
            return;
        }

        //  Safety:
        //  -   Forwarding, address unchanged.
        unsafe { self.mechanism.deallocate(pointer.cast()) };
    }

    /// Begins the lifetime of a `T` at `pointer` by moving `value` in.
    ///
    /// No memory is allocated.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer` refers to unconstructed storage suitably
    ///     sized and aligned for a `T`.
    pub unsafe fn construct(&self, pointer: *mut T, value: T) {
        //  Safety:
        //  -   `pointer` is valid for a `T` write, per the precondition.
        unsafe { ptr::write(pointer, value) };
    }

    /// Ends the lifetime of the `T` at `pointer`.
    ///
    /// The underlying storage is not released.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `pointer` refers to a live `T`.
    pub unsafe fn destroy(&self, pointer: *mut T) {
        //  Safety:
        //  -   `pointer` refers to a live `T`, per the precondition.
        unsafe { ptr::drop_in_place(pointer) };
    }

    /// Returns the address of `value`.
    pub fn address(&self, value: &T) -> *const T {
        addr::address_of(value)
    }

    /// Returns the address of `value`.
    pub fn address_mut(&self, value: &mut T) -> *mut T {
        addr::address_of_mut(value)
    }

    /// Returns the largest count for which `allocate` is within contract.
    ///
    /// This is `MAX_BYTES / size_of::<T>()`, the largest element count
    /// whose byte size a mechanism can be asked for, and `usize::MAX` for
    /// zero-sized element types. No guarantee is made that allocating this
    /// many elements, or any lesser count, actually succeeds.
    pub fn max_size(&self) -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => MAX_BYTES / size,
        }
    }
}

/// Creates a proxy forwarding to the process-wide default mechanism.
#[cfg(feature = "with-std")]
impl<T> Default for Proxy<'_, T> {
    fn default() -> Self {
        Self::new(registry::current())
    }
}

impl<T> Clone for Proxy<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Proxy<'_, T> {}

impl<T> fmt::Debug for Proxy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proxy({:p})", self.mechanism as *const dyn Mechanism as *const ())
    }
}

impl<'m, T, M: Mechanism> From<&'m M> for Proxy<'m, T> {
    fn from(mechanism: &'m M) -> Self {
        Self::new(mechanism)
    }
}

impl<'m, T> From<RawProxy<'m>> for Proxy<'m, T> {
    fn from(raw: RawProxy<'m>) -> Self {
        Self::new(raw.mechanism())
    }
}

impl<'m, 'n, T, U> PartialEq<Proxy<'n, U>> for Proxy<'m, T> {
    fn eq(&self, other: &Proxy<'n, U>) -> bool {
        ptr::addr_eq(self.mechanism, other.mechanism)
    }
}

impl<T> Eq for Proxy<'_, T> {}

impl<'m, 'n, T> PartialEq<RawProxy<'n>> for Proxy<'m, T> {
    fn eq(&self, other: &RawProxy<'n>) -> bool {
        ptr::addr_eq(self.mechanism, other.mechanism())
    }
}

impl<'a, 'b, 'm, T> PartialEq<&'a (dyn Mechanism + 'b)> for Proxy<'m, T> {
    fn eq(&self, other: &&'a (dyn Mechanism + 'b)) -> bool {
        ptr::addr_eq(self.mechanism, *other)
    }
}

impl<'a, 'b, 'm, T> PartialEq<Proxy<'m, T>> for &'a (dyn Mechanism + 'b) {
    fn eq(&self, other: &Proxy<'m, T>) -> bool {
        ptr::addr_eq(*self, other.mechanism)
    }
}

//  mod tests
