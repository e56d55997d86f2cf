//! #   The Proxy.
//!
//! A container parameterized by an allocator type commits, at compile time,
//! to an allocation mechanism: two containers cannot share a type without
//! sharing the way they obtain memory. The `Proxy` breaks that connection.
//! The container is compiled once, against the one `Proxy` type, and the
//! mechanism is chosen at *run time*, by initializing the proxy with a
//! reference to any [`Mechanism`](crate::mechanism::Mechanism)
//! implementation.
//!
//! Proxies have full value semantics (well-behaved copying, assignment,
//! and tests for equality) but never own their mechanism: copying a proxy
//! copies the reference, dropping a proxy leaves the mechanism untouched.
//! Two proxies compare equal if and only if they reference the same
//! mechanism object, whatever element types they are parameterized over.
//!
//! ##  Restrictions on proxy usage.
//!
//! Generic code routinely assumes that two allocators of the same type
//! always compare equal. That assumption is incorrect for proxies: two
//! containers of the identical compile-time type may run on different
//! mechanisms. Any facility consuming proxies must therefore treat
//! allocator equality as a run-time fact, established with `==`, before it
//! transfers ownership of allocated storage from one container to another
//! when moving, swapping, or splicing.
//!
//! #   Example: run-time selection.
//!
//! ```
//! use std::cell::Cell;
//!
//! use polyalloc::mechanism::{GlobalMechanism, Mechanism};
//! use polyalloc::proxy::Proxy;
//!
//! //  A mechanism counting the blocks outstanding.
//! #[derive(Default)]
//! struct Counting {
//!     outstanding: Cell<usize>,
//!     inner: GlobalMechanism,
//! }
//!
//! impl Mechanism for Counting {
//!     fn allocate(&self, size: usize) -> *mut u8 {
//!         let block = self.inner.allocate(size);
//!         if !block.is_null() {
//!             self.outstanding.set(self.outstanding.get() + 1);
//!         }
//!         block
//!     }
//!
//!     unsafe fn deallocate(&self, ptr: *mut u8) {
//!         if !ptr.is_null() {
//!             self.outstanding.set(self.outstanding.get() - 1);
//!         }
//!         self.inner.deallocate(ptr);
//!     }
//! }
//!
//! let counting = Counting::default();
//!
//! //  Same type as a default-constructed proxy; different mechanism.
//! let proxy: Proxy<u32> = Proxy::new(&counting);
//!
//! let block = proxy.try_allocate(5).expect("5 elements fit");
//! assert_eq!(1, counting.outstanding.get());
//!
//! //  Safety:
//! //  -   `block` came from `proxy`, and is released exactly once.
//! unsafe { proxy.deallocate(block.as_ptr(), 5) };
//! assert_eq!(0, counting.outstanding.get());
//! ```
//!
//! #   Example: rebinding.
//!
//! A container needing storage for an internal type, a node say, obtains
//! the equivalent proxy without losing the strategy it was constructed
//! with:
//!
//! ```
//! use polyalloc::mechanism::GlobalMechanism;
//! use polyalloc::proxy::Proxy;
//!
//! let mechanism = GlobalMechanism;
//!
//! let of_ints: Proxy<u32> = Proxy::new(&mechanism);
//! let of_bytes: Proxy<u8> = of_ints.rebind();
//!
//! //  Same mechanism, hence equal, across element types.
//! assert!(of_ints == of_bytes);
//! ```

mod proxy;
mod raw;

pub use self::proxy::Proxy;
pub use self::raw::RawProxy;

use super::addr;
use super::failure;
use super::mechanism;
use super::root;

#[cfg(feature = "with-std")]
use super::registry;
