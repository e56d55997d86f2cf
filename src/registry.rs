//! Default-mechanism registry.
//!
//! A proxy constructed without an explicit mechanism binds to the
//! process-wide default recorded here. The default is established lazily,
//! on first read, to the global-allocator mechanism, unless another one
//! was installed beforehand; it is never reset afterwards. Established
//! once, read many times.

use super::root::sync::OnceLock;

use super::failure::{Failure, Result};
use super::mechanism::{GlobalMechanism, Mechanism};

//  The one default. Written at most once, read many times.
static DEFAULT: OnceLock<&'static (dyn Mechanism + Sync)> = OnceLock::new();

static GLOBAL: GlobalMechanism = GlobalMechanism;

/// Returns the process-wide default mechanism, establishing it on first
/// read.
pub fn current() -> &'static (dyn Mechanism + Sync) {
    *DEFAULT.get_or_init(|| &GLOBAL as &'static (dyn Mechanism + Sync))
}

/// Installs `mechanism` as the process-wide default.
///
/// Succeeds at most once, and only while the default is not yet
/// established: once read, the default is locked for the remainder of the
/// process.
///
/// #   Errors
///
/// Returns `Failure::DefaultLocked` if the default was already established.
///
/// #   Example
///
/// ```
/// use polyalloc::mechanism::GlobalMechanism;
/// use polyalloc::registry;
///
/// static MECHANISM: GlobalMechanism = GlobalMechanism;
///
/// assert!(registry::install(&MECHANISM).is_ok());
/// assert!(std::ptr::addr_eq(registry::current(), &MECHANISM));
///
/// //  Established; later installs are rejected.
/// assert!(registry::install(&MECHANISM).is_err());
/// ```
pub fn install(mechanism: &'static (dyn Mechanism + Sync)) -> Result<()> {
    DEFAULT.set(mechanism).map_err(|_| {
        log::warn!("default mechanism already established, install rejected");
        Failure::DefaultLocked
    })
}

/// Resolves an optional mechanism reference: `Some` yields the referenced
/// mechanism, `None` yields the process-wide default.
pub fn resolve(mechanism: Option<&dyn Mechanism>) -> &dyn Mechanism {
    match mechanism {
        Some(mechanism) => mechanism,
        None => current(),
    }
}

#[cfg(test)]
mod tests {

    use std::ptr;

    use super::*;

    use crate::utils::tester::TestMechanism;

    #[test]
    fn registry_current_stable() {
        //  Whichever mechanism the default resolved to, it never changes.
        assert!(ptr::addr_eq(current(), current()));
    }

    #[test]
    fn registry_install_locked() {
        let _ = current();

        static LATE: GlobalMechanism = GlobalMechanism;

        assert_eq!(Err(Failure::DefaultLocked), install(&LATE));
    }

    #[test]
    fn registry_resolve_explicit() {
        let mechanism = TestMechanism::new();

        let resolved = resolve(Some(&mechanism));

        assert!(ptr::addr_eq(resolved, &mechanism));
        assert_eq!(0, mechanism.blocks_outstanding());
    }

    #[test]
    fn registry_resolve_default() {
        assert!(ptr::addr_eq(resolve(None), current()));
    }
}
