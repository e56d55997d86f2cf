//! The RawProxy

use super::root::{fmt, ptr};

use super::mechanism::Mechanism;
use super::Proxy;

#[cfg(feature = "with-std")]
use super::registry;

/// `RawProxy`
///
/// The element-less proxy: same mechanism reference, same equality and
/// conversion rules as `Proxy`, and none of the element-typed operations.
/// It serves as the handle of choice when a facility needs to carry an
/// allocator without committing to an element type, and as the rebinding
/// pivot between element types.
pub struct RawProxy<'m> {
    //  The referenced mechanism. Never dangling; not owned.
    mechanism: &'m dyn Mechanism,
}

impl<'m> RawProxy<'m> {
    /// Creates a proxy referencing `mechanism`.
    pub fn new(mechanism: &'m dyn Mechanism) -> Self {
        Self { mechanism }
    }

    /// Creates a proxy referencing `mechanism` if supplied, and the
    /// process-wide default otherwise.
    #[cfg(feature = "with-std")]
    pub fn or_default(mechanism: Option<&'m dyn Mechanism>) -> Self {
        Self::new(registry::resolve(mechanism))
    }

    /// Returns the mechanism this proxy references.
    pub fn mechanism(&self) -> &'m dyn Mechanism {
        self.mechanism
    }

    /// Parameterizes this proxy for elements of type `U`, preserving the
    /// mechanism.
    ///
    /// The result compares equal to `self`.
    pub fn rebind<U>(self) -> Proxy<'m, U> {
        Proxy::new(self.mechanism)
    }
}

/// Creates a proxy referencing the process-wide default mechanism.
#[cfg(feature = "with-std")]
impl Default for RawProxy<'_> {
    fn default() -> Self {
        Self::new(registry::current())
    }
}

impl Clone for RawProxy<'_> {
    fn clone(&self) -> Self {
        *self
    }
}

impl Copy for RawProxy<'_> {}

impl fmt::Debug for RawProxy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawProxy({:p})", self.mechanism as *const dyn Mechanism as *const ())
    }
}

impl<'m, M: Mechanism> From<&'m M> for RawProxy<'m> {
    fn from(mechanism: &'m M) -> Self {
        Self::new(mechanism)
    }
}

impl<'m, T> From<Proxy<'m, T>> for RawProxy<'m> {
    fn from(proxy: Proxy<'m, T>) -> Self {
        Self::new(proxy.mechanism())
    }
}

impl<'m, 'n> PartialEq<RawProxy<'n>> for RawProxy<'m> {
    fn eq(&self, other: &RawProxy<'n>) -> bool {
        ptr::addr_eq(self.mechanism, other.mechanism)
    }
}

impl Eq for RawProxy<'_> {}

impl<'m, 'n, T> PartialEq<Proxy<'n, T>> for RawProxy<'m> {
    fn eq(&self, other: &Proxy<'n, T>) -> bool {
        ptr::addr_eq(self.mechanism, other.mechanism())
    }
}

impl<'a, 'b, 'm> PartialEq<&'a (dyn Mechanism + 'b)> for RawProxy<'m> {
    fn eq(&self, other: &&'a (dyn Mechanism + 'b)) -> bool {
        ptr::addr_eq(self.mechanism, *other)
    }
}

impl<'a, 'b, 'm> PartialEq<RawProxy<'m>> for &'a (dyn Mechanism + 'b) {
    fn eq(&self, other: &RawProxy<'m>) -> bool {
        ptr::addr_eq(*self, other.mechanism)
    }
}

#[cfg(test)]
mod tests {

    use std::ptr;

    use crate::mechanism::Mechanism;
    use crate::proxy::{Proxy, RawProxy};
    use crate::registry;
    use crate::utils::tester::TestMechanism;

    #[test]
    fn raw_new_identity() {
        let mechanism = TestMechanism::new();

        let raw = RawProxy::new(&mechanism);

        assert!(ptr::addr_eq(raw.mechanism(), &mechanism));
    }

    #[test]
    fn raw_default_uses_registry() {
        let raw = RawProxy::default();

        assert!(ptr::addr_eq(raw.mechanism(), registry::current()));
        assert!(raw == RawProxy::or_default(None));
    }

    #[test]
    fn raw_copy_equality() {
        let first = TestMechanism::new();
        let second = TestMechanism::new();

        let r1 = RawProxy::new(&first);
        let r2 = RawProxy::new(&second);
        let r3 = r1;

        assert!(r1 != r2);
        assert!(r3 == r1);
        assert!(r3 != r2);
    }

    #[test]
    fn raw_rebind_typed() {
        let mechanism = TestMechanism::new();

        let raw = RawProxy::new(&mechanism);
        let typed: Proxy<i32> = raw.rebind();

        assert!(raw == typed);
        assert!(typed == raw);
    }

    #[test]
    fn raw_conversion_roundtrip() {
        let mechanism = TestMechanism::new();

        let typed: Proxy<i32> = Proxy::new(&mechanism);
        let raw = RawProxy::from(typed);
        let back: Proxy<u8> = raw.into();

        assert!(raw == typed);
        assert!(back == typed);
        assert!(ptr::addr_eq(back.mechanism(), &mechanism));
    }

    #[test]
    fn raw_equality_mechanism_pointer() {
        let first = TestMechanism::new();
        let second = TestMechanism::new();

        let raw = RawProxy::new(&first);

        let first: &dyn Mechanism = &first;
        let second: &dyn Mechanism = &second;

        assert!(raw == first);
        assert!(first == raw);
        assert!(raw != second);
        assert!(second != raw);
    }

    #[test]
    fn raw_debug() {
        let mechanism = TestMechanism::new();

        let raw = RawProxy::new(&mechanism);

        assert!(format!("{:?}", raw).starts_with("RawProxy(0x"));
    }
} //  mod tests
