//! Parameter Capability
//!
//! A parameter is an opaque, tunable leaf. The registry recognizes it by the
//! `Parameter` trait alone and never looks inside.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::value::NodeId;

/// Capability marker for tunable leaves.
///
/// Implementors are terminal for structural traversal and are what parameter
/// collection reports.
pub trait Parameter: Any + Send + Sync + fmt::Debug {
    /// Short kind tag (e.g. `"Predict"`).
    fn kind(&self) -> &str;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a parameter.
///
/// Cloning shares the parameter; identity is the `NodeId` assigned at
/// construction.
#[derive(Clone)]
pub struct ParamRef {
    id: NodeId,
    inner: Arc<dyn Parameter>,
}

impl ParamRef {
    /// Wrap a parameter in a fresh handle.
    pub fn new<P: Parameter>(param: P) -> Self {
        Self {
            id: NodeId::fresh(),
            inner: Arc::new(param),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &str {
        self.inner.kind()
    }

    pub fn get(&self) -> &dyn Parameter {
        self.inner.as_ref()
    }

    /// Borrow the concrete parameter if it is a `P`.
    pub fn downcast_ref<P: Parameter>(&self) -> Option<&P> {
        self.inner.as_any().downcast_ref::<P>()
    }

    pub fn is<P: Parameter>(&self) -> bool {
        self.downcast_ref::<P>().is_some()
    }

    pub fn ptr_eq(&self, other: &ParamRef) -> bool {
        self.id == other.id
    }
}

impl PartialEq for ParamRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ParamRef {}

impl fmt::Debug for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {:?})", self.kind(), self.id.value(), self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Weight(f32);

    impl Parameter for Weight {
        fn kind(&self) -> &str {
            "Weight"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Bias;

    impl Parameter for Bias {
        fn kind(&self) -> &str {
            "Bias"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_identity_follows_handle() {
        let p = ParamRef::new(Weight(0.5));
        let alias = p.clone();
        assert_eq!(p, alias);
        assert_ne!(p, ParamRef::new(Weight(0.5)));
    }

    #[test]
    fn test_downcast() {
        let p = ParamRef::new(Weight(0.5));
        assert_eq!(p.kind(), "Weight");
        assert!(p.is::<Weight>());
        assert!(!p.is::<Bias>());
        assert_eq!(p.downcast_ref::<Weight>().map(|w| w.0), Some(0.5));
    }
}
