use bitflags::bitflags;

bitflags! {
    /// Metadata flags attached to a [`Parameter`](crate::param::Parameter).
    ///
    /// Flags are independent: whether a field is persisted is decided by
    /// [`TRANSIENT`](Self::TRANSIENT) alone, not by
    /// [`HYPERPARAMETER`](Self::HYPERPARAMETER).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParameterProperties: u8 {
        /// Tunable by model selection.
        const HYPERPARAMETER   = 1 << 0;
        /// Differentiable, exposed to gradient-based model selection.
        const GRADIENT_ENABLED = 1 << 1;
        /// Learned during training.
        const MODEL_STATE      = 1 << 2;
        /// Runtime setting, such as a cache size or a thread count.
        const SETTING          = 1 << 3;
        /// Rejected by [`ObjectRef::put`](crate::ObjectRef::put).
        const READONLY         = 1 << 4;
        /// Derived or diagnostic state, never persisted.
        const TRANSIENT        = 1 << 5;
    }
}

impl ParameterProperties {
    /// Human-readable flag names, in bit order.
    pub fn flag_names(self) -> impl Iterator<Item = &'static str> {
        self.iter_names().map(|(name, _)| name)
    }
}

/// How a nested object reference relates to its owner.
///
/// Clone reuses [`Shared`](Self::Shared) references as is and deep-copies
/// [`Owned`](Self::Owned) ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    #[default]
    Owned,
    Shared,
}

#[cfg(test)]
mod tests {
    use super::ParameterProperties;

    #[test]
    fn flag_names_follow_bit_order() {
        let props = ParameterProperties::MODEL_STATE | ParameterProperties::HYPERPARAMETER;
        let names: Vec<_> = props.flag_names().collect();
        assert_eq!(names, ["HYPERPARAMETER", "MODEL_STATE"]);
        assert!(props.contains(ParameterProperties::HYPERPARAMETER));
        assert!(!props.intersects(ParameterProperties::TRANSIENT));
    }
}
