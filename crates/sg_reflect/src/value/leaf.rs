use core::fmt;

use crate::error::{Result, SchemaError};
use crate::value::{AnyVisitor, AnyVisitorMut, Complex128, FloatMax, PrimitiveType, TypeTag, Value};

// -----------------------------------------------------------------------------
// Leaf enumeration

/// Invokes `$m!` with the full list of scalar leaves as `Variant(type)` pairs.
///
/// Variant names match [`PrimitiveType`] so the generated code can map
/// between the two by name.
macro_rules! for_each_leaf {
    ($m:ident) => {
        $m! {
            Bool(bool),
            Int8(i8),
            UInt8(u8),
            Int16(i16),
            UInt16(u16),
            Int32(i32),
            UInt32(u32),
            Int64(i64),
            UInt64(u64),
            Float32(f32),
            Float64(f64),
            FloatMax(FloatMax),
            Complex128(Complex128),
            String(String),
        }
    };
}

macro_rules! define_leaves {
    ($($variant:ident($ty:ty),)*) => {
        /// Shared reference to a scalar leaf, handed to [`AnyVisitor::on`].
        #[derive(Debug, Clone, Copy)]
        pub enum LeafRef<'a> {
            $($variant(&'a $ty),)*
        }

        /// Exclusive reference to a scalar leaf, handed to [`AnyVisitorMut::on`].
        #[derive(Debug)]
        pub enum LeafMut<'a> {
            $($variant(&'a mut $ty),)*
        }

        /// An owned scalar leaf.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Scalar {
            $($variant($ty),)*
        }

        impl LeafRef<'_> {
            pub fn primitive_type(&self) -> PrimitiveType {
                match self {
                    $(Self::$variant(_) => PrimitiveType::$variant,)*
                }
            }

            pub fn to_scalar(&self) -> Scalar {
                match *self {
                    $(Self::$variant(v) => Scalar::$variant(v.clone()),)*
                }
            }
        }

        impl LeafMut<'_> {
            pub fn primitive_type(&self) -> PrimitiveType {
                match self {
                    $(Self::$variant(_) => PrimitiveType::$variant,)*
                }
            }

            pub fn as_ref(&self) -> LeafRef<'_> {
                match self {
                    $(Self::$variant(v) => LeafRef::$variant(v),)*
                }
            }

            /// Stores `scalar` through the reference.
            ///
            /// Fails with [`SchemaError::IncompatibleType`] when the scalar has
            /// a different primitive type than the slot; no numeric
            /// conversion is attempted.
            pub fn set(self, scalar: Scalar) -> Result<(), SchemaError> {
                match (self, scalar) {
                    $((Self::$variant(slot), Scalar::$variant(v)) => {
                        *slot = v;
                        Ok(())
                    })*
                    (slot, v) => Err(SchemaError::incompatible(
                        slot.primitive_type(),
                        v.primitive_type(),
                    )),
                }
            }
        }

        impl Scalar {
            pub fn primitive_type(&self) -> PrimitiveType {
                match self {
                    $(Self::$variant(_) => PrimitiveType::$variant,)*
                }
            }

            pub fn as_leaf(&self) -> LeafRef<'_> {
                match self {
                    $(Self::$variant(v) => LeafRef::$variant(v),)*
                }
            }
        }

        $(
            impl Value for $ty {
                fn static_tag() -> TypeTag {
                    TypeTag::Scalar(PrimitiveType::$variant)
                }

                fn type_tag(&self) -> TypeTag {
                    TypeTag::Scalar(PrimitiveType::$variant)
                }

                #[inline]
                fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
                    visitor.on(LeafRef::$variant(self))
                }

                #[inline]
                fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
                    visitor.on(LeafMut::$variant(self))
                }
            }

            impl From<$ty> for Scalar {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

for_each_leaf!(define_leaves);

// -----------------------------------------------------------------------------
// Lexical forms

impl LeafRef<'_> {
    /// Canonical text form of the leaf, as stored in `@value` literals.
    ///
    /// Floats keep a fractional part (`1.0`, not `1`) and use Rust's shortest
    /// round-trip representation. Complex numbers are written `re,im`.
    pub fn lexical(&self) -> String {
        match *self {
            Self::Bool(v) => v.to_string(),
            Self::Int8(v) => v.to_string(),
            Self::UInt8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::UInt16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::UInt32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::UInt64(v) => v.to_string(),
            Self::Float32(v) => format!("{v:?}"),
            Self::Float64(v) => format!("{v:?}"),
            Self::FloatMax(v) => format!("{:?}", v.0),
            Self::Complex128(v) => format!("{:?},{:?}", v.re, v.im),
            Self::String(v) => v.clone(),
        }
    }
}

impl Scalar {
    /// Parses the lexical form produced by [`LeafRef::lexical`].
    pub fn parse(primitive_type: PrimitiveType, text: &str) -> Result<Self, SchemaError> {
        fn num<T: core::str::FromStr>(pt: PrimitiveType, text: &str) -> Result<T, SchemaError> {
            text.trim()
                .parse()
                .map_err(|_| SchemaError::malformed(format!("`{text}` is not a valid {pt}")))
        }

        let pt = primitive_type;
        Ok(match pt {
            PrimitiveType::Bool => Self::Bool(num(pt, text)?),
            PrimitiveType::Int8 => Self::Int8(num(pt, text)?),
            PrimitiveType::UInt8 => Self::UInt8(num(pt, text)?),
            PrimitiveType::Int16 => Self::Int16(num(pt, text)?),
            PrimitiveType::UInt16 => Self::UInt16(num(pt, text)?),
            PrimitiveType::Int32 => Self::Int32(num(pt, text)?),
            PrimitiveType::UInt32 => Self::UInt32(num(pt, text)?),
            PrimitiveType::Int64 => Self::Int64(num(pt, text)?),
            PrimitiveType::UInt64 => Self::UInt64(num(pt, text)?),
            PrimitiveType::Float32 => Self::Float32(num(pt, text)?),
            PrimitiveType::Float64 => Self::Float64(num(pt, text)?),
            PrimitiveType::FloatMax => Self::FloatMax(FloatMax(num(pt, text)?)),
            PrimitiveType::Complex128 => {
                let (re, im) = text
                    .split_once(',')
                    .ok_or_else(|| SchemaError::malformed(format!("`{text}` is not a valid {pt}")))?;
                Self::Complex128(Complex128::new(num(pt, re)?, num(pt, im)?))
            }
            PrimitiveType::String => Self::String(text.to_owned()),
            PrimitiveType::NotGeneric => {
                return Err(SchemaError::malformed("`notgeneric` has no values"));
            }
        })
    }

    /// Compares two scalars of the same primitive type.
    ///
    /// Floating-point components are equal when both are NaN or when they
    /// differ by at most `tolerance`. Every other leaf compares exactly.
    pub fn approx_eq(&self, other: &Scalar, tolerance: f64) -> bool {
        fn close(a: f64, b: f64, tolerance: f64) -> bool {
            a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= tolerance
        }

        match (self, other) {
            (Self::Float32(a), Self::Float32(b)) => close(f64::from(*a), f64::from(*b), tolerance),
            (Self::Float64(a), Self::Float64(b)) => close(*a, *b, tolerance),
            (Self::FloatMax(a), Self::FloatMax(b)) => close(a.0, b.0, tolerance),
            (Self::Complex128(a), Self::Complex128(b)) => {
                close(a.re, b.re, tolerance) && close(a.im, b.im, tolerance)
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_leaf().lexical())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{LeafMut, Scalar};
    use crate::value::{Complex128, FloatMax, PrimitiveType};

    #[test]
    fn lexical_forms() {
        assert_eq!(Scalar::from(2.5_f64).to_string(), "2.5");
        assert_eq!(Scalar::from(1.0_f64).to_string(), "1.0");
        assert_eq!(Scalar::from(-3_i16).to_string(), "-3");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::from(Complex128::new(1.0, -0.5)).to_string(), "1.0,-0.5");
    }

    #[test]
    fn parse_inverts_lexical() {
        let samples = [
            Scalar::from(0.1_f32),
            Scalar::from(f64::MAX),
            Scalar::from(FloatMax(-7.25)),
            Scalar::from(u64::MAX),
            Scalar::from(i8::MIN),
            Scalar::from(Complex128::new(3.0, 4.0)),
            Scalar::from(String::from("a, b")),
        ];
        for sample in samples {
            let text = sample.to_string();
            let parsed = Scalar::parse(sample.primitive_type(), &text).unwrap();
            assert_eq!(parsed, sample);
        }
        assert!(Scalar::parse(PrimitiveType::UInt8, "256").is_err());
        assert!(Scalar::parse(PrimitiveType::Complex128, "1.0").is_err());
    }

    #[test]
    fn nan_is_equal_to_itself() {
        let nan = Scalar::from(f64::NAN);
        assert!(nan.approx_eq(&nan.clone(), 0.0));
        assert!(!nan.approx_eq(&Scalar::from(1.0_f64), 0.0));
        assert!(Scalar::from(1.0_f64).approx_eq(&Scalar::from(1.05_f64), 0.1));
        assert!(!Scalar::from(1_i32).approx_eq(&Scalar::from(1_i64), 10.0));
    }

    #[test]
    fn set_checks_the_primitive_type() {
        let mut slot = 0.0_f64;
        LeafMut::Float64(&mut slot).set(Scalar::from(4.0_f64)).unwrap();
        assert_eq!(slot, 4.0);
        assert!(LeafMut::Float64(&mut slot).set(Scalar::from(4.0_f32)).is_err());
        assert_eq!(slot, 4.0);
    }
}
