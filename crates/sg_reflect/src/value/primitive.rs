use core::fmt;

// -----------------------------------------------------------------------------
// Scalar storage types

/// Complex number with two `f64` components.
pub type Complex128 = num_complex::Complex<f64>;

/// The widest floating-point type of the object model.
///
/// Stable Rust has no extended-precision float, so the value is stored as an
/// `f64`. It stays a distinct leaf type: a `FloatMax` field never accepts a
/// stream value tagged `float64` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct FloatMax(pub f64);

impl From<f64> for FloatMax {
    #[inline]
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<FloatMax> for f64 {
    #[inline]
    fn from(value: FloatMax) -> Self {
        value.0
    }
}

// -----------------------------------------------------------------------------
// PrimitiveType

/// Tag of a scalar type.
///
/// Used in two places:
///
/// - as the kind of a leaf value during visitation,
/// - as the specialization key of generic classes in the
///   [`ClassRegistry`](crate::registry::ClassRegistry), where non-generic
///   classes use [`PrimitiveType::NotGeneric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    NotGeneric,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    FloatMax,
    Complex128,
    String,
}

impl PrimitiveType {
    /// All tags, in code order.
    pub const ALL: [PrimitiveType; 15] = [
        Self::NotGeneric,
        Self::Bool,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::FloatMax,
        Self::Complex128,
        Self::String,
    ];

    /// Lower-case name, used in diagnostics and in the JSON header.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotGeneric => "notgeneric",
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::FloatMax => "floatmax",
            Self::Complex128 => "complex128",
            Self::String => "string",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pt| pt.name() == name)
    }

    /// One-byte code used by the binary format.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Datatype IRI used for typed literals in the JSON-LD backend.
    pub const fn xsd_type(self) -> &'static str {
        match self {
            Self::NotGeneric => "sg:notGeneric",
            Self::Bool => "xsd:boolean",
            Self::Int8 => "xsd:byte",
            Self::UInt8 => "xsd:unsignedByte",
            Self::Int16 => "xsd:short",
            Self::UInt16 => "xsd:unsignedShort",
            Self::Int32 => "xsd:int",
            Self::UInt32 => "xsd:unsignedInt",
            Self::Int64 => "xsd:long",
            Self::UInt64 => "xsd:unsignedLong",
            Self::Float32 => "xsd:float",
            Self::Float64 => "xsd:double",
            Self::FloatMax => "sg:floatmax",
            Self::Complex128 => "sg:complex128",
            Self::String => "xsd:string",
        }
    }

    /// Inverse of [`xsd_type`](Self::xsd_type).
    pub fn from_xsd_type(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pt| pt.xsd_type() == iri)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::PrimitiveType;

    #[test]
    fn codes_are_dense() {
        for (index, pt) in PrimitiveType::ALL.into_iter().enumerate() {
            assert_eq!(pt.code() as usize, index);
            assert_eq!(PrimitiveType::from_code(pt.code()), Some(pt));
        }
        assert_eq!(PrimitiveType::from_code(200), None);
    }

    #[test]
    fn names_and_iris() {
        assert_eq!(PrimitiveType::from_name("float64"), Some(PrimitiveType::Float64));
        assert_eq!(PrimitiveType::from_xsd_type("xsd:double"), Some(PrimitiveType::Float64));
        assert_eq!(PrimitiveType::from_xsd_type("xsd:dateTime"), None);
        assert_eq!(PrimitiveType::Complex128.to_string(), "complex128");
    }
}
