use core::fmt;

use crate::value::PrimitiveType;

/// Structural type of a visitable value.
///
/// Two values with equal tags produce the same shape of visitor calls, which
/// is what deserializers check before writing into a live field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Scalar(PrimitiveType),
    /// A nullable object reference.
    Object,
    Vector(Box<TypeTag>),
    Matrix(Box<TypeTag>),
    SparseVector(Box<TypeTag>),
    SparseMatrix(Box<TypeTag>),
}

impl TypeTag {
    /// Element tag of a container, `None` for leaves.
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            Self::Scalar(_) | Self::Object => None,
            Self::Vector(inner)
            | Self::Matrix(inner)
            | Self::SparseVector(inner)
            | Self::SparseMatrix(inner) => Some(inner),
        }
    }

    /// Whether an object reference occurs anywhere in the shape.
    pub fn contains_objects(&self) -> bool {
        match self {
            Self::Object => true,
            Self::Scalar(_) => false,
            _ => self.element().is_some_and(TypeTag::contains_objects),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(pt) => write!(f, "{pt}"),
            Self::Object => f.write_str("object"),
            Self::Vector(inner) => write!(f, "vector<{inner}>"),
            Self::Matrix(inner) => write!(f, "matrix<{inner}>"),
            Self::SparseVector(inner) => write!(f, "sparse_vector<{inner}>"),
            Self::SparseMatrix(inner) => write!(f, "sparse_matrix<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeTag;
    use crate::value::PrimitiveType;

    #[test]
    fn display_nests() {
        let tag = TypeTag::Vector(Box::new(TypeTag::SparseVector(Box::new(TypeTag::Scalar(
            PrimitiveType::Float32,
        )))));
        assert_eq!(tag.to_string(), "vector<sparse_vector<float32>>");
        assert!(!tag.contains_objects());
        assert!(TypeTag::Matrix(Box::new(TypeTag::Object)).contains_objects());
    }
}
