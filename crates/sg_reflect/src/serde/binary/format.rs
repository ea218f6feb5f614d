use std::io::{self, Read, Write};

use crate::error::{Result, SchemaError};
use crate::value::{PrimitiveType, TypeTag};

// -----------------------------------------------------------------------------
// Constants

pub(super) const MAGIC: [u8; 4] = *b"SGOB";
pub(super) const VERSION: u8 = 1;

/// Deepest container nesting accepted in a type tag.
pub(super) const MAX_TAG_DEPTH: usize = 32;
/// Deepest object nesting accepted while reading.
pub(super) const MAX_OBJECT_DEPTH: usize = 128;

const TAG_SCALAR: u8 = 0x01;
const TAG_OBJECT: u8 = 0x02;
const TAG_VECTOR: u8 = 0x03;
const TAG_MATRIX: u8 = 0x04;
const TAG_SPARSE_VECTOR: u8 = 0x05;
const TAG_SPARSE_MATRIX: u8 = 0x06;

const MARKER_NULL: u8 = 0;
const MARKER_OBJECT: u8 = 1;

// -----------------------------------------------------------------------------
// Writing

pub(super) fn put_u8<W: Write + ?Sized>(out: &mut W, value: u8) -> io::Result<()> {
    out.write_all(&[value])
}

pub(super) fn put_u32<W: Write + ?Sized>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

/// Number of fields in a record.
pub(super) fn put_count<W: Write + ?Sized>(out: &mut W, count: usize) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| SchemaError::malformed(format!("{count} fields in one record")))?;
    Ok(put_u32(out, count)?)
}

pub(super) fn put_len<W: Write + ?Sized>(out: &mut W, value: usize) -> io::Result<()> {
    out.write_all(&(value as u64).to_le_bytes())
}

pub(super) fn put_str<W: Write + ?Sized>(out: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len()).map_err(|_| SchemaError::malformed("string longer than 4 GiB"))?;
    put_u32(out, len)?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

pub(super) fn put_marker<W: Write + ?Sized>(out: &mut W, present: bool) -> io::Result<()> {
    put_u8(out, if present { MARKER_OBJECT } else { MARKER_NULL })
}

pub(super) fn put_tag<W: Write + ?Sized>(out: &mut W, tag: &TypeTag) -> io::Result<()> {
    match tag {
        TypeTag::Scalar(pt) => out.write_all(&[TAG_SCALAR, pt.code()]),
        TypeTag::Object => put_u8(out, TAG_OBJECT),
        TypeTag::Vector(inner) => {
            put_u8(out, TAG_VECTOR)?;
            put_tag(out, inner)
        }
        TypeTag::Matrix(inner) => {
            put_u8(out, TAG_MATRIX)?;
            put_tag(out, inner)
        }
        TypeTag::SparseVector(inner) => {
            put_u8(out, TAG_SPARSE_VECTOR)?;
            put_tag(out, inner)
        }
        TypeTag::SparseMatrix(inner) => {
            put_u8(out, TAG_SPARSE_MATRIX)?;
            put_tag(out, inner)
        }
    }
}

// -----------------------------------------------------------------------------
// Reading

pub(super) fn get_array<const N: usize, R: Read + ?Sized>(input: &mut R) -> Result<[u8; N]> {
    let mut bytes = [0; N];
    input.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub(super) fn get_u8<R: Read + ?Sized>(input: &mut R) -> Result<u8> {
    Ok(get_array::<1, R>(input)?[0])
}

pub(super) fn get_u32<R: Read + ?Sized>(input: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(get_array(input)?))
}

pub(super) fn get_u64<R: Read + ?Sized>(input: &mut R) -> Result<u64> {
    Ok(u64::from_le_bytes(get_array(input)?))
}

/// A length or index, rejected if it does not fit the platform.
pub(super) fn get_len<R: Read + ?Sized>(input: &mut R) -> Result<usize> {
    let value = get_u64(input)?;
    usize::try_from(value).map_err(|_| SchemaError::malformed(format!("length {value} out of range")).into())
}

pub(super) fn get_bool<R: Read + ?Sized>(input: &mut R) -> Result<bool> {
    match get_u8(input)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(SchemaError::malformed(format!("invalid bool byte {other}")).into()),
    }
}

/// Reads a length-prefixed string. The buffer grows with the bytes that
/// actually arrive, never with the announced length.
pub(super) fn get_str<R: Read + ?Sized>(input: &mut R) -> Result<String> {
    let len = get_u32(input)? as usize;
    let mut bytes = Vec::new();
    (&mut *input).take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    String::from_utf8(bytes).map_err(|_| SchemaError::malformed("string is not valid UTF-8").into())
}

pub(super) fn skip_bytes<R: Read + ?Sized>(input: &mut R, len: u64) -> Result<()> {
    let skipped = io::copy(&mut (&mut *input).take(len), &mut io::sink())?;
    if skipped != len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

/// `true` for an object record, `false` for null.
pub(super) fn get_marker<R: Read + ?Sized>(input: &mut R) -> Result<bool> {
    match get_u8(input)? {
        MARKER_NULL => Ok(false),
        MARKER_OBJECT => Ok(true),
        other => Err(SchemaError::malformed(format!("invalid object marker {other}")).into()),
    }
}

pub(super) fn get_primitive_type<R: Read + ?Sized>(input: &mut R) -> Result<PrimitiveType> {
    let code = get_u8(input)?;
    PrimitiveType::from_code(code)
        .ok_or_else(|| SchemaError::malformed(format!("unknown primitive type code {code}")).into())
}

pub(super) fn get_tag<R: Read + ?Sized>(input: &mut R) -> Result<TypeTag> {
    get_tag_at(input, 0)
}

fn get_tag_at<R: Read + ?Sized>(input: &mut R, depth: usize) -> Result<TypeTag> {
    if depth > MAX_TAG_DEPTH {
        return Err(SchemaError::malformed("type tag nested too deeply").into());
    }
    let inner = |input: &mut R| get_tag_at(input, depth + 1).map(Box::new);
    Ok(match get_u8(input)? {
        TAG_SCALAR => match get_primitive_type(input)? {
            // Class headers only, never the payload of a field.
            PrimitiveType::NotGeneric => return Err(SchemaError::malformed("scalar of type notgeneric").into()),
            pt => TypeTag::Scalar(pt),
        },
        TAG_OBJECT => TypeTag::Object,
        TAG_VECTOR => TypeTag::Vector(inner(input)?),
        TAG_MATRIX => TypeTag::Matrix(inner(input)?),
        TAG_SPARSE_VECTOR => TypeTag::SparseVector(inner(input)?),
        TAG_SPARSE_MATRIX => TypeTag::SparseMatrix(inner(input)?),
        other => return Err(SchemaError::malformed(format!("unknown type tag {other:#04x}")).into()),
    })
}

/// Encoded width of a scalar, `None` for length-prefixed strings.
pub(super) fn scalar_width(pt: PrimitiveType) -> Result<Option<u64>> {
    use PrimitiveType as P;

    Ok(match pt {
        P::NotGeneric => return Err(SchemaError::malformed("scalar of type notgeneric").into()),
        P::Bool | P::Int8 | P::UInt8 => Some(1),
        P::Int16 | P::UInt16 => Some(2),
        P::Int32 | P::UInt32 | P::Float32 => Some(4),
        P::Int64 | P::UInt64 | P::Float64 | P::FloatMax => Some(8),
        P::Complex128 => Some(16),
        P::String => None,
    })
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{get_str, get_tag, put_count, put_str, put_tag, scalar_width};
    use crate::error::{Error, SchemaError};
    use crate::value::{PrimitiveType, TypeTag};

    #[test]
    fn tags_are_prefix_coded() {
        let tag = TypeTag::SparseMatrix(Box::new(TypeTag::Scalar(PrimitiveType::Float32)));
        let mut bytes = Vec::new();
        put_tag(&mut bytes, &tag).unwrap();
        assert_eq!(bytes, [0x06, 0x01, PrimitiveType::Float32.code()]);
        assert_eq!(get_tag(&mut bytes.as_slice()).unwrap(), tag);
    }

    #[test]
    fn deep_tags_are_rejected() {
        let mut bytes = vec![0x03; 64];
        bytes.push(0x02);
        assert!(matches!(
            get_tag(&mut bytes.as_slice()),
            Err(Error::Schema(SchemaError::Malformed(_)))
        ));
        assert!(matches!(
            get_tag(&mut [0x7f_u8].as_slice()),
            Err(Error::Schema(SchemaError::Malformed(_)))
        ));
    }

    #[test]
    fn notgeneric_is_not_a_field_type() {
        let bytes = [0x03, 0x01, PrimitiveType::NotGeneric.code()];
        assert!(matches!(
            get_tag(&mut bytes.as_slice()),
            Err(Error::Schema(SchemaError::Malformed(_)))
        ));
        assert!(scalar_width(PrimitiveType::NotGeneric).is_err());
        assert_eq!(scalar_width(PrimitiveType::Complex128).unwrap(), Some(16));
    }

    #[test]
    fn field_count_fits_u32() {
        let mut bytes = Vec::new();
        put_count(&mut bytes, 3).unwrap();
        assert_eq!(bytes, 3_u32.to_le_bytes());

        let mut bytes = Vec::new();
        if let Ok(huge) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert!(matches!(
                put_count(&mut bytes, huge),
                Err(Error::Schema(SchemaError::Malformed(_)))
            ));
            assert!(bytes.is_empty());
        }
    }

    #[test]
    fn truncated_string_is_io() {
        let mut bytes = Vec::new();
        put_str(&mut bytes, "kernel").unwrap();
        bytes.truncate(7);
        assert!(matches!(get_str(&mut bytes.as_slice()), Err(Error::Io(_))));

        // A huge announced length does not allocate up front.
        let bytes = u32::MAX.to_le_bytes();
        assert!(matches!(get_str(&mut bytes.as_slice()), Err(Error::Io(_))));
    }
}
