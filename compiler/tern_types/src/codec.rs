//! Bytecode representation of types.
//!
//! Scalars are a bare tag (any integer tag decodes to `int`, and so on for
//! floats and complex numbers). Composites carry a one-byte count followed
//! by their members; lambdas add a flags byte and a trailing return type.

use tern_ir::{ByteReader, ByteWriter, DecodeError, StringInterner, Tag};
use tern_stack::ensure_sufficient_stack;

use crate::{LambdaType, Param, StructType, Type};

/// Lambda flag: the last parameter collects the trailing arguments.
const LAMBDA_VARIADIC: u8 = 0b0000_0001;

/// Decode one type at the reader's position.
pub fn decode_type(
    reader: &mut ByteReader<'_>,
    interner: &StringInterner,
) -> Result<Type, DecodeError> {
    ensure_sufficient_stack(|| decode_inner(reader, interner))
}

fn decode_inner(
    reader: &mut ByteReader<'_>,
    interner: &StringInterner,
) -> Result<Type, DecodeError> {
    let offset = reader.position();
    let ty = match reader.read_tag()? {
        Tag::Nil => Type::Nil,
        Tag::Any => Type::Any,
        Tag::Bool => Type::Bool,
        Tag::Char => Type::Char,
        Tag::Int8 | Tag::Int16 | Tag::IntBig => Type::Int,
        Tag::Float32 | Tag::Float64 => Type::Float,
        Tag::Complex64 | Tag::Complex128 => Type::Complex,
        Tag::String => Type::String,
        Tag::Untyped => Type::Untyped,
        Tag::Array => {
            expect_single(reader, offset)?;
            Type::array(decode_type(reader, interner)?)
        }
        Tag::Spreadable => {
            expect_single(reader, offset)?;
            Type::spreadable(decode_type(reader, interner)?)
        }
        Tag::Tuple => Type::Tuple(decode_members(reader, interner)?),
        Tag::Union => Type::union(decode_members(reader, interner)?),
        Tag::Struct => {
            let count = reader.read_u8()?;
            let mut attributes = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let name = reader.read_name(interner)?;
                attributes.push((name, decode_type(reader, interner)?));
            }
            Type::Struct(StructType::new(attributes))
        }
        Tag::Lambda => Type::lambda(decode_lambda_body(reader, interner)?),
        Tag::Reference => Type::Reference(reader.read_name(interner)?),
        Tag::Alias => {
            let name = reader.read_name(interner)?;
            Type::alias(name, decode_type(reader, interner)?)
        }
        tag @ (Tag::Pop | Tag::SlotU8 | Tag::SlotU16 | Tag::Named) => {
            return Err(DecodeError::UnexpectedTag {
                tag,
                offset,
                expected: "a type",
            });
        }
    };
    Ok(ty)
}

/// Lambda signature after its `Lambda` tag.
fn decode_lambda_body(
    reader: &mut ByteReader<'_>,
    interner: &StringInterner,
) -> Result<LambdaType, DecodeError> {
    let count = reader.read_u8()?;
    let flags = reader.read_u8()?;
    let mut params = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name = reader.read_name(interner)?;
        let ty = decode_type(reader, interner)?;
        params.push(Param { name, ty });
    }
    let ret = decode_type(reader, interner)?;
    Ok(LambdaType {
        params,
        ret,
        variadic: flags & LAMBDA_VARIADIC != 0,
    })
}

fn decode_members(
    reader: &mut ByteReader<'_>,
    interner: &StringInterner,
) -> Result<Vec<Type>, DecodeError> {
    let count = reader.read_u8()?;
    (0..count).map(|_| decode_type(reader, interner)).collect()
}

fn expect_single(reader: &mut ByteReader<'_>, offset: usize) -> Result<(), DecodeError> {
    match reader.read_u8()? {
        1 => Ok(()),
        _ => Err(DecodeError::LengthOutOfRange { offset }),
    }
}

/// Encode `ty` in the form [`decode_type`] reads. Composites are capped at
/// 255 members.
pub fn encode_type(writer: &mut ByteWriter, ty: &Type) {
    match ty {
        Type::Untyped => writer.write_tag(Tag::Untyped),
        Type::Nil => writer.write_tag(Tag::Nil),
        Type::Any => writer.write_tag(Tag::Any),
        Type::Bool => writer.write_tag(Tag::Bool),
        Type::Char => writer.write_tag(Tag::Char),
        Type::Int => writer.write_tag(Tag::Int8),
        Type::Float => writer.write_tag(Tag::Float32),
        Type::Complex => writer.write_tag(Tag::Complex64),
        Type::String => writer.write_tag(Tag::String),
        Type::Array(element) => {
            writer.write_tag(Tag::Array);
            writer.write_u8(1);
            encode_type(writer, element);
        }
        Type::Spreadable(inner) => {
            writer.write_tag(Tag::Spreadable);
            writer.write_u8(1);
            encode_type(writer, inner);
        }
        Type::Tuple(members) => {
            writer.write_tag(Tag::Tuple);
            encode_members(writer, members);
        }
        Type::Union(members) => {
            writer.write_tag(Tag::Union);
            encode_members(writer, members);
        }
        Type::Struct(st) => {
            writer.write_tag(Tag::Struct);
            let attributes = &st.attributes[..st.attributes.len().min(usize::from(u8::MAX))];
            writer.write_u8(count_byte(attributes.len()));
            for attr in attributes {
                writer.write_str(attr.name.as_str());
                encode_type(writer, &attr.ty);
            }
        }
        Type::Lambda(sig) => {
            writer.write_tag(Tag::Lambda);
            let params = &sig.params[..sig.params.len().min(usize::from(u8::MAX))];
            writer.write_u8(count_byte(params.len()));
            writer.write_u8(if sig.variadic { LAMBDA_VARIADIC } else { 0 });
            for param in params {
                writer.write_str(param.name.as_str());
                encode_type(writer, &param.ty);
            }
            encode_type(writer, &sig.ret);
        }
        Type::Reference(name) => {
            writer.write_tag(Tag::Reference);
            writer.write_str(name.as_str());
        }
        Type::Alias { name, target } => {
            writer.write_tag(Tag::Alias);
            writer.write_str(name.as_str());
            encode_type(writer, target);
        }
    }
}

fn encode_members(writer: &mut ByteWriter, members: &[Type]) {
    let members = &members[..members.len().min(usize::from(u8::MAX))];
    writer.write_u8(count_byte(members.len()));
    for member in members {
        encode_type(writer, member);
    }
}

fn count_byte(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(bytes: &[u8], interner: &StringInterner) -> Result<Type, DecodeError> {
        decode_type(&mut ByteReader::new(bytes), interner)
    }

    #[test]
    fn every_integer_tag_is_int() {
        let interner = StringInterner::new();
        for tag in [Tag::Int8, Tag::Int16, Tag::IntBig] {
            assert_eq!(decode(&[tag.as_u8()], &interner), Ok(Type::Int));
        }
        assert_eq!(decode(&[Tag::Float64.as_u8()], &interner), Ok(Type::Float));
        assert_eq!(decode(&[Tag::Complex128.as_u8()], &interner), Ok(Type::Complex));
    }

    #[test]
    fn variadic_lambda_signature() {
        let interner = StringInterner::new();
        let sig = LambdaType::new(
            [
                (interner.intern("sep"), Type::String),
                (interner.intern("parts"), Type::union([Type::Int, Type::String])),
            ],
            Type::String,
        )
        .variadic();
        let ty = Type::lambda(sig);

        let mut writer = ByteWriter::new();
        encode_type(&mut writer, &ty);
        let bytes = writer.finish();
        assert_eq!(bytes[0], Tag::Lambda.as_u8());
        assert_eq!(bytes[1], 2);
        assert_eq!(bytes[2], LAMBDA_VARIADIC);
        assert_eq!(decode(&bytes, &interner), Ok(ty));
    }

    #[test]
    fn struct_keeps_attribute_order() {
        let interner = StringInterner::new();
        let ty = Type::structure([
            (interner.intern("name"), Type::String),
            (interner.intern("tags"), Type::array(Type::String)),
            (interner.intern("owner"), Type::Reference(interner.intern("User"))),
        ]);
        let mut writer = ByteWriter::new();
        encode_type(&mut writer, &ty);
        assert_eq!(decode(&writer.finish(), &interner), Ok(ty));
    }

    #[test]
    fn array_count_must_be_one() {
        let interner = StringInterner::new();
        let bytes = [Tag::Array.as_u8(), 2, Tag::Int8.as_u8(), Tag::Int8.as_u8()];
        assert_eq!(
            decode(&bytes, &interner),
            Err(DecodeError::LengthOutOfRange { offset: 0 })
        );
    }

    #[test]
    fn operand_tags_are_not_types() {
        let interner = StringInterner::new();
        assert_eq!(
            decode(&[Tag::Pop.as_u8()], &interner),
            Err(DecodeError::UnexpectedTag {
                tag: Tag::Pop,
                offset: 0,
                expected: "a type",
            })
        );
    }

    #[test]
    fn truncated_union_reports_end() {
        let interner = StringInterner::new();
        let bytes = [Tag::Union.as_u8(), 2, Tag::Bool.as_u8()];
        assert!(matches!(
            decode(&bytes, &interner),
            Err(DecodeError::UnexpectedEnd { offset: 3, .. })
        ));
    }
}
