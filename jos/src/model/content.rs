use crate::model::array::Array;
use crate::model::block_data::BlockData;
use crate::model::class_desc::ClassDescriptor;
use crate::model::enum_value::EnumValue;
use crate::model::object::Object;
use crate::model::strings::JavaString;

/// A top-level decodable unit, and the payload type stored in the handle
/// table: an object, a new string, block data, a class descriptor, an
/// array, an enum constant, or the null sentinel.
///
/// Not every variant can appear at every grammar position: `Block` never
/// occupies a handle and `ClassDesc` never appears as a top-level content.
/// The decoder enforces those restrictions; this type is simply the union
/// of everything that *can* end up in the handle table or in a `read_all`
/// result.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Null,
    String(JavaString),
    ClassDesc(ClassDescriptor),
    Object(Object),
    Array(Array),
    Enum(EnumValue),
    Block(BlockData),
}

impl Content {
    pub fn as_string(&self) -> Option<&JavaString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_class_desc(&self) -> Option<&ClassDescriptor> {
        match self {
            Self::ClassDesc(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockData> {
        match self {
            Self::Block(b) => Some(b),
            _ => None,
        }
    }
}
