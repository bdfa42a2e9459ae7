use crate::model::class_desc::ClassDescriptor;
use crate::model::strings::JavaString;

/// A decoded `TC_ENUM`: the enum's class descriptor and the name of the
/// constant written.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub description: ClassDescriptor,
    pub constant: JavaString,
}
