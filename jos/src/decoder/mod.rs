//! The grammar dispatcher: a peek-driven recursive descent parser over a
//! [`ByteSource`] that reconstructs the decoded entity tree described in
//! `crate::model`.

use crate::byte_source::ByteSource;
use crate::error::{DecodeContext, DecodeError, Result};
use crate::handle::{Handle, HandleTable};
use crate::model::{
    Array, BlockData, ClassData, ClassDescFlags, ClassDescInfo, ClassDescriptor, Content,
    EnumValue, FieldDesc, FieldType, FieldValue, JavaString, Object, StringWidth,
};
use crate::options::DecoderOptions;
use crate::tags;

/// Decodes a Java Object Serialization Stream from a [`ByteSource`].
///
/// One instance decodes one stream, once: construction validates the
/// header, and [`ObjectInputStream::read_all`] consumes the remainder.
pub struct ObjectInputStream<S: ByteSource> {
    source: S,
    handles: HandleTable,
    options: DecoderOptions,
    depth: usize,
}

impl<S: ByteSource> ObjectInputStream<S> {
    /// Validates the stream header with default [`DecoderOptions`].
    pub fn new(source: S) -> Result<Self> {
        Self::with_options(source, DecoderOptions::default())
    }

    /// Validates the stream header (`AC ED 00 05`) and prepares to decode.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn with_options(mut source: S, options: DecoderOptions) -> Result<Self> {
        let magic = [source.read_u8()?, source.read_u8()?];
        let version = source.read_u16_be()?;
        if magic != tags::STREAM_MAGIC || version != tags::STREAM_VERSION {
            return Err(DecodeError::BadHeader { magic, version });
        }
        Ok(Self { source, handles: HandleTable::new(), options, depth: 0 })
    }

    /// Decodes top-level contents until the source is exhausted.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn read_all(&mut self) -> Result<Vec<Content>> {
        let mut contents = Vec::new();
        while self.source.has_data_left()? {
            contents.push(self.read_content()?);
        }
        Ok(contents)
    }

    /// The number of handles allocated so far (advisory, for callers
    /// inspecting decode progress).
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    // ---- depth guard ---------------------------------------------------

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(DecodeError::DepthExceeded { max_depth: self.options.max_depth });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn expect_tag(&mut self, expected: u8) -> Result<()> {
        let actual = self.source.read_u8()?;
        if actual != expected {
            return Err(DecodeError::BadTypeCode {
                context: DecodeContext::TopLevelContent,
                code: actual,
            });
        }
        Ok(())
    }

    fn bounded_len(&self, len: i64) -> Result<usize> {
        if len < 0 || len as u64 > self.options.max_block_len as u64 {
            return Err(DecodeError::BadBlockSize(len));
        }
        Ok(len as usize)
    }

    // ---- top-level content ---------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_content(&mut self) -> Result<Content> {
        let tag = self.source.peek()?;
        match tag {
            tags::TC_OBJECT => self.read_new_object().map(Content::Object),
            tags::TC_STRING => self.read_new_string(StringWidth::Short).map(Content::String),
            tags::TC_LONGSTRING => self.read_new_string(StringWidth::Long).map(Content::String),
            tags::TC_BLOCKDATA => self.read_block_data(false).map(Content::Block),
            tags::TC_BLOCKDATALONG => self.read_block_data(true).map(Content::Block),
            tags::TC_REFERENCE => self.resolve_reference().map(|(_, content)| content),
            other => {
                Err(DecodeError::BadTypeCode { context: DecodeContext::TopLevelContent, code: other })
            }
        }
    }

    /// `TC_REFERENCE`: consume the tag and handle, return a deep clone of
    /// the entity allocated at that handle (§3: strings and class
    /// descriptors don't strictly need cloning, but cloning uniformly
    /// keeps this one code path correct for objects and arrays, whose
    /// annotation regions may still be mid-decode elsewhere in the tree).
    fn resolve_reference(&mut self) -> Result<(u32, Content)> {
        self.expect_tag(tags::TC_REFERENCE)?;
        let raw = self.source.read_i32_be()? as u32;
        let content = self.handles.resolve(Handle(raw)).cloned().ok_or(DecodeError::BadHandle(raw))?;
        Ok((raw, content))
    }

    // ---- class descriptors ----------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_class_desc(&mut self) -> Result<Option<ClassDescriptor>> {
        let tag = self.source.peek()?;
        match tag {
            tags::TC_NULL => {
                self.source.read_u8()?;
                Ok(None)
            }
            tags::TC_CLASSDESC => self.read_new_class_desc().map(Some),
            tags::TC_PROXYCLASSDESC => Err(DecodeError::UnsupportedProxyClassDesc),
            tags::TC_REFERENCE => {
                let (raw, content) = self.resolve_reference()?;
                match content {
                    Content::ClassDesc(desc) => Ok(Some(desc)),
                    _ => Err(DecodeError::BadHandle(raw)),
                }
            }
            other => Err(DecodeError::BadTypeCode { context: DecodeContext::ClassDesc, code: other }),
        }
    }

    /// A `classDesc` production that must yield a concrete descriptor
    /// (arrays and enums always describe a real class, never null).
    fn read_required_class_desc(&mut self) -> Result<ClassDescriptor> {
        self.read_class_desc()?.ok_or(DecodeError::BadTypeCode {
            context: DecodeContext::ClassDesc,
            code: tags::TC_NULL,
        })
    }

    fn read_new_class_desc(&mut self) -> Result<ClassDescriptor> {
        self.expect_tag(tags::TC_CLASSDESC)?;
        self.enter()?;
        let name = self.read_utf()?;
        let serial_uid = self.source.read_i64_be()?;

        // The handle is allocated *now*, before `info` is read, because a
        // field descriptor's class-name reference (or a nested object's
        // back-reference) may target this very descriptor.
        let placeholder = ClassDescriptor {
            name: name.clone(),
            serial_uid,
            info: ClassDescInfo {
                flags: ClassDescFlags::empty(),
                fields: Vec::new(),
                annotation: Vec::new(),
                super_class: None,
            },
        };
        let handle = self.handles.allocate(Content::ClassDesc(placeholder));

        let info = self.read_class_desc_info()?;
        self.exit();

        let descriptor = ClassDescriptor { name, serial_uid, info };
        self.handles.update(handle, Content::ClassDesc(descriptor.clone()));
        Ok(descriptor)
    }

    fn read_class_desc_info(&mut self) -> Result<ClassDescInfo> {
        let flags_byte = self.source.read_u8()?;
        let flags = ClassDescFlags::from_bits_truncate(flags_byte);
        if !flags.is_valid() {
            return Err(DecodeError::BadFlags(flags_byte));
        }

        let field_count = self.source.read_u16_be()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(self.read_field_desc()?);
        }

        let annotation = self.read_annotation()?;
        let super_class = self.read_class_desc()?.map(Box::new);

        Ok(ClassDescInfo { flags, fields, annotation, super_class })
    }

    fn read_field_desc(&mut self) -> Result<FieldDesc> {
        let code = self.source.read_u8()?;
        let field_type =
            FieldType::from_code(code as char).ok_or(DecodeError::BadFieldType(code))?;
        let name = self.read_utf()?;
        let class_name =
            if field_type.has_class_name() { Some(self.read_string_value()?) } else { None };
        Ok(FieldDesc { field_type, name, class_name })
    }

    /// The content-list-terminated-by-`TC_ENDBLOCKDATA` subgrammar shared
    /// by class annotations and object annotations.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_annotation(&mut self) -> Result<Vec<Content>> {
        let mut contents = Vec::new();
        loop {
            let tag = self.source.peek()?;
            if tag == tags::TC_ENDBLOCKDATA {
                self.source.read_u8()?;
                return Ok(contents);
            }
            contents.push(self.read_content()?);
        }
    }

    // ---- strings ----------------------------------------------------------

    /// Inline `utf`: a 16-bit length prefix followed by that many bytes,
    /// with no tag byte and no handle. Used for class and field *names*,
    /// which unlike `FieldDesc::class_name`/enum constants are never
    /// shared via `TC_REFERENCE`.
    pub fn read_utf(&mut self) -> Result<JavaString> {
        let len = self.source.read_u16_be()? as usize;
        let bytes = self.source.read(len)?;
        Ok(JavaString::new(bytes, StringWidth::Short))
    }

    pub fn read_long_utf(&mut self) -> Result<JavaString> {
        let len = self.bounded_len(self.source.read_i64_be()?)?;
        let bytes = self.source.read(len)?;
        Ok(JavaString::new(bytes, StringWidth::Long))
    }

    /// `TC_STRING`/`TC_LONGSTRING`: allocates a handle for the new string.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_new_string(&mut self, width: StringWidth) -> Result<JavaString> {
        match width {
            StringWidth::Short => self.expect_tag(tags::TC_STRING)?,
            StringWidth::Long => self.expect_tag(tags::TC_LONGSTRING)?,
        }
        let string = match width {
            StringWidth::Short => self.read_utf()?,
            StringWidth::Long => self.read_long_utf()?,
        };
        self.handles.allocate(Content::String(string.clone()));
        Ok(string)
    }

    /// The `newString` production: `TC_STRING`, `TC_LONGSTRING`, or
    /// `TC_REFERENCE` to a previously-read string. Used by
    /// `FieldDesc::class_name` and enum constants.
    fn read_string_value(&mut self) -> Result<JavaString> {
        let tag = self.source.peek()?;
        match tag {
            tags::TC_STRING => self.read_new_string(StringWidth::Short),
            tags::TC_LONGSTRING => self.read_new_string(StringWidth::Long),
            tags::TC_REFERENCE => {
                let (raw, content) = self.resolve_reference()?;
                content.as_string().cloned().ok_or(DecodeError::BadHandle(raw))
            }
            other => Err(DecodeError::BadTypeCode { context: DecodeContext::NewString, code: other }),
        }
    }

    // ---- objects ------------------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_new_object(&mut self) -> Result<Object> {
        self.expect_tag(tags::TC_OBJECT)?;
        self.enter()?;

        let description = self.read_class_desc()?;

        // Allocated before class data is read so that a field referencing
        // this object back (a common pattern for linked structures) sees
        // the same handle identity, per the reference-resolution rule.
        let placeholder = Object { description: description.clone(), class_data: Vec::new() };
        let handle = self.handles.allocate(Content::Object(placeholder));

        let class_data = match &description {
            Some(desc) => self.read_class_data_chain(desc)?,
            None => Vec::new(),
        };
        self.exit();

        let object = Object { description, class_data };
        self.handles.update(handle, Content::Object(object.clone()));
        Ok(object)
    }

    /// Walks the descriptor chain top-of-hierarchy first, producing one
    /// [`ClassData`] per level, per the state machine in the decoder's
    /// design notes.
    fn read_class_data_chain(&mut self, desc: &ClassDescriptor) -> Result<Vec<ClassData>> {
        let levels: Vec<&ClassDescriptor> = desc.chain().collect();
        let mut class_data = Vec::with_capacity(levels.len());
        for level in levels.into_iter().rev() {
            class_data.push(self.read_class_data_for_level(level)?);
        }
        Ok(class_data)
    }

    fn read_class_data_for_level(&mut self, desc: &ClassDescriptor) -> Result<ClassData> {
        let flags = desc.info.flags;
        if flags.contains(ClassDescFlags::SC_SERIALIZABLE) {
            let mut values = indexmap::IndexMap::with_capacity(desc.info.fields.len());
            for field in &desc.info.fields {
                let value = self.read_field_value(field)?;
                values.insert(field.name.to_string_lossy().into_owned(), value);
            }
            let annotation = if flags.contains(ClassDescFlags::SC_WRITE_METHOD) {
                self.read_annotation()?
            } else {
                Vec::new()
            };
            Ok(ClassData { values, annotation })
        } else if flags.contains(ClassDescFlags::SC_EXTERNALIZABLE) {
            if flags.contains(ClassDescFlags::SC_BLOCKDATA) {
                let annotation = self.read_annotation()?;
                Ok(ClassData { values: indexmap::IndexMap::new(), annotation })
            } else {
                Err(DecodeError::UnsupportedExternalV1)
            }
        } else {
            Err(DecodeError::BadFlags(flags.bits()))
        }
    }

    fn read_field_value(&mut self, field: &FieldDesc) -> Result<FieldValue> {
        match field.field_type {
            FieldType::Byte => Ok(FieldValue::Byte(self.source.read_i8()?)),
            FieldType::Char => Ok(FieldValue::Char(self.source.read_u16_be()?)),
            FieldType::Double => Ok(FieldValue::Double(self.source.read_f64_be()?)),
            FieldType::Float => Ok(FieldValue::Float(self.source.read_f32_be()?)),
            FieldType::Int => Ok(FieldValue::Int(self.source.read_i32_be()?)),
            FieldType::Long => Ok(FieldValue::Long(self.source.read_i64_be()?)),
            FieldType::Short => Ok(FieldValue::Short(self.source.read_i16_be()?)),
            FieldType::Boolean => Ok(FieldValue::Boolean(self.source.read_bool()?)),
            FieldType::Array => self.read_array_field(),
            FieldType::Object => self.read_object_field(),
        }
    }

    fn read_array_field(&mut self) -> Result<FieldValue> {
        let tag = self.source.peek()?;
        match tag {
            tags::TC_NULL => {
                self.source.read_u8()?;
                Ok(FieldValue::Null)
            }
            tags::TC_ARRAY => Ok(FieldValue::Array(Box::new(self.read_new_array()?))),
            tags::TC_REFERENCE => {
                let (raw, content) = self.resolve_reference()?;
                match content {
                    Content::Array(array) => Ok(FieldValue::Array(Box::new(array))),
                    _ => Err(DecodeError::BadHandle(raw)),
                }
            }
            other => {
                Err(DecodeError::BadTypeCode { context: DecodeContext::FieldValueArray, code: other })
            }
        }
    }

    fn read_object_field(&mut self) -> Result<FieldValue> {
        let tag = self.source.peek()?;
        match tag {
            tags::TC_NULL => {
                self.source.read_u8()?;
                Ok(FieldValue::Null)
            }
            tags::TC_OBJECT => Ok(FieldValue::Object(Box::new(self.read_new_object()?))),
            tags::TC_STRING => Ok(FieldValue::String(self.read_new_string(StringWidth::Short)?)),
            tags::TC_ENUM => Ok(FieldValue::Enum(Box::new(self.read_new_enum()?))),
            tags::TC_REFERENCE => {
                let (raw, content) = self.resolve_reference()?;
                match content {
                    Content::String(s) => Ok(FieldValue::String(s)),
                    Content::Object(o) => Ok(FieldValue::Object(Box::new(o))),
                    Content::Enum(e) => Ok(FieldValue::Enum(Box::new(e))),
                    _ => Err(DecodeError::BadHandle(raw)),
                }
            }
            other => {
                Err(DecodeError::BadTypeCode { context: DecodeContext::FieldValueObject, code: other })
            }
        }
    }

    // ---- arrays -------------------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_new_array(&mut self) -> Result<Array> {
        self.expect_tag(tags::TC_ARRAY)?;
        self.enter()?;

        let description = self.read_required_class_desc()?;
        let placeholder = Array { description: description.clone(), values: Vec::new() };
        let handle = self.handles.allocate(Content::Array(placeholder));

        let size = self.bounded_len(self.source.read_i32_be()? as i64)?;
        let elem_code = description
            .name
            .bytes
            .get(1)
            .copied()
            .ok_or(DecodeError::BadFieldType(0))?;
        let elem_type =
            FieldType::from_code(elem_code as char).ok_or(DecodeError::BadFieldType(elem_code))?;
        let elem_field = FieldDesc {
            field_type: elem_type,
            name: JavaString::new(Vec::new(), StringWidth::Short),
            class_name: None,
        };

        let mut values = Vec::with_capacity(size);
        for _ in 0..size {
            values.push(self.read_field_value(&elem_field)?);
        }
        self.exit();

        let array = Array { description, values };
        self.handles.update(handle, Content::Array(array.clone()));
        Ok(array)
    }

    // ---- enums ----------------------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_new_enum(&mut self) -> Result<EnumValue> {
        self.expect_tag(tags::TC_ENUM)?;
        self.enter()?;

        let description = self.read_required_class_desc()?;
        let placeholder = EnumValue {
            description: description.clone(),
            constant: JavaString::new(Vec::new(), StringWidth::Short),
        };
        let handle = self.handles.allocate(Content::Enum(placeholder));

        let constant = self.read_string_value()?;
        self.exit();

        let enum_value = EnumValue { description, constant };
        self.handles.update(handle, Content::Enum(enum_value.clone()));
        Ok(enum_value)
    }

    // ---- block data ---------------------------------------------------

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn read_block_data(&mut self, long: bool) -> Result<BlockData> {
        if long {
            self.expect_tag(tags::TC_BLOCKDATALONG)?;
            let len = self.bounded_len(self.source.read_i32_be()? as i64)?;
            Ok(BlockData::Long(self.source.read(len)?))
        } else {
            self.expect_tag(tags::TC_BLOCKDATA)?;
            let len = self.bounded_len(self.source.read_u8()? as i64)?;
            Ok(BlockData::Short(self.source.read(len)?))
        }
    }

    // ---- primitive pass-throughs (§6) ----------------------------------
    // Thin wrappers over the byte source, exposed so callers re-interpreting
    // opaque block-data payloads don't need their own primitive reader.

    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.source.read_bool()?)
    }
    pub fn read_byte(&mut self) -> Result<i8> {
        Ok(self.source.read_i8()?)
    }
    pub fn read_char(&mut self) -> Result<u16> {
        Ok(self.source.read_u16_be()?)
    }
    pub fn read_double(&mut self) -> Result<f64> {
        Ok(self.source.read_f64_be()?)
    }
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(self.source.read_f32_be()?)
    }
    pub fn read_int(&mut self) -> Result<i32> {
        Ok(self.source.read_i32_be()?)
    }
    pub fn read_long(&mut self) -> Result<i64> {
        Ok(self.source.read_i64_be()?)
    }
    pub fn read_short(&mut self) -> Result<i16> {
        Ok(self.source.read_i16_be()?)
    }
    pub fn read_unsigned_byte(&mut self) -> Result<u8> {
        Ok(self.source.read_u8()?)
    }
    pub fn read_unsigned_short(&mut self) -> Result<u16> {
        Ok(self.source.read_u16_be()?)
    }
}
