//! Descriptor tree handed over by the IDL front-end
//!
//! Every record here is plain data. Type references use fully qualified names with
//! a leading dot (`.library.v1.Book`), the same way the front-end reports them.

use crate::annotations::Annotations;
use serde::{Deserialize, Serialize};

/// One parsed schema file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Path relative to the include root (e.g. "library/v1/models/lib.schema")
    pub path: String,
    /// Declared package (e.g. "library.v1"); empty for the root package
    #[serde(default)]
    pub package: String,
    /// Paths of imported files
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub services: Vec<ServiceDef>,
    #[serde(default)]
    pub messages: Vec<MessageDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /// File-level annotations
    #[serde(default)]
    pub annotations: Annotations,
    /// Whether this invocation emits output for the file. Stamped by `SchemaSet`.
    #[serde(skip)]
    pub generate: bool,
}

impl SchemaFile {
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    pub fn with_service(mut self, service: ServiceDef) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_message(mut self, message: MessageDef) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_enum(mut self, enum_def: EnumDef) -> Self {
        self.enums.push(enum_def);
        self
    }

    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Fully qualified prefix for names declared in this file (".library.v1")
    pub fn scope(&self) -> String {
        if self.package.is_empty() {
            String::new()
        } else {
            format!(".{}", self.package)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDef {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ServiceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    /// Fully qualified request type
    pub input_type: String,
    /// Fully qualified response type
    pub output_type: String,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub comment: Option<String>,
}

impl MethodDef {
    pub fn new(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            ..Self::default()
        }
    }

    pub fn server_streaming(mut self) -> Self {
        self.server_streaming = true;
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub nested_messages: Vec<MessageDef>,
    #[serde(default)]
    pub nested_enums: Vec<EnumDef>,
    /// Synthetic key/value message generated for a `map<K, V>` field
    #[serde(default)]
    pub map_entry: bool,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub comment: Option<String>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested(mut self, message: MessageDef) -> Self {
        self.nested_messages.push(message);
        self
    }

    pub fn with_nested_enum(mut self, enum_def: EnumDef) -> Self {
        self.nested_enums.push(enum_def);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Mark as a map entry with the conventional `key`/`value` fields
    pub fn map_entry(name: impl Into<String>, key: FieldKind, value: FieldKind) -> Self {
        Self {
            name: name.into(),
            fields: vec![FieldDef::new("key", 1, key), FieldDef::new("value", 2, value)],
            map_entry: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub number: i32,
    #[serde(default)]
    pub label: FieldLabel,
    pub kind: FieldKind,
    /// JSON name reported by the front-end; defaults to lower camel case when absent
    #[serde(default)]
    pub json_name: Option<String>,
    #[serde(default)]
    pub oneof_index: Option<i32>,
    #[serde(default)]
    pub proto3_optional: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, number: i32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            label: FieldLabel::Optional,
            kind,
            json_name: None,
            oneof_index: None,
            proto3_optional: false,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.label = FieldLabel::Repeated;
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLabel {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar(ScalarType),
    /// Fully qualified message name
    Message(String),
    /// Fully qualified enum name
    Enum(String),
}

impl FieldKind {
    pub fn message(name: impl Into<String>) -> Self {
        Self::Message(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Referenced type name, if this is not a scalar
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Message(name) | Self::Enum(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// 64-bit integers travel as strings in the JSON mapping
    pub fn is_64_bit(self) -> bool {
        matches!(
            self,
            Self::Int64 | Self::Uint64 | Self::Sint64 | Self::Fixed64 | Self::Sfixed64
        )
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub comment: Option<String>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDef {
            name: name.into(),
            number,
        });
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}
