//! Schema registry for `jobs.proto`
//!
//! The registry holds the file descriptor of the jobs schema and an index of
//! its message descriptors. It is built once per process, on first use, by
//! [`init_once`]. Every message constructor calls it, so callers never need
//! to initialize anything themselves.

use std::collections::HashMap;
use std::sync::OnceLock;

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};

use crate::repeated::FieldType;

/// File name of the jobs schema
pub const JOBS_FILE: &str = "jobs.proto";

/// Protobuf package of the jobs schema
pub const JOBS_PACKAGE: &str = "jobs.v1";

static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// Returns the process-wide registry, building it on the first call
///
/// Safe to call from any number of threads; all callers observe the same
/// instance.
pub fn init_once() -> &'static SchemaRegistry {
    REGISTRY.get_or_init(|| {
        let registry = SchemaRegistry::from_files(vec![jobs_file_descriptor()]);
        tracing::debug!(
            "Schema registry initialized with {} message type(s)",
            registry.messages.len()
        );
        registry
    })
}

/// Descriptor of a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Name as written in the `.proto` file
    pub name: String,
    /// lowerCamelCase name used by proto3 JSON
    pub json_name: String,
    /// Field number (the wire tag)
    pub number: u32,
    pub field_type: FieldType,
    /// `true` for `repeated` fields
    pub repeated: bool,
}

/// Descriptor of a message type
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    /// Fully-qualified name, e.g. `jobs.v1.Pipelines`
    pub full_name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    /// Simple name without the package prefix
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }

    /// Looks a field up by its proto name or its JSON name
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name == name || field.json_name == name)
    }

    /// Looks a field up by its wire tag
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// Registered file descriptors and the message types they define
#[derive(Debug)]
pub struct SchemaRegistry {
    files: Vec<FileDescriptorProto>,
    messages: HashMap<String, MessageDescriptor>,
}

impl SchemaRegistry {
    fn from_files(files: Vec<FileDescriptorProto>) -> Self {
        let mut messages = HashMap::new();

        for file in &files {
            let package = file.package();
            for message in &file.message_type {
                let full_name = if package.is_empty() {
                    message.name().to_string()
                } else {
                    format!("{}.{}", package, message.name())
                };

                let fields = message.field.iter().map(field_descriptor).collect();
                messages.insert(full_name.clone(), MessageDescriptor { full_name, fields });
            }
        }

        Self { files, messages }
    }

    /// Message descriptor by fully-qualified name
    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name)
    }

    /// All registered message descriptors, in no particular order
    pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
        self.messages.values()
    }

    /// File descriptor by file name
    pub fn file(&self, name: &str) -> Option<&FileDescriptorProto> {
        self.files.iter().find(|file| file.name() == name)
    }

    /// Encodes every registered file as a `google.protobuf.FileDescriptorSet`
    pub fn encode_file_descriptor_set(&self) -> Vec<u8> {
        FileDescriptorSet {
            file: self.files.clone(),
        }
        .encode_to_vec()
    }
}

fn field_descriptor(field: &FieldDescriptorProto) -> FieldDescriptor {
    FieldDescriptor {
        name: field.name().to_string(),
        json_name: field.json_name().to_string(),
        number: field.number() as u32,
        field_type: field.r#type().into(),
        repeated: field.label() == Label::Repeated,
    }
}

/// Descriptor of `jobs.proto` as compiled by protoc
fn jobs_file_descriptor() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(JOBS_FILE.to_string()),
        package: Some(JOBS_PACKAGE.to_string()),
        message_type: vec![DescriptorProto {
            // request to pause/resume/list/destroy
            name: Some("Pipelines".to_string()),
            field: vec![FieldDescriptorProto {
                name: Some("pipelines".to_string()),
                number: Some(1),
                label: Some(Label::Repeated as i32),
                r#type: Some(Type::String as i32),
                json_name: Some("pipelines".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}
