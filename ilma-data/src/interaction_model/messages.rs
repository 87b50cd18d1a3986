//! Invoke interaction messages

use core::convert::TryFrom;

use crate::common::ConcreteCommandPath;
use crate::error::Error;
use crate::interaction_model::Status;
use crate::tlv::{encode_to_vec, ContainerType, FromTlv, Tag, TlvReader, TlvValue, TlvWriter, ToTlv};

/// Revision written into every message
pub const INTERACTION_MODEL_REVISION: u8 = 1;

/// Upper bound for the encoded fields of a single command
pub const MAX_COMMAND_FIELDS_SIZE: usize = 2048;

const TAG_REVISION: Tag = Tag::Context(0xff);

/// Encoded empty structure, the fields of a command without arguments
pub const EMPTY_FIELDS: [u8; 2] = [0x15, 0x18];

fn put_command_path(
    writer: &mut TlvWriter<'_>,
    tag: Tag,
    path: &ConcreteCommandPath,
) -> Result<(), Error> {
    let marker = writer.start_container(tag, ContainerType::List)?;
    writer.put_u16(Tag::Context(0), path.endpoint)?;
    writer.put_u32(Tag::Context(1), u32::from(path.cluster))?;
    writer.put_u32(Tag::Context(2), u32::from(path.command))?;
    writer.end_container(marker)
}

fn get_command_path(reader: &mut TlvReader<'_>) -> Result<ConcreteCommandPath, Error> {
    let marker = reader.enter_container()?;
    let mut endpoint = None;
    let mut cluster = None;
    let mut command = None;
    while let Some(tag) = reader.next_member()? {
        match tag {
            Tag::Context(0) => endpoint = Some(reader.get_u16()?),
            Tag::Context(1) => cluster = Some(reader.get_u16()?),
            Tag::Context(2) => command = Some(reader.get_u16()?),
            _ => {}
        }
    }
    reader.exit_container(marker)?;
    Ok(ConcreteCommandPath {
        endpoint: endpoint.ok_or(Error::MissingField)?,
        cluster: cluster.ok_or(Error::MissingField)?,
        command: command.ok_or(Error::MissingField)?,
    })
}

/// A command and its fields
#[derive(Clone, Debug, PartialEq)]
pub struct CommandData {
    pub path: ConcreteCommandPath,
    /// Fields as an anonymous TLV structure
    pub fields: Vec<u8>,
}

impl CommandData {
    pub fn new(path: ConcreteCommandPath, fields: Vec<u8>) -> Self {
        Self { path, fields }
    }

    /// A command without arguments
    pub fn without_fields(path: ConcreteCommandPath) -> Self {
        Self::new(path, EMPTY_FIELDS.to_vec())
    }

    /// Reader positioned on the fields structure
    pub fn fields_reader(&self) -> Result<TlvReader<'_>, Error> {
        let mut reader = TlvReader::new(&self.fields);
        reader.next()?;
        Ok(reader)
    }
}

impl ToTlv for CommandData {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        put_command_path(writer, Tag::Context(0), &self.path)?;
        let (_, fields) = TlvValue::from_bytes(&self.fields)?;
        fields.encode(writer, Tag::Context(1))?;
        writer.end_container(marker)
    }
}

impl FromTlv for CommandData {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut path = None;
        let mut fields = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => path = Some(get_command_path(reader)?),
                Tag::Context(1) => {
                    let value = TlvValue::decode(reader)?;
                    fields = Some(encode_to_vec(&value, Tag::Anonymous, MAX_COMMAND_FIELDS_SIZE)?);
                }
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            path: path.ok_or(Error::MissingField)?,
            fields: fields.unwrap_or_else(|| EMPTY_FIELDS.to_vec()),
        })
    }
}

/// Status of an interaction, with an optional cluster specific status
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StatusIb {
    pub status: Status,
    pub cluster_status: Option<u8>,
}

impl ToTlv for StatusIb {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), u8::from(self.status))?;
        if let Some(cluster_status) = self.cluster_status {
            writer.put_u8(Tag::Context(1), cluster_status)?;
        }
        writer.end_container(marker)
    }
}

impl FromTlv for StatusIb {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut status = None;
        let mut cluster_status = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => status = Some(Status::try_from(reader.get_u8()?)?),
                Tag::Context(1) => cluster_status = Some(reader.get_u8()?),
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            status: status.ok_or(Error::MissingField)?,
            cluster_status,
        })
    }
}

/// Response to a single command
#[derive(Clone, Debug, PartialEq)]
pub enum InvokeResponse {
    /// The command produced a response command
    Command(CommandData),
    /// The command produced a status
    Status {
        path: ConcreteCommandPath,
        status: StatusIb,
    },
}

impl InvokeResponse {
    pub fn path(&self) -> &ConcreteCommandPath {
        match self {
            InvokeResponse::Command(data) => &data.path,
            InvokeResponse::Status { path, .. } => path,
        }
    }
}

impl ToTlv for InvokeResponse {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        match self {
            InvokeResponse::Command(data) => data.to_tlv(writer, Tag::Context(0))?,
            InvokeResponse::Status { path, status } => {
                let inner = writer.start_container(Tag::Context(1), ContainerType::Structure)?;
                put_command_path(writer, Tag::Context(0), path)?;
                status.to_tlv(writer, Tag::Context(1))?;
                writer.end_container(inner)?;
            }
        }
        writer.end_container(marker)
    }
}

impl FromTlv for InvokeResponse {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut response = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => {
                    response = Some(InvokeResponse::Command(CommandData::from_tlv(reader)?));
                }
                Tag::Context(1) => {
                    let inner = reader.enter_container()?;
                    let mut path = None;
                    let mut status = None;
                    while let Some(tag) = reader.next_member()? {
                        match tag {
                            Tag::Context(0) => path = Some(get_command_path(reader)?),
                            Tag::Context(1) => status = Some(StatusIb::from_tlv(reader)?),
                            _ => {}
                        }
                    }
                    reader.exit_container(inner)?;
                    response = Some(InvokeResponse::Status {
                        path: path.ok_or(Error::MissingField)?,
                        status: status.ok_or(Error::MissingField)?,
                    });
                }
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        response.ok_or(Error::MissingField)
    }
}

/// Request to invoke one or more commands
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeRequestMessage {
    pub suppress_response: bool,
    pub timed_request: bool,
    pub invoke_requests: Vec<CommandData>,
}

impl ToTlv for InvokeRequestMessage {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_bool(Tag::Context(0), self.suppress_response)?;
        writer.put_bool(Tag::Context(1), self.timed_request)?;
        let requests = writer.start_container(Tag::Context(2), ContainerType::Array)?;
        for request in self.invoke_requests.iter() {
            request.to_tlv(writer, Tag::Anonymous)?;
        }
        writer.end_container(requests)?;
        writer.put_u8(TAG_REVISION, INTERACTION_MODEL_REVISION)?;
        writer.end_container(marker)
    }
}

impl FromTlv for InvokeRequestMessage {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut suppress_response = false;
        let mut timed_request = false;
        let mut invoke_requests = None;
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => suppress_response = reader.get_bool()?,
                Tag::Context(1) => timed_request = reader.get_bool()?,
                Tag::Context(2) => {
                    let requests = reader.enter_container()?;
                    let mut items = Vec::new();
                    while reader.next_member()?.is_some() {
                        items.push(CommandData::from_tlv(reader)?);
                    }
                    reader.exit_container(requests)?;
                    invoke_requests = Some(items);
                }
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            suppress_response,
            timed_request,
            invoke_requests: invoke_requests.ok_or(Error::MissingField)?,
        })
    }
}

/// Responses to an invoke request
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeResponseMessage {
    pub suppress_response: bool,
    pub invoke_responses: Vec<InvokeResponse>,
}

impl ToTlv for InvokeResponseMessage {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_bool(Tag::Context(0), self.suppress_response)?;
        let responses = writer.start_container(Tag::Context(1), ContainerType::Array)?;
        for response in self.invoke_responses.iter() {
            response.to_tlv(writer, Tag::Anonymous)?;
        }
        writer.end_container(responses)?;
        writer.put_u8(TAG_REVISION, INTERACTION_MODEL_REVISION)?;
        writer.end_container(marker)
    }
}

impl FromTlv for InvokeResponseMessage {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut suppress_response = false;
        let mut invoke_responses = Vec::new();
        while let Some(tag) = reader.next_member()? {
            match tag {
                Tag::Context(0) => suppress_response = reader.get_bool()?,
                Tag::Context(1) => {
                    let responses = reader.enter_container()?;
                    while reader.next_member()?.is_some() {
                        invoke_responses.push(InvokeResponse::from_tlv(reader)?);
                    }
                    reader.exit_container(responses)?;
                }
                _ => {}
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            suppress_response,
            invoke_responses,
        })
    }
}

/// Stand-alone status for an interaction that failed as a whole
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StatusResponseMessage {
    pub status: Status,
}

impl ToTlv for StatusResponseMessage {
    fn to_tlv(&self, writer: &mut TlvWriter<'_>, tag: Tag) -> Result<(), Error> {
        let marker = writer.start_container(tag, ContainerType::Structure)?;
        writer.put_u8(Tag::Context(0), u8::from(self.status))?;
        writer.put_u8(TAG_REVISION, INTERACTION_MODEL_REVISION)?;
        writer.end_container(marker)
    }
}

impl FromTlv for StatusResponseMessage {
    fn from_tlv(reader: &mut TlvReader<'_>) -> Result<Self, Error> {
        let marker = reader.enter_container()?;
        let mut status = None;
        while let Some(tag) = reader.next_member()? {
            if tag == Tag::Context(0) {
                status = Some(Status::try_from(reader.get_u8()?)?);
            }
        }
        reader.exit_container(marker)?;
        Ok(Self {
            status: status.ok_or(Error::MissingField)?,
        })
    }
}
