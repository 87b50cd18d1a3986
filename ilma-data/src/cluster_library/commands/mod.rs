mod attributes;
mod default_response;
mod reporting;

use core::convert::TryFrom;

use crate::pack::Pack;
use crate::Error;

pub use attributes::{
    AttributeInformation, AttributeReport, AttributeStatus, DiscoverAttributes,
    DiscoverAttributesResponse, ReadAttributes, ReadAttributesResponse, ReportAttributes,
    WriteAttributeRecord, WriteAttributeStatus, WriteAttributes, WriteAttributesResponse,
};
pub use default_response::DefaultResponse;
pub use reporting::{
    ConfigureReporting, ConfigureReportingResponse, ReportingConfiguration, ReportingStatus,
};

extended_enum!(
    /// Cluster library general command identifiers
    GeneralCommandIdentifier, u8,
    ReadAttributes => 0x00,
    ReadAttributesResponse => 0x01,
    WriteAttributes => 0x02,
    WriteAttributesResponse => 0x04,
    ConfigureReporting => 0x06,
    ConfigureReportingResponse => 0x07,
    ReportAttributes => 0x0a,
    DefaultResponse => 0x0b,
    DiscoverAttributes => 0x0c,
    DiscoverAttributesResponse => 0x0d,
);

/// Cluster library general command
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ReadAttributes(ReadAttributes),
    ReadAttributesResponse(ReadAttributesResponse),
    WriteAttributes(WriteAttributes),
    WriteAttributesResponse(WriteAttributesResponse),
    ConfigureReporting(ConfigureReporting),
    ConfigureReportingResponse(ConfigureReportingResponse),
    ReportAttributes(ReportAttributes),
    DefaultResponse(DefaultResponse),
    DiscoverAttributes(DiscoverAttributes),
    DiscoverAttributesResponse(DiscoverAttributesResponse),
}

impl Command {
    pub fn identifier(&self) -> GeneralCommandIdentifier {
        match self {
            Command::ReadAttributes(_) => GeneralCommandIdentifier::ReadAttributes,
            Command::ReadAttributesResponse(_) => GeneralCommandIdentifier::ReadAttributesResponse,
            Command::WriteAttributes(_) => GeneralCommandIdentifier::WriteAttributes,
            Command::WriteAttributesResponse(_) => {
                GeneralCommandIdentifier::WriteAttributesResponse
            }
            Command::ConfigureReporting(_) => GeneralCommandIdentifier::ConfigureReporting,
            Command::ConfigureReportingResponse(_) => {
                GeneralCommandIdentifier::ConfigureReportingResponse
            }
            Command::ReportAttributes(_) => GeneralCommandIdentifier::ReportAttributes,
            Command::DefaultResponse(_) => GeneralCommandIdentifier::DefaultResponse,
            Command::DiscoverAttributes(_) => GeneralCommandIdentifier::DiscoverAttributes,
            Command::DiscoverAttributesResponse(_) => {
                GeneralCommandIdentifier::DiscoverAttributesResponse
            }
        }
    }

    pub fn pack(&self, data: &mut [u8]) -> Result<(usize, GeneralCommandIdentifier), Error> {
        let used = match self {
            Command::ReadAttributes(cmd) => cmd.pack(data)?,
            Command::ReadAttributesResponse(cmd) => cmd.pack(data)?,
            Command::WriteAttributes(cmd) => cmd.pack(data)?,
            Command::WriteAttributesResponse(cmd) => cmd.pack(data)?,
            Command::ConfigureReporting(cmd) => cmd.pack(data)?,
            Command::ConfigureReportingResponse(cmd) => cmd.pack(data)?,
            Command::ReportAttributes(cmd) => cmd.pack(data)?,
            Command::DefaultResponse(cmd) => cmd.pack(data)?,
            Command::DiscoverAttributes(cmd) => cmd.pack(data)?,
            Command::DiscoverAttributesResponse(cmd) => cmd.pack(data)?,
        };
        Ok((used, self.identifier()))
    }

    pub fn unpack(data: &[u8], command: GeneralCommandIdentifier) -> Result<(Self, usize), Error> {
        match command {
            GeneralCommandIdentifier::ReadAttributes => {
                let (cmd, used) = ReadAttributes::unpack(data)?;
                Ok((Command::ReadAttributes(cmd), used))
            }
            GeneralCommandIdentifier::ReadAttributesResponse => {
                let (cmd, used) = ReadAttributesResponse::unpack(data)?;
                Ok((Command::ReadAttributesResponse(cmd), used))
            }
            GeneralCommandIdentifier::WriteAttributes => {
                let (cmd, used) = WriteAttributes::unpack(data)?;
                Ok((Command::WriteAttributes(cmd), used))
            }
            GeneralCommandIdentifier::WriteAttributesResponse => {
                let (cmd, used) = WriteAttributesResponse::unpack(data)?;
                Ok((Command::WriteAttributesResponse(cmd), used))
            }
            GeneralCommandIdentifier::ConfigureReporting => {
                let (cmd, used) = ConfigureReporting::unpack(data)?;
                Ok((Command::ConfigureReporting(cmd), used))
            }
            GeneralCommandIdentifier::ConfigureReportingResponse => {
                let (cmd, used) = ConfigureReportingResponse::unpack(data)?;
                Ok((Command::ConfigureReportingResponse(cmd), used))
            }
            GeneralCommandIdentifier::ReportAttributes => {
                let (cmd, used) = ReportAttributes::unpack(data)?;
                Ok((Command::ReportAttributes(cmd), used))
            }
            GeneralCommandIdentifier::DefaultResponse => {
                let (cmd, used) = DefaultResponse::unpack(data)?;
                Ok((Command::DefaultResponse(cmd), used))
            }
            GeneralCommandIdentifier::DiscoverAttributes => {
                let (cmd, used) = DiscoverAttributes::unpack(data)?;
                Ok((Command::DiscoverAttributes(cmd), used))
            }
            GeneralCommandIdentifier::DiscoverAttributesResponse => {
                let (cmd, used) = DiscoverAttributesResponse::unpack(data)?;
                Ok((Command::DiscoverAttributesResponse(cmd), used))
            }
        }
    }

    /// Unpack a general command from its raw identifier
    pub fn unpack_raw(data: &[u8], command: u32) -> Result<(Self, usize), Error> {
        let command = u8::try_from(command).map_err(|_| Error::NotImplemented)?;
        let command =
            GeneralCommandIdentifier::try_from(command).map_err(|_| Error::NotImplemented)?;
        Self::unpack(data, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_library::ClusterLibraryStatus;

    #[test]
    fn unpack_default_response() {
        let (cmd, used) = Command::unpack_raw(&[0x00, 0x00], 0x0b).unwrap();
        assert_eq!(used, 2);
        assert_eq!(
            cmd,
            Command::DefaultResponse(DefaultResponse {
                command: 0x00,
                status: ClusterLibraryStatus::Success
            })
        );
        assert_eq!(
            Command::unpack_raw(&[0x00], 0x03),
            Err(Error::NotImplemented)
        );
        assert_eq!(
            Command::unpack_raw(&[0x00], 0x0100),
            Err(Error::NotImplemented)
        );
    }

    #[test]
    fn pack_reports_identifier() {
        let cmd = Command::ReadAttributes(ReadAttributes {
            attributes: vec![0x0000],
        });
        let mut data = [0u8; 4];
        assert_eq!(
            cmd.pack(&mut data),
            Ok((4, GeneralCommandIdentifier::ReadAttributes))
        );
    }
}
