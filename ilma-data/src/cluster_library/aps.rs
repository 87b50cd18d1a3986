//! Application support frame preceding every cluster library frame

use byteorder::{ByteOrder, LittleEndian};

use crate::common::ClusterId;
use crate::error::Error;
use crate::pack::Pack;

const APS_FRAME_SIZE: usize = 11;
const APS_FRAME_CONTROL: u8 = 0x00;

/// Source endpoint used by clients
pub const CLIENT_SOURCE_ENDPOINT: u8 = 1;

/// Application support frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApsFrame {
    pub cluster: ClusterId,
    pub source_endpoint: u8,
    pub destination_endpoint: u8,
    pub options: u16,
    pub group: u16,
    pub sequence: u8,
    pub radius: u8,
}

impl ApsFrame {
    /// Unicast frame from the client endpoint
    pub fn unicast(cluster: ClusterId, destination_endpoint: u8) -> Self {
        Self {
            cluster,
            source_endpoint: CLIENT_SOURCE_ENDPOINT,
            destination_endpoint,
            options: 0,
            group: 0,
            sequence: 0,
            radius: 0,
        }
    }
}

impl Pack<ApsFrame, Error> for ApsFrame {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if data.len() < APS_FRAME_SIZE {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = APS_FRAME_CONTROL;
        LittleEndian::write_u16(&mut data[1..3], self.cluster);
        data[3] = self.source_endpoint;
        data[4] = self.destination_endpoint;
        LittleEndian::write_u16(&mut data[5..7], self.options);
        LittleEndian::write_u16(&mut data[7..9], self.group);
        data[9] = self.sequence;
        data[10] = self.radius;
        Ok(APS_FRAME_SIZE)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        if data.len() < APS_FRAME_SIZE {
            return Err(Error::WrongNumberOfBytes);
        }
        if data[0] != APS_FRAME_CONTROL {
            return Err(Error::UnknownFrameType);
        }
        Ok((
            Self {
                cluster: LittleEndian::read_u16(&data[1..3]),
                source_endpoint: data[3],
                destination_endpoint: data[4],
                options: LittleEndian::read_u16(&data[5..7]),
                group: LittleEndian::read_u16(&data[7..9]),
                sequence: data[9],
                radius: data[10],
            },
            APS_FRAME_SIZE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let frame = ApsFrame::unicast(0x0006, 3);
        let mut data = [0u8; 16];
        let used = frame.pack(&mut data).unwrap();
        assert_eq!(
            data[..used],
            [0x00, 0x06, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        let (unpacked, used) = ApsFrame::unpack(&data[..used]).unwrap();
        assert_eq!(used, 11);
        assert_eq!(unpacked, frame);
        assert_eq!(
            ApsFrame::unpack(&data[..10]),
            Err(Error::WrongNumberOfBytes)
        );
        data[0] = 0x01;
        assert_eq!(ApsFrame::unpack(&data), Err(Error::UnknownFrameType));
    }
}
