//! Framed hand-off over single producer, single consumer byte queues
//!
//! Every frame is prefixed with its length as a little endian `u16`.

use core::convert::TryFrom;

use bbqueue::{ArrayLength, Consumer, Producer};
use byteorder::{ByteOrder, LittleEndian};

use crate::Error;

/// Size of the length prefix
pub const FRAME_HEADER_SIZE: usize = 2;

/// Push a frame made up of `parts` onto the queue
pub fn enqueue<N: ArrayLength<u8>>(
    queue: &mut Producer<'_, N>,
    parts: &[&[u8]],
) -> Result<(), Error> {
    let length: usize = parts.iter().map(|part| part.len()).sum();
    let length_field = u16::try_from(length).map_err(|_| Error::InvalidArgument)?;
    let grant_size = length + FRAME_HEADER_SIZE;
    match queue.grant_exact(grant_size) {
        Ok(mut grant) => {
            LittleEndian::write_u16(&mut grant[..FRAME_HEADER_SIZE], length_field);
            let mut offset = FRAME_HEADER_SIZE;
            for part in parts {
                grant[offset..offset + part.len()].copy_from_slice(part);
                offset += part.len();
            }
            grant.commit(grant_size);
            Ok(())
        }
        Err(_) => Err(Error::NotEnoughSpace),
    }
}

/// Pop the next frame from the queue, `None` when the queue is empty
pub fn dequeue<N: ArrayLength<u8>>(queue: &mut Consumer<'_, N>) -> Result<Option<Vec<u8>>, Error> {
    let grant = match queue.read() {
        Ok(grant) => grant,
        Err(_) => return Ok(None),
    };
    if grant.len() < FRAME_HEADER_SIZE {
        let size = grant.len();
        grant.release(size);
        return Err(Error::MalformedPacket);
    }
    let length = usize::from(LittleEndian::read_u16(&grant[..FRAME_HEADER_SIZE]));
    let frame_size = FRAME_HEADER_SIZE + length;
    if grant.len() < frame_size {
        let size = grant.len();
        grant.release(size);
        return Err(Error::MalformedPacket);
    }
    let frame = grant[FRAME_HEADER_SIZE..frame_size].to_vec();
    grant.release(frame_size);
    Ok(Some(frame))
}
