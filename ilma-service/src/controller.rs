//! Client side of the cluster library
//!
//! The controller frames commands, queues them for transmission and matches
//! the frames received later with the callbacks registered when sending.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use bbqueue::{ArrayLength, Consumer, Producer};
use byteorder::{ByteOrder, LittleEndian};

use ilma_data::buffer::BufferWriter;
use ilma_data::cluster_library::commands::{
    Command, DefaultResponse, GeneralCommandIdentifier, ReportAttributes,
};
use ilma_data::cluster_library::{
    ApsFrame, ClusterLibraryHeader, ClusterLibraryStatus, Direction, FrameControl, FrameType,
};
use ilma_data::pack::Pack;
use ilma_data::{ClusterId, EndpointId, NodeId};

use crate::callbacks::{DeviceCallbacks, ReportKey, Response, ResponseCallbacks, ResponseKey};
use crate::queue;
use crate::Error;

/// Largest frame the controller sends
pub const MAX_FRAME_SIZE: usize = 1024;

/// Size of the peer identifier in front of every queued frame
const NODE_ID_SIZE: usize = 8;

/// Interval between queue polls while waiting for a response
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Receives the outcome of frames no request is waiting for
pub trait StatusDelegate {
    fn on_status(&mut self, node: NodeId, header: &ClusterLibraryHeader, status: ClusterLibraryStatus);
}

pub struct Controller<'a, N: ArrayLength<u8>> {
    tx_queue: Producer<'a, N>,
    callbacks: DeviceCallbacks,
    sequences: BTreeMap<NodeId, u8>,
    status_delegate: Option<Box<dyn StatusDelegate>>,
}

impl<'a, N: ArrayLength<u8>> Controller<'a, N> {
    pub fn new(tx_queue: Producer<'a, N>) -> Self {
        Self {
            tx_queue,
            callbacks: DeviceCallbacks::new(),
            sequences: BTreeMap::new(),
            status_delegate: None,
        }
    }

    pub fn callbacks(&self) -> &DeviceCallbacks {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut DeviceCallbacks {
        &mut self.callbacks
    }

    pub fn set_status_delegate(&mut self, delegate: Option<Box<dyn StatusDelegate>>) {
        self.status_delegate = delegate;
    }

    /// Next sequence number towards a peer, skipping numbers still pending
    fn next_sequence(&mut self, node: NodeId) -> Result<u8, Error> {
        let mut sequence = self.sequences.get(&node).copied().unwrap_or(0);
        for _ in 0..=u8::MAX {
            sequence = sequence.wrapping_add(1);
            if !self.callbacks.is_pending(&ResponseKey { node, sequence }) {
                self.sequences.insert(node, sequence);
                return Ok(sequence);
            }
        }
        Err(Error::Busy)
    }

    /// Frame and queue a command, returns the sequence number used
    ///
    /// `encode` writes the command payload after the header. The callbacks
    /// are registered once the frame is queued.
    #[allow(clippy::too_many_arguments)]
    pub fn send_command<F>(
        &mut self,
        node: NodeId,
        endpoint: u8,
        cluster: ClusterId,
        control: FrameControl,
        command: u32,
        encode: F,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error>
    where
        F: FnOnce(&mut BufferWriter) -> Result<(), ilma_data::Error>,
    {
        let sequence = self.next_sequence(node)?;
        let aps = ApsFrame {
            sequence,
            ..ApsFrame::unicast(cluster, endpoint)
        };
        let header = ClusterLibraryHeader {
            control,
            manufacturer: None,
            transaction_sequence: sequence,
            command,
        };
        let mut writer = BufferWriter::new(MAX_FRAME_SIZE);
        writer.put_pack(&aps)?.put_pack(&header)?;
        encode(&mut writer)?;
        let frame = writer.finalize()?;

        let mut node_id = [0u8; NODE_ID_SIZE];
        LittleEndian::write_u64(&mut node_id, node);
        match queue::enqueue(&mut self.tx_queue, &[&node_id, &frame]) {
            Ok(()) => {
                log::info!(
                    "< Queued command {:04x}:{:02x} to {:016x}, sequence {}",
                    cluster,
                    command,
                    node,
                    sequence
                );
            }
            Err(error) => {
                log::error!("< Failed to queue command, {:?}", error);
                return Err(error);
            }
        }
        self.callbacks
            .add_response_callback(ResponseKey { node, sequence }, callbacks);
        Ok(sequence)
    }

    /// Handle a frame received from a peer
    pub fn on_message_received(&mut self, node: NodeId, data: &[u8]) -> Result<(), Error> {
        let (aps, used) = ApsFrame::unpack(data)?;
        let (header, header_size) = ClusterLibraryHeader::unpack(&data[used..])?;
        let payload = &data[used + header_size..];
        let endpoint = EndpointId::from(aps.source_endpoint);

        if header.control.frame_type == FrameType::Global
            && header.command == u32::from(u8::from(GeneralCommandIdentifier::ReportAttributes))
        {
            return self.handle_report(node, endpoint, aps.cluster, payload);
        }

        let status = response_status(&header, payload);
        let key = ResponseKey {
            node,
            sequence: header.transaction_sequence,
        };
        match self.callbacks.take_response_callback(&key) {
            Ok(callbacks) => {
                log::info!(
                    "> Response {:04x}:{:02x} from {:016x}, sequence {}, {:?}",
                    aps.cluster,
                    header.command,
                    node,
                    header.transaction_sequence,
                    status
                );
                if status == ClusterLibraryStatus::Success {
                    let response = Response {
                        node,
                        endpoint,
                        cluster: aps.cluster,
                        header: &header,
                        payload,
                    };
                    (callbacks.on_success)(&response);
                } else {
                    (callbacks.on_failure)(status);
                }
            }
            Err(_) => match self.status_delegate.as_mut() {
                Some(delegate) => delegate.on_status(node, &header, status),
                None => {
                    log::warn!(
                        "> Unmatched frame from {:016x}, sequence {}, {:?}",
                        node,
                        header.transaction_sequence,
                        status
                    );
                }
            },
        }
        Ok(())
    }

    fn handle_report(
        &mut self,
        node: NodeId,
        endpoint: EndpointId,
        cluster: ClusterId,
        payload: &[u8],
    ) -> Result<(), Error> {
        let (report, _) = ReportAttributes::unpack(payload)?;
        for record in report.attributes.iter() {
            let key = ReportKey {
                node,
                endpoint,
                cluster,
                attribute: record.identifier,
            };
            match self.callbacks.report_callback(&key) {
                Ok(callback) => callback(&key, &record.value),
                Err(_) => {
                    log::info!(
                        "> Report {:04x}:{:04x} from {:016x}, {}",
                        cluster,
                        record.identifier,
                        node,
                        record.value
                    );
                }
            }
        }
        Ok(())
    }

    /// Handle every frame waiting in `rx`, returns the number handled
    ///
    /// Each frame starts with the identifier of the sending peer. Frames
    /// which cannot be parsed are logged and dropped.
    pub fn process_incoming<M: ArrayLength<u8>>(
        &mut self,
        rx: &mut Consumer<'_, M>,
    ) -> Result<usize, Error> {
        let mut count = 0;
        while let Some(frame) = queue::dequeue(rx)? {
            count += 1;
            if frame.len() < NODE_ID_SIZE {
                log::warn!("> Frame without peer identifier");
                continue;
            }
            let node = LittleEndian::read_u64(&frame[..NODE_ID_SIZE]);
            if let Err(error) = self.on_message_received(node, &frame[NODE_ID_SIZE..]) {
                log::warn!("> Dropped frame from {:016x}, {:?}", node, error);
            }
        }
        Ok(count)
    }

    /// Receive until the request is answered or the time runs out
    ///
    /// On timeout the registration is cancelled, so a late response never
    /// reaches the callbacks.
    pub fn wait_for_response<M: ArrayLength<u8>>(
        &mut self,
        rx: &mut Consumer<'_, M>,
        node: NodeId,
        sequence: u8,
        timeout: Duration,
    ) -> Result<(), Error> {
        let key = ResponseKey { node, sequence };
        let deadline = Instant::now() + timeout;
        loop {
            self.process_incoming(rx)?;
            if !self.callbacks.is_pending(&key) {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                self.callbacks.cancel_response_callback(&key)?;
                log::warn!("No response from {:016x}, sequence {}", node, sequence);
                return Err(Error::Timeout);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Forget a peer, pending callbacks are dropped without running
    pub fn close_session(&mut self, node: NodeId) {
        let cancelled = self.callbacks.cancel_node(node);
        self.sequences.remove(&node);
        log::info!("Closed session to {:016x}, {} callbacks cancelled", node, cancelled);
    }
}

/// Outcome carried by a frame from a server
fn response_status(header: &ClusterLibraryHeader, payload: &[u8]) -> ClusterLibraryStatus {
    if header.control.frame_type != FrameType::Global
        || header.control.direction != Direction::ToClient
    {
        return ClusterLibraryStatus::Success;
    }
    match Command::unpack_raw(payload, header.command) {
        Ok((Command::DefaultResponse(DefaultResponse { status, .. }), _)) => status,
        Ok((Command::ReadAttributesResponse(response), _)) => response
            .failure()
            .unwrap_or(ClusterLibraryStatus::Success),
        Ok((Command::WriteAttributesResponse(response), _)) => response
            .failure()
            .unwrap_or(ClusterLibraryStatus::Success),
        Ok((Command::ConfigureReportingResponse(response), _)) => response
            .failure()
            .unwrap_or(ClusterLibraryStatus::Success),
        Ok(_) => ClusterLibraryStatus::Success,
        Err(error) => {
            log::warn!("> Malformed response {:02x}, {:?}", header.command, error);
            ClusterLibraryStatus::MalformedCommand
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bbqueue::{consts::U512, BBBuffer};
    use ilma_data::cluster_library::commands::{AttributeReport, WriteAttributeStatus, WriteAttributesResponse};
    use ilma_data::cluster_library::AttributeValue;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Frame sent by a server on endpoint 1
    pub(crate) fn server_frame(
        node: NodeId,
        cluster: ClusterId,
        frame_type: FrameType,
        sequence: u8,
        command: u8,
        payload: &[u8],
    ) -> Vec<u8> {
        let aps = ApsFrame {
            cluster,
            source_endpoint: 1,
            destination_endpoint: 1,
            options: 0,
            group: 0,
            sequence,
            radius: 0,
        };
        let header = ClusterLibraryHeader {
            control: FrameControl {
                frame_type,
                manufacturer_specific: false,
                direction: Direction::ToClient,
                disable_default_response: true,
            },
            manufacturer: None,
            transaction_sequence: sequence,
            command: u32::from(command),
        };
        let mut writer = BufferWriter::new(MAX_FRAME_SIZE);
        writer.put64(node);
        writer.put_pack(&aps).unwrap().put_pack(&header).unwrap();
        writer.put_bytes(payload);
        writer.finalize().unwrap()
    }

    fn default_response(node: NodeId, sequence: u8, status: ClusterLibraryStatus) -> Vec<u8> {
        server_frame(
            node,
            0x0006,
            FrameType::Global,
            sequence,
            0x0b,
            &[0x01, u8::from(status)],
        )
    }

    #[derive(Default)]
    struct Outcome {
        successes: Cell<u32>,
        failures: RefCell<Vec<ClusterLibraryStatus>>,
    }

    fn recording(outcome: &Rc<Outcome>) -> ResponseCallbacks {
        let on_success = outcome.clone();
        let on_failure = outcome.clone();
        ResponseCallbacks::new(
            move |_| on_success.successes.set(on_success.successes.get() + 1),
            move |status| on_failure.failures.borrow_mut().push(status),
        )
    }

    fn send_on(
        controller: &mut Controller<'_, U512>,
        node: NodeId,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        controller.send_command(
            node,
            1,
            0x0006,
            FrameControl::local_to_server(),
            0x01,
            |_| Ok(()),
            callbacks,
        )
    }

    struct Recorder(Rc<RefCell<Vec<(NodeId, u8, ClusterLibraryStatus)>>>);

    impl StatusDelegate for Recorder {
        fn on_status(
            &mut self,
            node: NodeId,
            header: &ClusterLibraryHeader,
            status: ClusterLibraryStatus,
        ) {
            self.0
                .borrow_mut()
                .push((node, header.transaction_sequence, status));
        }
    }

    #[test]
    fn command_frame() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, mut tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);

        let sequence = send_on(&mut controller, 5, ResponseCallbacks::logging()).unwrap();
        assert_eq!(sequence, 1);
        let frame = queue::dequeue(&mut tx_consumer).unwrap().unwrap();
        assert_eq!(
            frame,
            [
                0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // peer
                0x00, 0x06, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, // aps
                0x01, 0x01, 0x01, // header
            ]
        );
        assert!(controller.callbacks().is_pending(&ResponseKey {
            node: 5,
            sequence: 1
        }));
    }

    #[test]
    fn response_delivered_once() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let rx_queue: BBBuffer<U512> = BBBuffer::new();
        let (mut rx_producer, mut rx_consumer) = rx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let outcome = Rc::new(Outcome::default());
        let unmatched = Rc::new(RefCell::new(Vec::new()));
        controller.set_status_delegate(Some(Box::new(Recorder(unmatched.clone()))));

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let frame = default_response(5, sequence, ClusterLibraryStatus::Success);
        queue::enqueue(&mut rx_producer, &[&frame]).unwrap();
        queue::enqueue(&mut rx_producer, &[&frame]).unwrap();
        assert_eq!(controller.process_incoming(&mut rx_consumer), Ok(2));

        assert_eq!(outcome.successes.get(), 1);
        assert!(outcome.failures.borrow().is_empty());
        assert_eq!(
            *unmatched.borrow(),
            vec![(5, sequence, ClusterLibraryStatus::Success)]
        );
        assert_eq!(controller.callbacks().pending(5), 0);
    }

    #[test]
    fn response_from_other_peer_is_not_matched() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let outcome = Rc::new(Outcome::default());

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let frame = default_response(6, sequence, ClusterLibraryStatus::Success);
        controller.on_message_received(6, &frame[8..]).unwrap();
        assert_eq!(outcome.successes.get(), 0);
        assert_eq!(controller.callbacks().pending(5), 1);
    }

    #[test]
    fn failure_statuses() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let outcome = Rc::new(Outcome::default());

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let frame = default_response(5, sequence, ClusterLibraryStatus::UnsupportedClusterCommand);
        controller.on_message_received(5, &frame[8..]).unwrap();

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let mut payload = [0u8; 8];
        let used = WriteAttributesResponse {
            attributes: vec![WriteAttributeStatus {
                status: ClusterLibraryStatus::ReadOnly,
                identifier: Some(0x0000),
            }],
        }
        .pack(&mut payload)
        .unwrap();
        let frame = server_frame(5, 0x0006, FrameType::Global, sequence, 0x04, &payload[..used]);
        controller.on_message_received(5, &frame[8..]).unwrap();

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let frame = server_frame(5, 0x0006, FrameType::Global, sequence, 0x0b, &[0x01]);
        controller.on_message_received(5, &frame[8..]).unwrap();

        assert_eq!(outcome.successes.get(), 0);
        assert_eq!(
            *outcome.failures.borrow(),
            vec![
                ClusterLibraryStatus::UnsupportedClusterCommand,
                ClusterLibraryStatus::ReadOnly,
                ClusterLibraryStatus::MalformedCommand,
            ]
        );
    }

    #[test]
    fn malformed_frame() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        assert_eq!(
            controller.on_message_received(5, &[0x00, 0x06]),
            Err(Error::DataError(ilma_data::Error::WrongNumberOfBytes))
        );
    }

    #[test]
    fn reports_reach_subscriber() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let values = Rc::new(RefCell::new(Vec::new()));
        let key = ReportKey {
            node: 5,
            endpoint: 1,
            cluster: 0x0006,
            attribute: 0x0000,
        };
        let recorded = values.clone();
        controller.callbacks_mut().add_report_callback(
            key,
            Box::new(move |_, value| recorded.borrow_mut().push(value.clone())),
        );

        let mut payload = [0u8; 8];
        for state in [true, false].iter() {
            let used = ReportAttributes {
                attributes: vec![AttributeReport {
                    identifier: 0x0000,
                    value: AttributeValue::Boolean(*state as u8),
                }],
            }
            .pack(&mut payload)
            .unwrap();
            let frame = server_frame(5, 0x0006, FrameType::Global, 0x20, 0x0a, &payload[..used]);
            controller.on_message_received(5, &frame[8..]).unwrap();
        }
        assert_eq!(
            *values.borrow(),
            vec![AttributeValue::Boolean(1), AttributeValue::Boolean(0)]
        );
    }

    #[test]
    fn sequence_skips_pending() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, mut tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);

        controller.callbacks_mut().add_response_callback(
            ResponseKey {
                node: 5,
                sequence: 2,
            },
            ResponseCallbacks::logging(),
        );
        assert_eq!(send_on(&mut controller, 5, ResponseCallbacks::logging()), Ok(1));
        assert_eq!(send_on(&mut controller, 5, ResponseCallbacks::logging()), Ok(3));
        // Every peer has its own sequence
        assert_eq!(send_on(&mut controller, 6, ResponseCallbacks::logging()), Ok(1));
        while let Ok(Some(_)) = queue::dequeue(&mut tx_consumer) {}

        for sequence in 0..=u8::MAX {
            controller
                .callbacks_mut()
                .add_response_callback(ResponseKey { node: 7, sequence }, ResponseCallbacks::logging());
        }
        assert_eq!(
            send_on(&mut controller, 7, ResponseCallbacks::logging()),
            Err(Error::Busy)
        );
    }

    #[test]
    fn full_queue_registers_nothing() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let mut result = Ok(0);
        for _ in 0..64 {
            result = send_on(&mut controller, 5, ResponseCallbacks::logging());
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(Error::NotEnoughSpace));
        assert!(controller.callbacks().pending(5) < 64);
    }

    #[test]
    fn close_session_drops_callbacks() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let outcome = Rc::new(Outcome::default());

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        controller.close_session(5);
        assert_eq!(controller.callbacks().pending(5), 0);
        let frame = default_response(5, sequence, ClusterLibraryStatus::Success);
        controller.on_message_received(5, &frame[8..]).unwrap();
        assert_eq!(outcome.successes.get(), 0);
        assert!(outcome.failures.borrow().is_empty());
        assert_eq!(send_on(&mut controller, 5, ResponseCallbacks::logging()), Ok(1));
    }

    #[test]
    fn wait_for_response() {
        let tx_queue: BBBuffer<U512> = BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let rx_queue: BBBuffer<U512> = BBBuffer::new();
        let (mut rx_producer, mut rx_consumer) = rx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let outcome = Rc::new(Outcome::default());

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        let frame = default_response(5, sequence, ClusterLibraryStatus::Success);
        queue::enqueue(&mut rx_producer, &[&frame]).unwrap();
        assert_eq!(
            controller.wait_for_response(&mut rx_consumer, 5, sequence, Duration::from_millis(50)),
            Ok(())
        );
        assert_eq!(outcome.successes.get(), 1);

        let sequence = send_on(&mut controller, 5, recording(&outcome)).unwrap();
        assert_eq!(
            controller.wait_for_response(&mut rx_consumer, 5, sequence, Duration::from_millis(20)),
            Err(Error::Timeout)
        );
        // A late response is not delivered
        let frame = default_response(5, sequence, ClusterLibraryStatus::Success);
        queue::enqueue(&mut rx_producer, &[&frame]).unwrap();
        assert_eq!(controller.process_incoming(&mut rx_consumer), Ok(1));
        assert_eq!(outcome.successes.get(), 1);
        assert!(outcome.failures.borrow().is_empty());
    }
}
