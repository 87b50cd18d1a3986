//! # Client cluster proxies
//!
//! Proxies address one cluster on one endpoint of a peer and send their
//! commands through a [`Controller`].

use bbqueue::ArrayLength;

use ilma_data::cluster_library::commands::{
    ConfigureReporting, DiscoverAttributes, ReadAttributes, ReportingConfiguration,
    WriteAttributeRecord, WriteAttributes,
};
use ilma_data::cluster_library::{
    AttributeDataType, AttributeValue, FrameControl, GeneralCommandIdentifier,
};
use ilma_data::clusters::ClusterCommand;
use ilma_data::pack::Pack;
use ilma_data::{AttributeId, ClusterId, EndpointId, NodeId};

use crate::callbacks::{ReportKey, ResponseCallbacks};
use crate::controller::Controller;
use crate::Error;

mod barrier_control;
mod level_control;
mod on_off;

pub use barrier_control::BarrierControlCluster;
pub use level_control::LevelControlCluster;
pub use on_off::OnOffCluster;

/// Cluster on an endpoint of a peer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClusterBase {
    node: NodeId,
    endpoint: u8,
    cluster: ClusterId,
}

impl ClusterBase {
    pub fn new(node: NodeId, endpoint: u8, cluster: ClusterId) -> Self {
        Self {
            node,
            endpoint,
            cluster,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn endpoint(&self) -> u8 {
        self.endpoint
    }

    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }

    /// Send a cluster specific command
    pub fn invoke<N, P>(
        &self,
        controller: &mut Controller<'_, N>,
        command: &P,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error>
    where
        N: ArrayLength<u8>,
        P: Pack<P, ilma_data::Error> + ClusterCommand,
    {
        if P::CLUSTER != self.cluster {
            return Err(Error::InvalidArgument);
        }
        controller.send_command(
            self.node,
            self.endpoint,
            self.cluster,
            FrameControl::local_to_server(),
            u32::from(P::COMMAND),
            |writer| writer.put_pack(command).map(|_| ()),
            callbacks,
        )
    }

    fn send_general<N, P>(
        &self,
        controller: &mut Controller<'_, N>,
        command: GeneralCommandIdentifier,
        payload: &P,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error>
    where
        N: ArrayLength<u8>,
        P: Pack<P, ilma_data::Error>,
    {
        controller.send_command(
            self.node,
            self.endpoint,
            self.cluster,
            FrameControl::global_to_server(),
            u32::from(u8::from(command)),
            |writer| writer.put_pack(payload).map(|_| ()),
            callbacks,
        )
    }

    pub fn read_attributes<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        attributes: &[AttributeId],
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        let command = ReadAttributes {
            attributes: attributes.iter().map(|a| u32::from(*a)).collect(),
        };
        self.send_general(
            controller,
            GeneralCommandIdentifier::ReadAttributes,
            &command,
            callbacks,
        )
    }

    pub fn write_attribute<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        attribute: AttributeId,
        value: AttributeValue,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        let command = WriteAttributes {
            attributes: vec![WriteAttributeRecord {
                identifier: u32::from(attribute),
                value,
            }],
        };
        self.send_general(
            controller,
            GeneralCommandIdentifier::WriteAttributes,
            &command,
            callbacks,
        )
    }

    /// Ask the server to report an attribute
    ///
    /// `reportable_change` is required for analog data types and must be
    /// absent for discrete ones.
    #[allow(clippy::too_many_arguments)]
    pub fn configure_reporting<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        attribute: AttributeId,
        data_type: AttributeDataType,
        minimum_interval: u16,
        maximum_interval: u16,
        reportable_change: Option<AttributeValue>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        if data_type.is_analog() != reportable_change.is_some() {
            return Err(Error::InvalidArgument);
        }
        let command = ConfigureReporting {
            records: vec![ReportingConfiguration {
                identifier: u32::from(attribute),
                data_type,
                minimum_interval,
                maximum_interval,
                reportable_change,
            }],
        };
        self.send_general(
            controller,
            GeneralCommandIdentifier::ConfigureReporting,
            &command,
            callbacks,
        )
    }

    pub fn discover_attributes<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        start: AttributeId,
        max_count: u8,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        let command = DiscoverAttributes {
            start: u32::from(start),
            max_count,
        };
        self.send_general(
            controller,
            GeneralCommandIdentifier::DiscoverAttributes,
            &command,
            callbacks,
        )
    }

    /// Register a callback for reports of an attribute, it stays registered
    /// until cancelled or the session is closed
    pub fn report_attribute<N, F>(
        &self,
        controller: &mut Controller<'_, N>,
        attribute: AttributeId,
        callback: F,
    ) -> ReportKey
    where
        N: ArrayLength<u8>,
        F: FnMut(&ReportKey, &AttributeValue) + 'static,
    {
        let key = ReportKey {
            node: self.node,
            endpoint: EndpointId::from(self.endpoint),
            cluster: self.cluster,
            attribute,
        };
        controller
            .callbacks_mut()
            .add_report_callback(key, Box::new(callback));
        key
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::queue;
    use bbqueue::{consts::U512, Consumer};

    /// Offset of the cluster library header in a queued frame
    pub(crate) const HEADER_OFFSET: usize = 8 + 11;

    pub(crate) fn next_frame(consumer: &mut Consumer<'_, U512>) -> Vec<u8> {
        let frame = queue::dequeue(consumer).unwrap().unwrap();
        frame[HEADER_OFFSET..].to_vec()
    }

    #[test]
    fn general_commands() {
        let tx_queue: bbqueue::BBBuffer<U512> = bbqueue::BBBuffer::new();
        let (tx_producer, mut tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let base = ClusterBase::new(5, 1, 0x0006);

        base.read_attributes(&mut controller, &[0x0000, 0x4000], ResponseCallbacks::logging())
            .unwrap();
        assert_eq!(
            next_frame(&mut tx_consumer),
            [
                0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // header
                0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00,
            ]
        );

        base.write_attribute(
            &mut controller,
            0x4001,
            AttributeValue::Unsigned16(300),
            ResponseCallbacks::logging(),
        )
        .unwrap();
        assert_eq!(
            next_frame(&mut tx_consumer),
            [0x00, 0x02, 0x02, 0x00, 0x00, 0x00, 0x01, 0x40, 0x00, 0x00, 0x21, 0x2c, 0x01]
        );

        base.discover_attributes(&mut controller, 0x0000, 0x10, ResponseCallbacks::logging())
            .unwrap();
        assert_eq!(
            next_frame(&mut tx_consumer),
            [0x00, 0x03, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10]
        );
        assert_eq!(controller.callbacks().pending(5), 3);
    }

    #[test]
    fn configure_reporting_checks_change() {
        let tx_queue: bbqueue::BBBuffer<U512> = bbqueue::BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let base = ClusterBase::new(5, 1, 0x0008);

        assert_eq!(
            base.configure_reporting(
                &mut controller,
                0x0000,
                AttributeDataType::Unsigned8,
                1,
                60,
                None,
                ResponseCallbacks::logging(),
            ),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            base.configure_reporting(
                &mut controller,
                0x0000,
                AttributeDataType::Boolean,
                1,
                60,
                Some(AttributeValue::Boolean(1)),
                ResponseCallbacks::logging(),
            ),
            Err(Error::InvalidArgument)
        );
        assert_eq!(controller.callbacks().pending(5), 0);
    }

    #[test]
    fn invoke_checks_cluster() {
        let tx_queue: bbqueue::BBBuffer<U512> = bbqueue::BBBuffer::new();
        let (tx_producer, _tx_consumer) = tx_queue.try_split().unwrap();
        let mut controller = Controller::new(tx_producer);
        let base = ClusterBase::new(5, 1, 0x0008);
        assert_eq!(
            base.invoke(
                &mut controller,
                &ilma_data::clusters::on_off::On,
                ResponseCallbacks::logging()
            ),
            Err(Error::InvalidArgument)
        );
    }
}
