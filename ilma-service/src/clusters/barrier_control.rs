use bbqueue::ArrayLength;

use ilma_data::cluster_library::{AttributeDataType, AttributeValue};
use ilma_data::clusters::barrier_control::{
    GoToPercent, Stop, ATTRIBUTE_CAPABILITIES, ATTRIBUTE_MOVING_STATE, ATTRIBUTE_POSITION,
    ATTRIBUTE_SAFETY_STATUS, CLUSTER,
};
use ilma_data::NodeId;

use super::ClusterBase;
use crate::callbacks::{ReportKey, ResponseCallbacks};
use crate::controller::Controller;
use crate::Error;

/// Barrier control cluster of a peer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BarrierControlCluster {
    base: ClusterBase,
}

impl BarrierControlCluster {
    pub fn new(node: NodeId, endpoint: u8) -> Self {
        Self {
            base: ClusterBase::new(node, endpoint, CLUSTER),
        }
    }

    pub fn base(&self) -> &ClusterBase {
        &self.base
    }

    pub fn go_to_percent<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        percent_open: u8,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        if percent_open > 100 {
            return Err(Error::InvalidArgument);
        }
        self.base
            .invoke(controller, &GoToPercent { percent_open }, callbacks)
    }

    pub fn stop<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.invoke(controller, &Stop, callbacks)
    }

    /// Read moving state, safety status, capabilities and position
    pub fn read_state<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.read_attributes(
            controller,
            &[
                ATTRIBUTE_MOVING_STATE,
                ATTRIBUTE_SAFETY_STATUS,
                ATTRIBUTE_CAPABILITIES,
                ATTRIBUTE_POSITION,
            ],
            callbacks,
        )
    }

    pub fn read_position<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base
            .read_attributes(controller, &[ATTRIBUTE_POSITION], callbacks)
    }

    pub fn configure_position<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        minimum_interval: u16,
        maximum_interval: u16,
        change: u8,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.configure_reporting(
            controller,
            ATTRIBUTE_POSITION,
            AttributeDataType::Unsigned8,
            minimum_interval,
            maximum_interval,
            Some(AttributeValue::Unsigned8(change)),
            callbacks,
        )
    }

    pub fn report_position<N, F>(&self, controller: &mut Controller<'_, N>, callback: F) -> ReportKey
    where
        N: ArrayLength<u8>,
        F: FnMut(&ReportKey, &AttributeValue) + 'static,
    {
        self.base
            .report_attribute(controller, ATTRIBUTE_POSITION, callback)
    }
}
