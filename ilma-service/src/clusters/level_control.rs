use bbqueue::ArrayLength;

use ilma_data::cluster_library::{AttributeDataType, AttributeValue};
use ilma_data::clusters::level_control::{MoveToLevel, Stop, ATTRIBUTE_CURRENT_LEVEL, CLUSTER};
use ilma_data::NodeId;

use super::ClusterBase;
use crate::callbacks::{ReportKey, ResponseCallbacks};
use crate::controller::Controller;
use crate::Error;

/// Level control cluster of a peer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LevelControlCluster {
    base: ClusterBase,
}

impl LevelControlCluster {
    pub fn new(node: NodeId, endpoint: u8) -> Self {
        Self {
            base: ClusterBase::new(node, endpoint, CLUSTER),
        }
    }

    pub fn base(&self) -> &ClusterBase {
        &self.base
    }

    /// Move to `level` over `transition_time` tenths of a second
    pub fn move_to_level<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        level: u8,
        transition_time: u16,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        let command = MoveToLevel {
            level,
            transition_time,
            ..MoveToLevel::default()
        };
        self.base.invoke(controller, &command, callbacks)
    }

    pub fn stop<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.invoke(controller, &Stop, callbacks)
    }

    pub fn read_current_level<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base
            .read_attributes(controller, &[ATTRIBUTE_CURRENT_LEVEL], callbacks)
    }

    pub fn configure_current_level<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        minimum_interval: u16,
        maximum_interval: u16,
        change: u8,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.configure_reporting(
            controller,
            ATTRIBUTE_CURRENT_LEVEL,
            AttributeDataType::Unsigned8,
            minimum_interval,
            maximum_interval,
            Some(AttributeValue::Unsigned8(change)),
            callbacks,
        )
    }

    pub fn report_current_level<N, F>(
        &self,
        controller: &mut Controller<'_, N>,
        callback: F,
    ) -> ReportKey
    where
        N: ArrayLength<u8>,
        F: FnMut(&ReportKey, &AttributeValue) + 'static,
    {
        self.base
            .report_attribute(controller, ATTRIBUTE_CURRENT_LEVEL, callback)
    }
}
