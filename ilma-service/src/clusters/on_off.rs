use bbqueue::ArrayLength;

use ilma_data::cluster_library::{AttributeDataType, AttributeValue};
use ilma_data::clusters::on_off::{Off, On, Toggle, ATTRIBUTE_ON_OFF, CLUSTER};

use super::ClusterBase;
use crate::callbacks::{ReportKey, ResponseCallbacks};
use crate::controller::Controller;
use crate::Error;

/// On/Off cluster of a peer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OnOffCluster {
    base: ClusterBase,
}

impl OnOffCluster {
    pub fn new(node: ilma_data::NodeId, endpoint: u8) -> Self {
        Self {
            base: ClusterBase::new(node, endpoint, CLUSTER),
        }
    }

    pub fn base(&self) -> &ClusterBase {
        &self.base
    }

    pub fn off<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.invoke(controller, &Off, callbacks)
    }

    pub fn on<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.invoke(controller, &On, callbacks)
    }

    pub fn toggle<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.invoke(controller, &Toggle, callbacks)
    }

    pub fn read_on_off<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base
            .read_attributes(controller, &[ATTRIBUTE_ON_OFF], callbacks)
    }

    pub fn configure_on_off<N: ArrayLength<u8>>(
        &self,
        controller: &mut Controller<'_, N>,
        minimum_interval: u16,
        maximum_interval: u16,
        callbacks: ResponseCallbacks,
    ) -> Result<u8, Error> {
        self.base.configure_reporting(
            controller,
            ATTRIBUTE_ON_OFF,
            AttributeDataType::Boolean,
            minimum_interval,
            maximum_interval,
            None,
            callbacks,
        )
    }

    pub fn report_on_off<N, F>(&self, controller: &mut Controller<'_, N>, callback: F) -> ReportKey
    where
        N: ArrayLength<u8>,
        F: FnMut(&ReportKey, &AttributeValue) + 'static,
    {
        self.base
            .report_attribute(controller, ATTRIBUTE_ON_OFF, callback)
    }
}
