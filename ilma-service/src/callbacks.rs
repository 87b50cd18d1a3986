//! Correlation of responses and reports with the callbacks waiting for them
//!
//! Response callbacks are keyed by peer and sequence number and are removed
//! before they run, so each fires at most once. Report callbacks are keyed by
//! peer and attribute path and stay registered until cancelled.

use std::collections::BTreeMap;

use ilma_data::cluster_library::{AttributeValue, ClusterLibraryHeader, ClusterLibraryStatus};
use ilma_data::{AttributeId, ClusterId, EndpointId, NodeId};

use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseKey {
    pub node: NodeId,
    pub sequence: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportKey {
    pub node: NodeId,
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
}

/// Successful response handed to the success callback
#[derive(Debug)]
pub struct Response<'a> {
    pub node: NodeId,
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub header: &'a ClusterLibraryHeader,
    /// Command payload following the header
    pub payload: &'a [u8],
}

pub type SuccessCallback = Box<dyn FnOnce(&Response<'_>)>;
pub type FailureCallback = Box<dyn FnOnce(ClusterLibraryStatus)>;
pub type ReportCallback = Box<dyn FnMut(&ReportKey, &AttributeValue)>;

/// Callbacks of a pending request, exactly one of them runs
pub struct ResponseCallbacks {
    pub on_success: SuccessCallback,
    pub on_failure: FailureCallback,
}

impl ResponseCallbacks {
    pub fn new<S, F>(on_success: S, on_failure: F) -> Self
    where
        S: FnOnce(&Response<'_>) + 'static,
        F: FnOnce(ClusterLibraryStatus) + 'static,
    {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        }
    }

    /// Callbacks that only log the outcome
    pub fn logging() -> Self {
        Self::new(
            |response| {
                log::info!(
                    "> Success from {:016x}, sequence {}",
                    response.node,
                    response.header.transaction_sequence
                )
            },
            |status| log::warn!("> Failure, {:?}", status),
        )
    }
}

/// Table of pending requests and report subscriptions
#[derive(Default)]
pub struct DeviceCallbacks {
    responses: BTreeMap<ResponseKey, ResponseCallbacks>,
    reports: BTreeMap<ReportKey, ReportCallback>,
}

impl DeviceCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register callbacks for a request, a stale entry with the same key is
    /// dropped without running
    pub fn add_response_callback(&mut self, key: ResponseKey, callbacks: ResponseCallbacks) {
        if self.responses.insert(key, callbacks).is_some() {
            log::warn!(
                "Dropped stale callback for {:016x}, sequence {}",
                key.node,
                key.sequence
            );
        }
    }

    /// Remove the callbacks for a response
    pub fn take_response_callback(&mut self, key: &ResponseKey) -> Result<ResponseCallbacks, Error> {
        self.responses.remove(key).ok_or(Error::KeyNotFound)
    }

    pub fn cancel_response_callback(&mut self, key: &ResponseKey) -> Result<(), Error> {
        self.take_response_callback(key).map(|_| ())
    }

    pub fn is_pending(&self, key: &ResponseKey) -> bool {
        self.responses.contains_key(key)
    }

    /// Number of pending requests towards a peer
    pub fn pending(&self, node: NodeId) -> usize {
        self.responses.keys().filter(|key| key.node == node).count()
    }

    /// Register a report callback, replacing any earlier one
    pub fn add_report_callback(&mut self, key: ReportKey, callback: ReportCallback) {
        if self.reports.insert(key, callback).is_some() {
            log::debug!("Replaced report callback for {:?}", key);
        }
    }

    pub fn report_callback(&mut self, key: &ReportKey) -> Result<&mut ReportCallback, Error> {
        self.reports.get_mut(key).ok_or(Error::KeyNotFound)
    }

    pub fn cancel_report_callback(&mut self, key: &ReportKey) -> Result<(), Error> {
        self.reports.remove(key).map(|_| ()).ok_or(Error::KeyNotFound)
    }

    /// Drop everything registered for a peer, returns the number of entries
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let responses = self.responses.len();
        let reports = self.reports.len();
        self.responses.retain(|key, _| key.node != node);
        self.reports.retain(|key, _| key.node != node);
        (responses - self.responses.len()) + (reports - self.reports.len())
    }
}
