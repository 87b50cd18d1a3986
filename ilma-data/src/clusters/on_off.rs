//! On/Off cluster

use crate::common::{AttributeId, ClusterId};

pub const CLUSTER: ClusterId = 0x0006;

/// Boolean on/off state
pub const ATTRIBUTE_ON_OFF: AttributeId = 0x0000;

empty_command!(
    /// Turn the device off
    Off,
    CLUSTER,
    0x00
);
empty_command!(
    /// Turn the device on
    On,
    CLUSTER,
    0x01
);
empty_command!(
    /// Toggle the on/off state
    Toggle,
    CLUSTER,
    0x02
);
