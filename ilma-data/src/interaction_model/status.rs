extended_enum!(
    /// Interaction model status codes
    Status, u8,
    /// Operation was successful.
    Success => 0x00,
    /// Operation was not successful.
    Failure => 0x01,
    /// Subscription ID is not active.
    InvalidSubscription => 0x7d,
    /// The sender of the action or command does not have authorization or access.
    UnsupportedAccess => 0x7e,
    /// The endpoint indicated is unsupported on the node.
    UnsupportedEndpoint => 0x7f,
    /// The action is malformed, has missing fields, or fields with invalid values.
    InvalidAction => 0x80,
    /// The command is not supported on the cluster.
    UnsupportedCommand => 0x81,
    /// The command has invalid data fields.
    InvalidCommand => 0x85,
    /// The attribute is not supported on the cluster.
    UnsupportedAttribute => 0x86,
    /// Out of range error or set to a reserved value.
    ConstraintError => 0x87,
    /// Attempt to write a read-only attribute.
    UnsupportedWrite => 0x88,
    /// An action or operation failed due to insufficient available resources.
    ResourceExhausted => 0x89,
    /// The indicated data field or entry could not be found.
    NotFound => 0x8b,
    /// Reports cannot be issued for this attribute.
    UnreportableAttribute => 0x8c,
    /// The data type indicated is undefined or invalid for the indicated data field.
    InvalidDataType => 0x8d,
    /// Attempt to read a write-only attribute.
    UnsupportedRead => 0x8f,
    /// Cluster instance data version did not match request path.
    DataVersionMismatch => 0x92,
    /// The transaction was aborted due to time being exceeded.
    Timeout => 0x94,
    /// The receiver is busy processing another action.
    Busy => 0x9c,
    /// The cluster indicated is not supported on the endpoint.
    UnsupportedCluster => 0xc3,
    /// Used by proxies to indicate that there is no upstream subscription.
    NoUpstreamSubscription => 0xc5,
    /// A signed action must be preceded by a successful timed request action.
    NeedsTimedInteraction => 0xc6,
    /// The event indicated is unsupported on the cluster.
    UnsupportedEvent => 0xc7,
    /// The receiver has insufficient resources to support the specified number of paths.
    PathsExhausted => 0xc8,
    /// A request with timed flag set was not preceded by a timed request.
    TimedRequestMismatch => 0xc9,
    /// A request requires an armed fail-safe context.
    FailsafeRequired => 0xca,
);

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}
