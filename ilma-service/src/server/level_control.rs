//! Level Control cluster server

use ilma_data::cluster_library::AttributeValue;
use ilma_data::clusters::level_control::{
    MoveToLevel, Stop, ATTRIBUTE_CURRENT_LEVEL, CLUSTER, MAX_LEVEL,
};
use ilma_data::clusters::ClusterCommand;
use ilma_data::interaction_model::Status;

use crate::schema::{AttributeMetadata, Schema};
use crate::server::Node;
use crate::Error;

pub fn register(schema: &mut Schema<Node>) -> Result<(), Error> {
    schema.add_cluster(CLUSTER)?;
    schema.add_attribute(
        CLUSTER,
        AttributeMetadata::new(ATTRIBUTE_CURRENT_LEVEL, AttributeValue::Unsigned8(0)),
    )?;
    schema.add_command::<MoveToLevel, _>(
        CLUSTER,
        MoveToLevel::COMMAND,
        |node, handler, path, request| {
            if request.level > MAX_LEVEL {
                handler.add_status(path, Status::ConstraintError);
                return true;
            }
            let attribute = path.attribute(ATTRIBUTE_CURRENT_LEVEL);
            match node
                .attributes
                .set(&attribute, AttributeValue::Unsigned8(request.level))
            {
                Ok(_) => {
                    log::info!(
                        "Endpoint {} level {} in {} ds",
                        path.endpoint,
                        request.level,
                        request.transition_time
                    );
                    handler.add_status(path, Status::Success);
                }
                Err(error) => {
                    handler.add_status(path, error.status().unwrap_or(Status::Failure));
                }
            }
            true
        },
    )?;
    // Transitions complete immediately, there is nothing to stop
    schema.add_command::<Stop, _>(CLUSTER, Stop::COMMAND, |_, handler, path, _| {
        handler.add_status(path, Status::Success);
        true
    })?;
    Ok(())
}
