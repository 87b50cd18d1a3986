//! On/Off cluster server

use ilma_data::cluster_library::AttributeValue;
use ilma_data::clusters::on_off::{Off, On, Toggle, ATTRIBUTE_ON_OFF, CLUSTER};
use ilma_data::clusters::ClusterCommand;
use ilma_data::interaction_model::Status;
use ilma_data::ConcreteCommandPath;

use crate::command_handler::CommandHandler;
use crate::schema::{AttributeMetadata, Schema};
use crate::server::Node;
use crate::Error;

pub fn register(schema: &mut Schema<Node>) -> Result<(), Error> {
    schema.add_cluster(CLUSTER)?;
    schema.add_attribute(
        CLUSTER,
        AttributeMetadata::new(ATTRIBUTE_ON_OFF, AttributeValue::Boolean(0)),
    )?;
    schema.add_command::<Off, _>(CLUSTER, Off::COMMAND, |node, handler, path, _| {
        update(node, handler, path, |_| false)
    })?;
    schema.add_command::<On, _>(CLUSTER, On::COMMAND, |node, handler, path, _| {
        update(node, handler, path, |_| true)
    })?;
    schema.add_command::<Toggle, _>(CLUSTER, Toggle::COMMAND, |node, handler, path, _| {
        update(node, handler, path, |on| !on)
    })?;
    Ok(())
}

fn update<F>(node: &mut Node, handler: &mut CommandHandler, path: &ConcreteCommandPath, next: F) -> bool
where
    F: Fn(bool) -> bool,
{
    let attribute = path.attribute(ATTRIBUTE_ON_OFF);
    let on = match node.attributes.read(&attribute) {
        Ok(AttributeValue::Boolean(value)) => *value == 0x01,
        Ok(_) => return false,
        Err(_) => {
            handler.add_status(path, Status::UnsupportedEndpoint);
            return true;
        }
    };
    let on = next(on);
    match node.attributes.set(&attribute, AttributeValue::Boolean(on as u8)) {
        Ok(_) => {
            log::info!("Endpoint {} is {}", path.endpoint, if on { "on" } else { "off" });
            handler.add_status(path, Status::Success);
            true
        }
        Err(_) => false,
    }
}
