mod config;
mod log_provider;

use std::process;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use ilma_data::interaction_model::{CommandData, InvokeRequestMessage, InvokeResponse};
use ilma_data::json::CustomArgument;
use ilma_data::tlv::TlvValue;
use ilma_data::{parse_unsigned, ConcreteCommandPath};
use ilma_service::server::{DiagnosticLogsServer, Node};
use ilma_service::InteractionModelEngine;

use config::{read_config, Config};
use log_provider::FileLogProvider;

fn encode(matches: &ArgMatches<'_>) -> Result<(), String> {
    let json = matches.value_of("json").unwrap_or("{}");
    let argument =
        CustomArgument::parse(json).map_err(|e| format!("Failed to encode argument, {:?}", e))?;
    println!("{}", hex::encode(argument.as_bytes()));
    Ok(())
}

fn decode(matches: &ArgMatches<'_>) -> Result<(), String> {
    let text = matches.value_of("hex").unwrap_or_default();
    let data = hex::decode(text.trim()).map_err(|e| format!("Invalid hex, {}", e))?;
    let (_, value) =
        TlvValue::from_bytes(&data).map_err(|e| format!("Failed to decode TLV, {:?}", e))?;
    println!("{}", value);
    Ok(())
}

fn parse_number<T: std::convert::TryFrom<u64>>(
    matches: &ArgMatches<'_>,
    name: &str,
) -> Result<T, String> {
    let text = matches.value_of(name).unwrap_or_default();
    parse_unsigned(text)
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| format!("Invalid {} \"{}\"", name, text))
}

fn build_node(config: &Config) -> Result<InteractionModelEngine<Node>, String> {
    let schema = Node::schema().map_err(|e| format!("Failed to build schema, {:?}", e))?;
    let mut diagnostic_logs = DiagnosticLogsServer::new(config.log_content_size);
    for provider in config.log_providers.iter() {
        log::info!(
            "Logs of endpoint {} from {}",
            provider.endpoint,
            provider.path
        );
        diagnostic_logs.set_log_provider_delegate(
            provider.endpoint,
            Box::new(FileLogProvider::new(&provider.path)),
        );
    }
    let node = Node::new(&schema, &config.endpoints, diagnostic_logs);
    Ok(InteractionModelEngine::new(schema, node))
}

fn invoke(matches: &ArgMatches<'_>, config: &Config) -> Result<(), String> {
    let path = ConcreteCommandPath::new(
        parse_number(matches, "endpoint")?,
        parse_number(matches, "cluster")?,
        parse_number(matches, "command")?,
    );
    let json = matches.value_of("fields").unwrap_or("{}");
    let fields =
        CustomArgument::parse(json).map_err(|e| format!("Failed to encode fields, {:?}", e))?;

    let mut engine = build_node(config)?;
    let request = InvokeRequestMessage {
        suppress_response: false,
        timed_request: false,
        invoke_requests: vec![CommandData::new(path, fields.as_bytes().to_vec())],
    };
    let response = engine.invoke(&request);
    for item in response.invoke_responses.iter() {
        let path = item.path();
        match item {
            InvokeResponse::Command(data) => {
                let (_, value) = TlvValue::from_bytes(&data.fields)
                    .map_err(|e| format!("Failed to decode response, {:?}", e))?;
                println!(
                    "{:04x}/{:04x}/{:04x} {}",
                    path.endpoint, path.cluster, path.command, value
                );
            }
            InvokeResponse::Status { status, .. } => {
                println!(
                    "{:04x}/{:04x}/{:04x} {:?}",
                    path.endpoint, path.cluster, path.command, status.status
                );
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = App::new("Ilma host companion")
        .about("Encode, decode and invoke interaction model commands")
        .setting(AppSettings::DisableVersion)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("Path to configuration file")
                .use_delimiter(false)
                .required(false)
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("encode")
                .about("Encode a JSON argument as TLV")
                .arg(
                    Arg::with_name("json")
                        .help("JSON document, e.g. {\"0\": \"u:1\"}")
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("decode")
                .about("Print a hex encoded TLV element")
                .arg(Arg::with_name("hex").help("Hex encoded TLV").required(true)),
        )
        .subcommand(
            SubCommand::with_name("invoke")
                .about("Invoke a command on an in-process node")
                .arg(Arg::with_name("endpoint").required(true))
                .arg(Arg::with_name("cluster").required(true))
                .arg(Arg::with_name("command").required(true))
                .arg(
                    Arg::with_name("fields")
                        .help("Command fields as JSON")
                        .required(false),
                ),
        )
        .get_matches();

    let config = match matches.value_of("config") {
        Some(file_path) => read_config(file_path).unwrap_or_else(|| {
            log::warn!("Using default configuration");
            Config::default()
        }),
        None => Config::default(),
    };

    let result = match matches.subcommand() {
        ("encode", Some(sub)) => encode(sub),
        ("decode", Some(sub)) => decode(sub),
        ("invoke", Some(sub)) => invoke(sub, &config),
        _ => Ok(()),
    };
    if let Err(message) = result {
        eprintln!("{}", message);
        process::exit(1);
    }
}
