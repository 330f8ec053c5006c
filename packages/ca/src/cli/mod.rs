//! Command-line front end
//!
//! A local transport for the lifecycle service: builds the configured
//! backend, runs one operation with an anonymous request context and prints
//! the result as JSON.

pub mod commands;

use std::path::Path;
use std::process::ExitCode;

use secrecy::SecretString;
use serde::Serialize;
use serde_json::json;

use cabinet_common::{Error, ErrorClass, ErrorKind, RequestContext, Result, ResultExt};

use crate::config::CabinetConfig;
use crate::secrets;
use crate::service::CaLifecycleService;
use crate::types::CaImport;
pub use commands::{Cli, Commands, CreateArgs, KeyTypeArg};

/// Process exit status for an error class
#[must_use]
pub fn exit_status(class: ErrorClass) -> u8 {
    match class {
        ErrorClass::Server => 1,
        ErrorClass::Client => 2,
        ErrorClass::NotFound => 3,
        ErrorClass::Conflict => 4,
    }
}

/// Run a parsed command line to completion
pub async fn run(cli: Cli) -> ExitCode {
    let json = cli.json;
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    json!({
                        "success": false,
                        "kind": format!("{:?}", e.kind()),
                        "error": format!("{e:#}"),
                    })
                );
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(e.class()))
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = CabinetConfig::resolve(cli.config.as_deref())?;
    let backend = secrets::connect(&config).await?;
    let service = CaLifecycleService::new(backend);
    let ctx = RequestContext::anonymous();
    process_command(&service, &ctx, cli.command, cli.json).await
}

/// Dispatch one command against the service
///
/// # Errors
///
/// Whatever the service operation reports, plus `InvalidParameters` for
/// unreadable import files.
pub async fn process_command(
    service: &CaLifecycleService,
    ctx: &RequestContext,
    command: Commands,
    use_json: bool,
) -> Result<()> {
    match command {
        Commands::List => print_value(&service.list_cas(ctx).await?, use_json),
        Commands::Get { name } => print_value(&service.get_ca_certificate(ctx, &name).await?, use_json),
        Commands::Info { name } => print_value(&service.get_ca_info(ctx, &name).await?, use_json),
        Commands::Create { name, spec } => {
            let spec = spec.into_spec(&name);
            service.create_ca(ctx, &name, &spec).await?;
            print_done("create", &name, use_json);
            Ok(())
        }
        Commands::Import { name, crt, key, ttl } => {
            let bundle = CaImport {
                crt: read_pem(&crt).await?,
                private_key: SecretString::from(read_pem(&key).await?),
                ttl,
            };
            service.import_ca(ctx, &name, &bundle).await?;
            print_done("import", &name, use_json);
            Ok(())
        }
        Commands::Delete { name } => {
            service.delete_ca(ctx, &name).await?;
            print_done("delete", &name, use_json);
            Ok(())
        }
        Commands::Health => {
            service.health(ctx).await?;
            if use_json {
                println!("{}", json!({ "success": true, "backend": service.backend_name() }));
            } else {
                println!("{} backend is healthy", service.backend_name());
            }
            Ok(())
        }
    }
}

async fn read_pem(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))
        .with_context(|| format!("reading {}", path.display()))
}

fn print_value<T: Serialize>(value: &T, use_json: bool) -> Result<()> {
    let rendered = if use_json {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    let rendered = rendered.map_err(|e| Error::with_source(ErrorKind::Unknown, e))?;
    println!("{rendered}");
    Ok(())
}

fn print_done(operation: &str, name: &str, use_json: bool) {
    if use_json {
        println!("{}", json!({ "success": true, "operation": operation, "ca_name": name }));
    } else {
        println!("{operation}: {name} ok");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn exit_statuses_are_distinct_per_class() {
        assert_eq!(exit_status(ErrorKind::Unknown.class()), 1);
        assert_eq!(exit_status(ErrorKind::InvalidName.class()), 2);
        assert_eq!(exit_status(ErrorKind::NotFound.class()), 3);
        assert_eq!(exit_status(ErrorKind::KeyCertMismatch.class()), 4);
    }

    #[test]
    fn create_flags_build_spec() {
        let cli = Cli::try_parse_from([
            "cabinet",
            "--json",
            "create",
            "root-a",
            "--key-type",
            "ecdsa",
            "--key-bits",
            "384",
            "--organization",
            "Cabinet",
        ])
        .unwrap();
        assert!(cli.json);

        let Commands::Create { name, spec } = cli.command else {
            panic!("expected create");
        };
        let spec = spec.into_spec(&name);
        assert_eq!(spec.common_name, "root-a");
        assert_eq!(spec.key_type, Some(crate::types::KeyType::Ecdsa));
        assert_eq!(spec.key_bits, 384);
        assert_eq!(spec.organization, "Cabinet");
        assert!(spec.country.is_empty());
    }
}
