// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use notus_client::config::LogFormat;
use notus_client::link::GraphqlRequest;
use notus_client::{logging, NotusClient, Operation};
use serde_json::Value;
use tracing::error;

const USAGE: &str = "usage: notus <command> [args]

commands:
  whoami                                 print the cached current user
  token                                  print the session token
  sign-in <email> <password>             sign in and cache the profile
  confirm-user <one-time-key> <password> confirm an account
  confirm-dapp-user <request-key>        confirm a dapp user request
  dapp-user <id>                         fetch a dapp user
  graphql <query>                        send a query to the GraphQL endpoint";

#[derive(Debug, PartialEq)]
enum Command {
    Local(Operation),
    Remote(String),
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or_default();
    let operation = match arg(0) {
        "graphql" if arg(1).trim().is_empty() => {
            return Err("graphql needs a query document".to_string())
        }
        "graphql" => return Ok(Command::Remote(arg(1).to_string())),
        "whoami" => Operation::CurrentUser,
        "token" => Operation::JwtToken,
        "sign-in" => Operation::sign_in(arg(1), arg(2)).map_err(|e| e.to_string())?,
        "confirm-user" => Operation::confirm_user(arg(1), arg(2)).map_err(|e| e.to_string())?,
        "confirm-dapp-user" => Operation::confirm_dapp_user(arg(1)).map_err(|e| e.to_string())?,
        "dapp-user" => Operation::dapp_user(arg(1)).map_err(|e| e.to_string())?,
        "" => return Err(USAGE.to_string()),
        other => return Err(format!("unknown command '{other}'\n\n{USAGE}")),
    };
    Ok(Command::Local(operation))
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LogFormat::from_env());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let client = match NotusClient::from_env().await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to assemble client");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Local(operation) => client
            .bridge()
            .execute(operation)
            .await
            .map_err(|e| e.to_string()),
        Command::Remote(query) => client
            .query_remote(GraphqlRequest::new(query))
            .await
            .map_err(|e| e.to_string())
            .and_then(|response| serde_json::to_value(response).map_err(|e| e.to_string())),
    };

    match result {
        Ok(value) => {
            print_json(&value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Operation failed");
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}
