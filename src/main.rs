// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fs;
use std::path::PathBuf;

use aem_headless::{Configuration, QueryVariables};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "aem-headless", version)]
/// Runs GraphQL queries against the headless API of a content server.
struct Cli {
    /// Path to an optional "config.toml" file, values can also be set with AEM_HEADLESS_*
    /// environment variables.
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the GraphQL query stored in a file.
    Query {
        /// File containing the query text.
        file: PathBuf,

        /// Query variable in the form "name=value", values are parsed as JSON when possible.
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, Value)>,
    },

    /// Run a persisted query by its short path, e.g. "/wknd-shared/adventures-all".
    Persisted {
        path: String,

        /// Query variable in the form "name=value", values are parsed as JSON when possible.
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, Value)>,
    },

    /// List the persisted queries of a configuration.
    List { configuration: String },
}

fn parse_var(input: &str) -> Result<(String, Value), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", input))?;

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((name.to_string(), value))
}

fn to_query_vars(vars: Vec<(String, Value)>) -> Option<QueryVariables> {
    if vars.is_empty() {
        return None;
    }

    let mut query_vars = QueryVariables::new();
    for (name, value) in vars {
        query_vars.add_var(&name, value);
    }
    Some(query_vars)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Configuration::load(cli.config.as_deref())?;
    let client = config.build_client()?;

    match cli.command {
        Command::Query { file, vars } => {
            let query = fs::read_to_string(&file)
                .with_context(|| format!("Could not read query file '{}'", file.display()))?;

            let response = match to_query_vars(vars) {
                Some(vars) => client.run_query_with_vars(&query, &vars).await?,
                None => client.run_query(&query).await?,
            };
            println!("{}", response);
        }
        Command::Persisted { path, vars } => {
            let vars = to_query_vars(vars);
            let response = client.run_persisted_query(&path, vars.as_ref()).await?;
            println!("{}", response);
        }
        Command::List { configuration } => {
            for persisted_query in client.list_persisted_queries(&configuration).await? {
                println!("{}", persisted_query);
            }
        }
    }

    Ok(())
}
