// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command-line front end for the submodel mapper
//!
//! Maps a template against source data locally, tries out JSONPath
//! expressions, or runs the full generator against a repository.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use smt_mapper::{AasGenerator, JsonPath, RepositoryConfig, map_template_to_instance};
use std::fs;
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "smt-mapper")]
#[command(about = "Populate AAS submodel templates with data driven by their mapping qualifiers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map source data into a submodel template
    Map {
        /// JSON file containing the submodel template
        #[arg(short, long)]
        template: String,
        /// JSON file containing the source data (reads from stdin if not provided)
        #[arg(short, long)]
        data: Option<String>,
        /// Language tag for multi-language properties
        #[arg(short, long, default_value = "en")]
        language: String,
        /// Identifier of the new instance
        #[arg(long)]
        id: String,
        /// Write the instance here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Evaluate a JSONPath expression against a JSON document
    Select {
        /// JSONPath expression
        path: String,
        /// JSON file to query (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Validate JSONPath expression syntax
    Validate {
        /// JSONPath expression to validate
        path: String,
    },
    /// Generate instances for an AAS through the repository
    Generate {
        /// JSON file with the repository configuration (defaults apply if not provided)
        #[arg(short, long)]
        config: Option<String>,
        /// Base64url-encoded id of the target AAS
        #[arg(long)]
        aas_id: String,
        /// Template id to instantiate; may be repeated
        #[arg(short, long = "template", required = true)]
        templates: Vec<String>,
        /// JSON file containing the source data (reads from stdin if not provided)
        #[arg(short, long)]
        data: Option<String>,
        /// Language tag for multi-language properties
        #[arg(short, long, default_value = "en")]
        language: String,
        /// Prefix of generated submodel ids
        #[arg(long, default_value = "urn:smt-mapper:sm:")]
        id_prefix: String,
    },
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Map {
            template,
            data,
            language,
            id,
            output,
            pretty,
        } => handle_map(&template, data.as_deref(), &language, &id, output.as_deref(), pretty),
        Commands::Select { path, file, pretty } => handle_select(&path, file.as_deref(), pretty),
        Commands::Validate { path } => {
            handle_validate(&path);
            Ok(())
        }
        Commands::Generate {
            config,
            aas_id,
            templates,
            data,
            language,
            id_prefix,
        } => handle_generate(
            config.as_deref(),
            &aas_id,
            &templates,
            data.as_deref(),
            &language,
            &id_prefix,
        ),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(filename) => {
            fs::read_to_string(filename).with_context(|| format!("reading file '{filename}'"))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading from stdin")?;
            Ok(buffer)
        }
    }
}

fn read_json(file: Option<&str>) -> Result<Value> {
    let text = read_input(file)?;
    serde_json::from_str(&text).with_context(|| match file {
        Some(filename) => format!("parsing JSON in '{filename}'"),
        None => "parsing JSON from stdin".to_string(),
    })
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn handle_map(
    template: &str,
    data: Option<&str>,
    language: &str,
    id: &str,
    output: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let template = read_json(Some(template))?;
    let data = read_json(data)?;

    let instance = match map_template_to_instance(&template, &data, language, id) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("✗ Mapping failed: {e}");
            if let Some(path) = e.qualifier_path() {
                eprintln!("Qualifier: {path}");
            }
            for line in e.logs() {
                eprintln!("  {line}");
            }
            process::exit(1);
        }
    };

    let text = render(&instance, pretty)?;
    match output {
        Some(filename) => {
            fs::write(filename, text).with_context(|| format!("writing file '{filename}'"))?
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn handle_select(path: &str, file: Option<&str>, pretty: bool) -> Result<()> {
    let path: JsonPath = path.parse()?;
    let document = read_json(file)?;
    let matches: Vec<&Value> = path.select(&document);
    println!("{}", render(&matches, pretty)?);
    Ok(())
}

fn handle_validate(path: &str) {
    match JsonPath::parse(path) {
        Ok(parsed) => {
            println!("✓ Path is valid");
            let normalized: String = parsed.segments().iter().map(ToString::to_string).collect();
            println!("Normalized: ${normalized}");
        }
        Err(e) => {
            eprintln!("✗ Invalid path: {e}");
            eprintln!("Path: {path}");
            process::exit(1);
        }
    }
}

fn handle_generate(
    config: Option<&str>,
    aas_id: &str,
    templates: &[String],
    data: Option<&str>,
    language: &str,
    id_prefix: &str,
) -> Result<()> {
    let config: RepositoryConfig = match config {
        Some(filename) => read_input(Some(filename))?
            .parse::<RepositoryConfig>()
            .with_context(|| format!("loading configuration '{filename}'"))?,
        None => RepositoryConfig::default(),
    };
    let data = read_json(data)?;
    let generator = AasGenerator::with_http(config, id_prefix)?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let results = runtime.block_on(generator.add_data_to_aas(aas_id, templates, &data, language));

    println!("{}", render(&results, true)?);
    if results.iter().any(|result| !result.success) {
        process::exit(1);
    }
    Ok(())
}
