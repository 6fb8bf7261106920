// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typelib-dump - inspect type description files
//!
//! Imports a YAML or tlb type file and lists its types, describes one layout,
//! or prints the leaf columns of a type (optionally with the values decoded
//! from a raw binary buffer).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use typelib::{Registry, RegistryConfig, RichValue, TypeDescriptor, TypeKind, Value};

#[derive(Parser)]
#[command(name = "typelib-dump")]
#[command(about = "Inspect typelib type description files")]
#[command(version)]
struct Cli {
    /// Type description file (.yaml, .yml, .tlb, .xml)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Format of FILE (detected from the extension if not specified)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Extra directories searched for FILE (also read from TYPELIB_IMPORT_PATH)
    #[arg(short = 'I', long = "include", value_name = "DIR", global = true)]
    include: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the types declared by FILE
    List {
        /// Also list standard and derived types
        #[arg(short, long)]
        all: bool,
    },

    /// Show the layout of one type
    Describe {
        /// Qualified type name or type expression (e.g. /A, "/A[4]")
        #[arg(value_name = "TYPE")]
        type_name: String,
    },

    /// Print the leaf paths of a type, and optionally the decoded values
    Columns {
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Prefix of every path
        #[arg(long, default_value = "")]
        prefix: String,

        /// Column separator
        #[arg(long, default_value = " ")]
        sep: String,

        /// Raw native bytes of one TYPE value to decode
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = RegistryConfig::from_env();
    config.search_paths.extend(cli.include.iter().cloned());
    let registry = Registry::with_config(config);
    let declared = registry
        .import(&cli.input, cli.format.as_deref())
        .with_context(|| format!("Failed to import {}", cli.input.display()))?;
    log::debug!(
        "[typelib-dump] {} declared types, {} registered",
        declared.len(),
        registry.len()
    );

    match cli.command {
        Commands::List { all } => {
            let names: Vec<String> = if all {
                registry.names()
            } else {
                declared.iter().map(|t| t.name().to_string()).collect()
            };
            for name in names {
                let desc = registry.get(&name)?;
                println!(
                    "{:<40} size={:<6} align={:<2} {}",
                    name,
                    desc.size(),
                    desc.alignment(),
                    kind_label(&desc)
                );
            }
        }
        Commands::Describe { type_name } => {
            let desc = registry.build(&type_name)?;
            describe(&desc);
        }
        Commands::Columns {
            type_name,
            prefix,
            sep,
            data,
        } => {
            let desc = registry.build(&type_name)?;
            cmd_columns(&desc, &prefix, &sep, data.as_deref())?;
        }
    }

    Ok(())
}

fn kind_label(desc: &TypeDescriptor) -> String {
    match desc.kind() {
        TypeKind::Numeric(kind) => format!("numeric {:?}", kind),
        TypeKind::Opaque => "opaque".to_string(),
        TypeKind::Pointer(target) => format!("pointer to {}", target.name()),
        TypeKind::Array(array) => format!("array of {} x {}", array.length, array.element.name()),
        TypeKind::FixedString(array) => format!("fixed string of {} chars", array.length),
        TypeKind::Compound(fields) => format!("compound, {} fields", fields.len()),
        TypeKind::Enum(values) => format!("enum, {} symbols", values.values.len()),
        TypeKind::Container(container) => {
            format!("{:?} of {}", container.kind, container.element.name())
        }
    }
}

fn describe(desc: &TypeDescriptor) {
    println!("{}", desc.name());
    println!("  size:      {}", desc.size());
    println!("  alignment: {}", desc.alignment());
    println!("  kind:      {}", kind_label(desc));
    println!("  hash:      {}", desc.equivalence_hash());

    match desc.kind() {
        TypeKind::Compound(fields) => {
            println!("\nFields:");
            let mut cursor = 0usize;
            for field in fields {
                if field.offset > cursor {
                    println!("  {:>6}  <{} bytes padding>", cursor, field.offset - cursor);
                }
                println!(
                    "  {:>6}  {:<24} {} ({} bytes)",
                    field.offset,
                    field.name,
                    field.type_desc.name(),
                    field.type_desc.size()
                );
                cursor = field.end();
            }
            if desc.size() > cursor {
                println!("  {:>6}  <{} bytes padding>", cursor, desc.size() - cursor);
            }
        }
        TypeKind::Enum(values) => {
            println!("\nSymbols:");
            for value in &values.values {
                println!("  {:<24} = {}", value.name, value.value);
            }
        }
        _ => {}
    }
}

fn render(rich: &RichValue) -> String {
    match rich {
        RichValue::Bool(v) => v.to_string(),
        RichValue::U8(v) => v.to_string(),
        RichValue::U16(v) => v.to_string(),
        RichValue::U32(v) => v.to_string(),
        RichValue::U64(v) => v.to_string(),
        RichValue::I8(v) => v.to_string(),
        RichValue::I16(v) => v.to_string(),
        RichValue::I32(v) => v.to_string(),
        RichValue::I64(v) => v.to_string(),
        RichValue::F32(v) => v.to_string(),
        RichValue::F64(v) => v.to_string(),
        RichValue::String(v) => v.clone(),
        RichValue::Enum(value, symbol) if symbol.is_empty() => value.to_string(),
        RichValue::Enum(_, symbol) => symbol.clone(),
        RichValue::Pointer(address) => format!("0x{:x}", address),
        RichValue::Null => "NULL".to_string(),
        RichValue::Bytes(bytes) => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
        RichValue::Sequence(items) | RichValue::Array(items) => format!(
            "[{}]",
            items.iter().map(render).collect::<Vec<_>>().join(",")
        ),
        RichValue::Struct(fields) => format!(
            "{{{}}}",
            fields
                .iter()
                .map(|(name, v)| format!("{}={}", name, render(v)))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

fn cmd_columns(
    desc: &std::sync::Arc<TypeDescriptor>,
    prefix: &str,
    sep: &str,
    data: Option<&Path>,
) -> anyhow::Result<()> {
    let header: Vec<String> = desc
        .leaf_paths()
        .into_iter()
        .map(|path| format!("{}{}", prefix, path))
        .collect();
    println!("{}", header.join(sep));

    if let Some(data) = data {
        let bytes = std::fs::read(data)
            .with_context(|| format!("Failed to read {}", data.display()))?;
        let value = Value::wrap(desc, bytes)?;
        let row: Vec<String> = value
            .flatten()?
            .iter()
            .map(|(_, rich)| render(rich))
            .collect();
        println!("{}", row.join(sep));
    }
    Ok(())
}
