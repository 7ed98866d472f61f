use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use arca_container::Group;
use arca_file::{AccessMode, ArcaFile, ArrayBuffer, ElementKind};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let json_output = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Ls(args) => cmd_ls(args, json_output),
        Command::Describe(args) => cmd_describe(args, json_output),
        Command::Cat(args) => cmd_cat(args, json_output),
        Command::Info(args) => cmd_info(args, json_output),
        Command::Mkgroup(args) => cmd_mkgroup(args),
        Command::Rm(args) => cmd_rm(args),
        Command::Mv(args) => cmd_mv(args),
        Command::Cp(args) => cmd_cp(args),
    }
}

fn open(file: &str, mode: AccessMode) -> anyhow::Result<ArcaFile> {
    ArcaFile::open(file, mode).with_context(|| format!("cannot open container {file}"))
}

fn cmd_ls(args: LsArgs, json_output: bool) -> anyhow::Result<()> {
    let mut file = open(&args.file, AccessMode::ReadOnly)?;
    file.cd(&args.path)
        .with_context(|| format!("no group at {}", args.path))?;
    let group = file.container().group(file.cwd())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&group_tree(group, args.recursive))?);
        return Ok(());
    }
    print_group(group, args.recursive, 0);
    Ok(())
}

fn group_tree(group: &Group, recursive: bool) -> serde_json::Value {
    let groups: serde_json::Map<String, serde_json::Value> = group
        .groups()
        .iter()
        .map(|(name, child)| {
            let value = if recursive {
                group_tree(child, true)
            } else {
                json!({})
            };
            (name.clone(), value)
        })
        .collect();
    let datasets: serde_json::Map<String, serde_json::Value> = group
        .datasets()
        .iter()
        .map(|(name, ds)| {
            (
                name.clone(),
                json!({
                    "dtype": ds.dtype().to_string(),
                    "expandable": ds.is_expandable(),
                    "slots": ds.len(),
                }),
            )
        })
        .collect();
    json!({ "groups": groups, "datasets": datasets })
}

fn print_group(group: &Group, recursive: bool, depth: usize) {
    let indent = "  ".repeat(depth);
    for (name, child) in group.groups() {
        println!("{indent}{}/", name.blue().bold());
        if recursive {
            print_group(child, true, depth + 1);
        }
    }
    for (name, ds) in group.datasets() {
        let marker = if ds.is_expandable() {
            format!("  [{} slots]", ds.len())
        } else {
            String::new()
        };
        println!("{indent}{}  {}{}", name.bold(), ds.dtype().to_string().cyan(), marker.dimmed());
    }
}

fn cmd_describe(args: DescribeArgs, json_output: bool) -> anyhow::Result<()> {
    let file = open(&args.file, AccessMode::ReadOnly)?;
    let history = file
        .describe(&args.path)
        .with_context(|| format!("no dataset at {}", args.path))?;

    if json_output {
        let entries: Vec<_> = history
            .iter()
            .map(|d| {
                json!({
                    "dtype": d.dtype.to_string(),
                    "size": d.size,
                    "expandable": d.expandable,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for (i, d) in history.iter().enumerate() {
        let current = if i + 1 == history.len() { " (current)".green().to_string() } else { String::new() };
        println!("{i}: {d}{current}");
    }
    Ok(())
}

fn cmd_cat(args: CatArgs, json_output: bool) -> anyhow::Result<()> {
    let file = open(&args.file, AccessMode::ReadOnly)?;
    let buffer = file
        .read_buffer(&args.path, args.slot)
        .with_context(|| format!("cannot read slot {} of {}", args.slot, args.path))?;
    let values = buffer_values(&buffer);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        println!("{values}");
    }
    Ok(())
}

/// Decode a buffer into a JSON value: scalars as one value, arrays as a
/// flat list, complex elements as `[re, im]` pairs.
fn buffer_values(buffer: &ArrayBuffer) -> serde_json::Value {
    fn collect<T: arca_file::Element + serde::Serialize>(buffer: &ArrayBuffer) -> serde_json::Value {
        match buffer.to_vec::<T>() {
            Ok(values) if buffer.shape.is_empty() => json!(values[0]),
            Ok(values) => json!(values),
            Err(e) => json!(e.to_string()),
        }
    }
    match buffer.kind {
        ElementKind::Int8 => collect::<i8>(buffer),
        ElementKind::Int16 => collect::<i16>(buffer),
        ElementKind::Int32 => collect::<i32>(buffer),
        ElementKind::Int64 => collect::<i64>(buffer),
        ElementKind::Uint8 => collect::<u8>(buffer),
        ElementKind::Uint16 => collect::<u16>(buffer),
        ElementKind::Uint32 => collect::<u32>(buffer),
        ElementKind::Uint64 => collect::<u64>(buffer),
        ElementKind::Float32 => collect::<f32>(buffer),
        ElementKind::Float64 => collect::<f64>(buffer),
        ElementKind::Bool => collect::<bool>(buffer),
        ElementKind::Str => match buffer.to_string_value() {
            Ok(s) => json!(s),
            Err(e) => json!(e.to_string()),
        },
        ElementKind::Complex64 => {
            let pairs: Vec<[f32; 2]> = buffer
                .data
                .chunks_exact(8)
                .map(|c| {
                    let re = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
                    let im = f32::from_le_bytes([c[4], c[5], c[6], c[7]]);
                    [re, im]
                })
                .collect();
            json!(pairs)
        }
        ElementKind::Complex128 => {
            let pairs: Vec<[f64; 2]> = buffer
                .data
                .chunks_exact(16)
                .map(|c| {
                    let mut re = [0u8; 8];
                    let mut im = [0u8; 8];
                    re.copy_from_slice(&c[..8]);
                    im.copy_from_slice(&c[8..]);
                    [f64::from_le_bytes(re), f64::from_le_bytes(im)]
                })
                .collect();
            json!(pairs)
        }
    }
}

fn cmd_info(args: InfoArgs, json_output: bool) -> anyhow::Result<()> {
    let file = open(&args.file, AccessMode::ReadOnly)?;
    let (groups, datasets, slots, bytes) = file.container().root().stats();

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "path": args.file,
                "groups": groups,
                "datasets": datasets,
                "slots": slots,
                "bytes": bytes,
            }))?
        );
        return Ok(());
    }
    println!("{}", args.file.bold());
    println!("  groups:   {groups}");
    println!("  datasets: {datasets}");
    println!("  slots:    {slots}");
    println!("  bytes:    {bytes}");
    Ok(())
}

fn cmd_mkgroup(args: MkgroupArgs) -> anyhow::Result<()> {
    let mut file = open(&args.file, AccessMode::ReadWrite)?;
    file.create_group(&args.path)?;
    println!("{} Created group {}", "✓".green(), args.path.blue().bold());
    Ok(())
}

fn cmd_rm(args: RmArgs) -> anyhow::Result<()> {
    let mut file = open(&args.file, AccessMode::ReadWrite)?;
    file.unlink(&args.path)
        .with_context(|| format!("no dataset at {}", args.path))?;
    println!("{} Removed {}", "✓".green(), args.path.bold());
    Ok(())
}

fn cmd_mv(args: MvArgs) -> anyhow::Result<()> {
    let mut file = open(&args.file, AccessMode::ReadWrite)?;
    file.rename(&args.from, &args.to)
        .with_context(|| format!("cannot rename {} to {}", args.from, args.to))?;
    println!("{} Renamed {} to {}", "✓".green(), args.from.bold(), args.to.bold());
    Ok(())
}

fn cmd_cp(args: CpArgs) -> anyhow::Result<()> {
    let source = open(&args.source, AccessMode::ReadOnly)?;
    let dest_mode = if std::path::Path::new(&args.dest).exists() {
        AccessMode::ReadWrite
    } else {
        AccessMode::Truncate
    };
    let mut dest = open(&args.dest, dest_mode)?;
    if !dest.has_group(&args.into) {
        dest.create_group(&args.into)?;
    }
    dest.cd(&args.into)?;
    dest.copy(&source)?;
    println!(
        "{} Merged {} into {}:{}",
        "✓".green(),
        args.source.bold(),
        args.dest.bold(),
        args.into.blue()
    );
    Ok(())
}
