use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arca",
    about = "arca — hierarchical array container tooling",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List groups and datasets
    Ls(LsArgs),
    /// Show a dataset's storage history
    Describe(DescribeArgs),
    /// Print a dataset's values
    Cat(CatArgs),
    /// Show container-wide statistics
    Info(InfoArgs),
    /// Create a group (with missing parents)
    Mkgroup(MkgroupArgs),
    /// Remove a dataset
    Rm(RmArgs),
    /// Rename a dataset
    Mv(MvArgs),
    /// Merge one container into another
    Cp(CpArgs),
}

#[derive(Args)]
pub struct LsArgs {
    pub file: String,
    #[arg(default_value = "/")]
    pub path: String,
    #[arg(short = 'R', long)]
    pub recursive: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    pub file: String,
    pub path: String,
}

#[derive(Args)]
pub struct CatArgs {
    pub file: String,
    pub path: String,
    /// Slot to print (for expandable datasets)
    #[arg(long, default_value = "0")]
    pub slot: usize,
}

#[derive(Args)]
pub struct InfoArgs {
    pub file: String,
}

#[derive(Args)]
pub struct MkgroupArgs {
    pub file: String,
    pub path: String,
}

#[derive(Args)]
pub struct RmArgs {
    pub file: String,
    pub path: String,
}

#[derive(Args)]
pub struct MvArgs {
    pub file: String,
    pub from: String,
    pub to: String,
}

#[derive(Args)]
pub struct CpArgs {
    pub source: String,
    pub dest: String,
    /// Destination group to merge into
    #[arg(long, default_value = "/")]
    pub into: String,
}
