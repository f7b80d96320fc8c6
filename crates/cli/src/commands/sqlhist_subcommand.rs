use clap::Subcommand;
use std::path::PathBuf;

use super::QueryCliArgs;

#[derive(Debug, Subcommand)]
pub enum SqlhistSubcommand {
    #[command(
        name = "query",
        long_about = "Bucket a column of a table, with the row set and sizing given as flags."
    )]
    Query {
        #[command(flatten)]
        args: Box<QueryCliArgs>,
    },

    #[command(
        name = "job",
        long_about = "Bucket a column as described by a TOML job file."
    )]
    Job {
        /// Path to the job file.
        file: PathBuf,
    },
}
