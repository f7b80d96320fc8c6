mod commands;
mod error;
mod util;

use commands::{SqlhistCli, SqlhistSubcommand};

fn main() -> miette::Result<()> {
    let args = SqlhistCli::parse_args();
    util::init_tracing(args.verbose);

    let histogram = match args.command {
        SqlhistSubcommand::Query { args } => commands::query(&args)?,
        SqlhistSubcommand::Job { file } => commands::job(&file)?,
    };
    util::print_histogram(&histogram);
    Ok(())
}
