use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use flowkit_tracing::{init_tracing_subscriber, TracingSubscriberOptions};

mod commands;
pub mod shared;

pub use commands::order::Command as OrderCommand;
pub use commands::resolve::Command as ResolveCommand;

#[derive(Debug, Parser)]
#[clap(
    name = "flowkit",
    about = "Resolve Cadence contract imports and plan contract deployments",
    version
)]
struct Opt {
    /// The command to run
    #[clap(subcommand)]
    command: Flowkit,

    /// Use verbose output. Repeat for more detail (-vv).
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all output.
    #[clap(short, long, global = true)]
    silent: bool,
}

#[derive(Debug, Subcommand)]
enum Flowkit {
    Order(OrderCommand),
    Resolve(ResolveCommand),
}

pub fn run_cli() -> Result<()> {
    let opt = Opt::parse();
    init_tracing_subscriber(TracingSubscriberOptions {
        verbosity: Some(opt.verbose),
        silent: Some(opt.silent),
        ..Default::default()
    });
    match opt.command {
        Flowkit::Order(command) => commands::order::exec(command),
        Flowkit::Resolve(command) => commands::resolve::exec(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Opt::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let opt = Opt::try_parse_from(["flowkit", "order", "--network", "testnet", "-vv"]).unwrap();
        assert_eq!(opt.verbose, 2);
        match opt.command {
            Flowkit::Order(cmd) => assert_eq!(cmd.project.network, "testnet"),
            cmd => panic!("unexpected command: {cmd:?}"),
        }
    }
}
