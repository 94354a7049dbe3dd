mod cmd;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "zevm command line tools")]
enum Cli {
    /// Disassemble hex bytecode into an instruction listing.
    Disasm(cmd::disasm::Cmd),
    /// Run hex bytecode against a fresh in-memory state.
    Run(cmd::run::Cmd),
}

fn main() {
    let result = match Cli::parse() {
        Cli::Disasm(cmd) => cmd.run(),
        Cli::Run(cmd) => cmd.run(),
    };
    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
