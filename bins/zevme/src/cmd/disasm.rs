use clap::Parser;
use std::error::Error;
use zevm::interpreter::Disasm;

/// Prints one line per instruction: offset, mnemonic, immediate.
#[derive(Parser)]
pub struct Cmd {
    /// Hex-encoded bytecode, with or without a 0x prefix.
    code: String,
}

impl Cmd {
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        let code = super::decode_hex(&self.code)?;
        for insn in Disasm::new(&code) {
            println!("{insn}");
        }
        Ok(())
    }
}
