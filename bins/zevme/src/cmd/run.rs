use clap::Parser;
use std::error::Error;
use zevm::primitives::{address, Address, Bytes, U256};
use zevm::{db::DbAccount, Env, Evm, InMemoryDB, SpecId};

const CALLER: Address = address!("1000000000000000000000000000000000000001");
const CONTRACT: Address = address!("2000000000000000000000000000000000000002");

/// Executes bytecode in a throwaway state and prints the outcome.
#[derive(Parser)]
pub struct Cmd {
    /// Hex-encoded runtime bytecode, with or without a 0x prefix.
    code: String,
    /// Hex-encoded calldata.
    #[arg(long, default_value = "")]
    input: String,
    /// Gas limit of the call.
    #[arg(long, default_value_t = 10_000_000)]
    gas: u64,
    /// Hard fork to execute under.
    #[arg(long, default_value = "london")]
    spec: String,
}

impl Cmd {
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        let code = super::decode_hex(&self.code)?;
        let input = super::decode_hex(&self.input)?;
        let spec_id: SpecId = self.spec.parse()?;

        let mut db = InMemoryDB::new();
        db.insert_account(CONTRACT, DbAccount::with_code(code.into()));

        let mut env = Env::default();
        env.cfg.spec_id = spec_id;
        let mut evm = Evm::new(&mut db, env)?;
        let result = evm.call(CALLER, CONTRACT, Bytes::from(input), self.gas, U256::ZERO);

        println!("result:   {:?}", result.result);
        println!("output:   0x{}", hex::encode(&result.output));
        println!("gas used: {}", result.gas.spent());
        println!("refunded: {}", result.gas.refunded());
        for (i, log) in db.logs().iter().enumerate() {
            println!("log[{i}]: {:?} topics={:?} data=0x{}", log.address, log.topics, hex::encode(&log.data));
        }
        Ok(())
    }
}
