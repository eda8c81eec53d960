use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use w12asm::files::{assemble_file, Config};

/// Two pass assembler for the 12 bit machine.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Source files, without the `.as` extension
    #[clap(required = true)]
    inputs: Vec<PathBuf>,

    /// Write source level debug info (`.sdb`)
    #[clap(short, long, env = "W12ASM_DEBUG")]
    debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config { debug: args.debug };

    let mut failed = 0;
    for input in &args.inputs {
        log::info!("assembling {}", input.display());
        match assemble_file(input, &config) {
            Ok(true) => log::info!("{}: success", input.display()),
            Ok(false) => {
                log::info!("{}: failed", input.display());
                failed += 1;
            }
            Err(e) => {
                log::error!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        log::warn!("{} of {} files failed", failed, args.inputs.len());
    }

    Ok(())
}
