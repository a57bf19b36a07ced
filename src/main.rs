use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::process;

use clap::{Parser, Subcommand};

use flexkey::char_pool::available_char_pools;
use flexkey::{Generator, PoolSpec};

#[derive(Parser)]
#[command(name = "flexkey", about = "Generate random keys in a flexible format")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one or more keys
    Generate {
        /// Key format; characters mapped in the pool config are placeholders
        #[arg(short, long)]
        format: String,
        /// Pool config as inline JSON, or a path to a JSON file
        #[arg(short, long)]
        pools: String,
        /// Number of distinct keys to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// List the built-in character pool types
    Pools,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            format,
            pools,
            count,
        } => {
            if let Err(e) = run_generate(&format, &pools, count) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        Command::Pools => {
            for (char_type, charset) in available_char_pools() {
                println!("{char_type:<18} {charset}");
            }
        }
    }
}

fn run_generate(format: &str, pools: &str, count: usize) -> Result<(), Box<dyn Error>> {
    let char_pool: BTreeMap<String, PoolSpec> = if pools.trim_start().starts_with('{') {
        serde_json::from_str(pools)?
    } else {
        let file = File::open(pools)?;
        serde_json::from_reader(BufReader::new(file))?
    };

    let generator = Generator::new(format, char_pool)?;

    if count == 1 {
        println!("{}", generator.generate());
    } else {
        for key in generator.generate_n(count)? {
            println!("{key}");
        }
    }

    Ok(())
}
