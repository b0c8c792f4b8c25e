use std::process;
use std::{env, fs};

use anyhow::Context;

use riddle::{run_program, VERSION};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let filename = match env::args().nth(1) {
        Some(arg) if arg == "--version" => {
            println!("riddle {VERSION}");
            return Ok(());
        }
        Some(arg) => arg,
        None => {
            eprintln!("usage: riddle <file>");
            process::exit(1);
        }
    };

    let source = fs::read_to_string(&filename)
        .with_context(|| format!("while trying to read: {filename}"))?;

    match run_program(&filename, &source) {
        Ok((value, _)) => {
            println!("{value}");
            Ok(())
        }
        Err(error) => {
            eprintln!("{error}");
            process::exit(1);
        }
    }
}
