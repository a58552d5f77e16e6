use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqr::runtime::value::Value;
use sqr::runtime::Runtime;

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Repl)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    Run(RunArgs),
    Repl,
}

#[derive(Debug, Args)]
struct RunArgs {
    file: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Cli::parse();
    match args.command() {
        Command::Repl => repl_command(),
        Command::Run(args) => run_command(args),
    }
}

fn runtime() -> Runtime {
    Runtime::new(Rc::new(RefCell::new(std::io::stdout())))
}

fn repl_command() {
    println!("Sqr REPL. EOF to exit. (Ctrl+D on *nix, Ctrl+Z on Windows)");

    let runtime = runtime();
    let mut input = String::new();
    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            break;
        }

        input.clear();
        let Ok(read) = std::io::stdin().read_line(&mut input) else {
            break;
        };
        if read == 0 {
            break;
        }

        match runtime.run(input.trim()) {
            Ok(Value::Void) => {}
            Ok(value) => println!("{}", value),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn run_command(args: &RunArgs) {
    let mut path = PathBuf::from(&args.file);
    if path.extension().is_none() {
        path.set_extension("sq");
    }

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runtime().run(&source) {
        eprintln!("{}", e);
        std::process::exit(70);
    }
}
