use clap::Parser;
use log::error;
use mira_lang::{
    ast::Program,
    typechecker::{Typechecker, TypecheckerOptions},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Program to check, as a JSON syntax tree produced by the parser
    #[arg(short, long)]
    file: std::path::PathBuf,

    /// Widen container slots to union types on disagreement
    #[arg(short, long)]
    union: bool,

    /// Print the annotated tree as JSON after checking
    #[arg(short, long)]
    dump: bool,
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();
    let args = Cli::parse();

    let file_content = std::fs::read_to_string(&args.file).unwrap_or_else(|_| {
        panic!(
            "Could not read file: '{}'",
            args.file.to_string_lossy()
        )
    });

    let mut program: Program = match serde_json::from_str(&file_content) {
        Ok(program) => program,
        Err(parse_error) => {
            error!("not a valid program tree: {parse_error}");
            std::process::exit(-1);
        }
    };

    let checker = Typechecker::with_options(TypecheckerOptions {
        union_widening: args.union,
    });

    if let Err(type_error) = checker.check(&mut program) {
        error!("{type_error}");
        std::process::exit(-1);
    }

    if args.dump {
        println!(
            "{}",
            serde_json::to_string_pretty(&program).expect("tree serialization failed")
        );
    }
}
