use clap::Parser as ClapParser;
use cql2_filter::cli;

#[derive(ClapParser)]
#[command(name = "cql2")]
#[command(about = "Parse a CQL2 filter expression and print its Text and JSON forms")]
#[command(version)]
struct Cli {
    /// The filter expression, in either the Text or JSON encoding
    filter: String,
}

fn main() {
    let cli = Cli::parse();

    match cli::execute(&cli.filter) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
