use anyhow::Result;
use clap::Parser;
use docx2kb::cli::Cli;
use docx2kb::converter;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    converter::run(&cli)
}
