use clap::CommandFactory;
use clap_mangen::Man;
use std::path::PathBuf;

use rota::cli::Cli;

/// Render the rota(1) man page into the directory given as the first
/// argument (current directory when omitted).
fn main() -> std::io::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let man = Man::new(Cli::command());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;

    let path = out_dir.join("rota.1");
    std::fs::write(&path, buffer)?;
    println!("Wrote {}", path.display());
    Ok(())
}
