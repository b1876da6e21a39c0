mod cli;
mod render;

use org_recon::error::AppError;

fn main() {
    match cli::run() {
        Ok(()) => {}
        // The reader hung up (e.g. piped into `head`); nothing left to report.
        Err(AppError::Io(err)) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
        Err(err) => {
            eprintln!("application error: {err}");
            std::process::exit(1);
        }
    }
}
