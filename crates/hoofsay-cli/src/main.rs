mod cli;

use hoofsay_render::UndefinedVariableError;

fn main() {
    if let Err(e) = cli::run() {
        if let Some(var) = e.downcast_ref::<UndefinedVariableError>() {
            eprintln!("hoofsay: {var}");
            std::process::exit(3);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
