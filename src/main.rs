//! acp CLI binary.
//!
//! All logic lives in the library; `main` only maps the exit code.

fn main() {
    std::process::exit(acp::cli::run());
}
