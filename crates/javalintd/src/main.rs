use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    javalintd::run(
        std::env::args_os(),
        io::stdin().lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
}
