use ccsimplebuild::run;

fn main() {
    let exit_code = match run::run() {
        Ok(code) => code,
        Err(err) => {
            println!("ccsimplebuild: error: {}", err);
            1
        }
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
