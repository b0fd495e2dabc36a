use dice_calc::{evaluate, parse, Decimal, DiceOptions};
use std::io::{self, BufRead, Write};

fn load_options() -> Result<DiceOptions, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(toml::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(DiceOptions::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let options = load_options()?;
    log::debug!("using {:?}", options);

    let mut rng = rand::thread_rng();
    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let outcome = parse(&line)
                .map_err(dice_calc::Error::from)
                .and_then(|node| Ok(evaluate(&node, &mut rng, &options)?));
            match outcome {
                Ok(outcome) => {
                    if !outcome.log.is_empty() {
                        println!("{}", outcome.log);
                    }
                    println!("= {}", Decimal(outcome.result));
                }
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
