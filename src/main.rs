use std::io::{self, BufRead, Write};

use tradebook::shell::{Reply, Shell, GREETING};
use tradebook::{config::Config, LedgerStore};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = LedgerStore::new(&config.data_dir);
    let engine = store.load_engine(config.ledger_config())?;
    tracing::info!(
        orders = engine.history().len(),
        dir = %config.data_dir.display(),
        "Ledger ready"
    );

    let mut shell = Shell::new(engine, Some(store));
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", GREETING);
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match shell.run_line(&line) {
            Ok(Some(Reply::Output(text))) => print!("{}", text),
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}
