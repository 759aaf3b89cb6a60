use std::io::{self, BufRead, Write};

use quince_chess::shell::command_shell::{EngineSession, ShellOutcome};

fn main() {
    let started = chrono::Local::now();
    println!(
        "Welcome to quince, a chess engine. Session started {}. Type help for help.",
        started.format("%Y-%m-%d %H:%M:%S")
    );

    let mut session = EngineSession::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("quince> ");
        io::stdout().flush().ok();

        let Some(Ok(line)) = lines.next() else {
            break;
        };

        match session.handle_command(&line) {
            ShellOutcome::Continue(text) => {
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            ShellOutcome::Quit(text) => {
                println!("{text}");
                break;
            }
        }
    }
}
