use chrono::Local;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tickloop::{Loop, ModuleRegistry, CONSOLE_MODULE};

/// Stand-in for a script engine: a bag of globals and an output buffer.
#[derive(Default)]
struct Engine {
    globals: Vec<&'static str>,
    output: Vec<String>,
}

impl Engine {
    fn log(&mut self, tag: &str, message: impl std::fmt::Display) {
        let now = Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] [{}] {}", now, tag, message);
        println!("{}", line);
        self.output.push(line);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .with_target(false)
        .init();

    let modules = ModuleRegistry::new()
        .register(CONSOLE_MODULE, |engine: &mut Engine| engine.globals.push("console"))
        .register(tickloop::process::MODULE_NAME, |engine: &mut Engine| {
            engine.globals.push("process")
        });

    let event_loop = Loop::builder(Engine::default()).registry(modules).build()?;
    let handle = event_loop.clone();

    println!("🚀 Starting countdown...\n");

    event_loop.run(move |engine| {
        engine.log("MAIN", format!("globals: {:?}", engine.globals));

        handle.set_immediate(|engine| engine.log("IMMEDIATE", "runs before any timer"));

        let mut remaining = 3;
        let countdown = handle.clone();
        let slot = Arc::new(Mutex::new(None));
        let me = Arc::clone(&slot);
        let interval = handle.set_interval(
            move |engine| {
                engine.log("INTERVAL", format!("{}...", remaining));
                remaining -= 1;
                if remaining == 0 {
                    let current = *me.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Some(interval) = current {
                        countdown.clear_interval(interval);
                    }
                }
            },
            Duration::from_millis(200),
        );
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(interval);

        let nested = handle.clone();
        handle.set_timeout(
            move |engine| {
                engine.log("TIMEOUT", "liftoff, running a nested task");
                let result = nested.run_nested(engine, |engine, child, stop| {
                    engine.log("NESTED", "child loop started");
                    let mut polls = 0;
                    child.set_interval(
                        move |engine| {
                            polls += 1;
                            engine.log("NESTED", format!("poll #{}", polls));
                            if polls == 2 {
                                stop.stop();
                            }
                        },
                        Duration::from_millis(50),
                    );
                });
                if let Err(e) = result {
                    engine.log("NESTED", format!("failed: {}", e));
                }
                engine.log("TIMEOUT", "nested task finished");
            },
            Duration::from_millis(700),
        );
    });

    let lines = event_loop.with_engine(|engine| engine.output.len()).unwrap_or(0);
    println!("\n👋 Loop drained after {} log lines", lines);
    Ok(())
}
