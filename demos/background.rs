use chrono::Local;
use std::thread;
use std::time::Duration;
use tickloop::{Loop, TimerBindings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_target(false)
        .init();

    // The engine here is just a counter of handled requests.
    let event_loop = Loop::new(0u64)?;
    event_loop.start_in_foreground()?;
    println!("🚀 Loop running in background: {}", event_loop.is_running());

    let timers = TimerBindings::new(event_loop.clone());
    let heartbeat = timers.set_interval(
        |handled: &mut u64| {
            let now = Local::now().format("%H:%M:%S%.3f");
            println!("[{}] [HEARTBEAT] handled so far: {}", now, handled);
        },
        250,
    );

    let workers: Vec<_> = (0..3)
        .map(|worker| {
            let event_loop = event_loop.clone();
            thread::spawn(move || {
                for request in 0..4 {
                    event_loop.run_on_loop(move |handled| {
                        *handled += 1;
                        let now = Local::now().format("%H:%M:%S%.3f");
                        println!("[{}] [WORKER-{}] request #{}", now, worker, request);
                    });
                    thread::sleep(Duration::from_millis(120));
                }
            })
        })
        .collect();

    for worker in workers {
        let _ = worker.join();
    }

    timers.clear_interval(heartbeat);
    let pending = event_loop.stop();
    let handled = event_loop.with_engine(|handled| *handled).unwrap_or(0);

    println!("\n👋 Stopped with {} pending jobs, {} requests handled", pending, handled);
    Ok(())
}
