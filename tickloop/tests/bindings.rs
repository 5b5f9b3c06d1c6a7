use std::io::Write;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tickloop::{Loop, LoopConfig, ModuleRegistry, Process, TimerBindings, CONSOLE_MODULE};

const WAIT: Duration = Duration::from_secs(2);
const NOT_CALLED: i32 = i32::MIN;

fn recording_process<E: Send + 'static>(event_loop: &Loop<E>) -> (Process<E>, Arc<AtomicI32>) {
    let code = Arc::new(AtomicI32::new(NOT_CALLED));
    let recorded = Arc::clone(&code);
    let process = Process::with_terminator(event_loop.clone(), move |c| {
        recorded.store(c, Ordering::SeqCst)
    });
    (process, code)
}

#[test]
fn timer_bindings_hand_out_numeric_ids() {
    let event_loop = Loop::new(Vec::<&'static str>::new()).unwrap();
    let timers = TimerBindings::new(event_loop.clone());

    let inner = timers.clone();
    event_loop.run(move |_| {
        let a = inner.set_timeout(|log| log.push("negative delay"), -50);
        let b = inner.set_timeout(|log| log.push("cleared"), 10);
        let c = inner.set_immediate(|log| log.push("immediate"));
        assert!(a != b && b != c && a != c);

        inner.clear_timeout(b);
        inner.clear_timeout(b);
        inner.clear_timeout(999_999);
    });

    assert_eq!(
        event_loop.with_engine(|log| log.clone()),
        Some(vec!["immediate", "negative delay"])
    );
    assert_eq!(event_loop.pending_jobs(), 0);
}

#[test]
fn interval_binding_clears_by_id() {
    let event_loop = Loop::new(0u32).unwrap();
    let timers = TimerBindings::new(event_loop.clone());

    let inner = timers.clone();
    event_loop.run(move |_| {
        let id = Arc::new(AtomicU64::new(0));
        let slot = Arc::clone(&id);
        let clearer = inner.clone();
        let interval = inner.set_interval(
            move |ticks: &mut u32| {
                *ticks += 1;
                if *ticks == 2 {
                    clearer.clear_interval(slot.load(Ordering::SeqCst));
                }
            },
            0,
        );
        id.store(interval, Ordering::SeqCst);

        let skipped = inner.set_immediate(|ticks| *ticks += 100);
        inner.clear_immediate(skipped);
    });

    assert_eq!(event_loop.with_engine(|ticks| *ticks), Some(2));
}

#[test]
fn process_stop_on_a_stopped_loop_just_terminates() {
    let event_loop = Loop::new(()).unwrap();
    let (process, code) = recording_process(&event_loop);

    process.stop(4);
    assert_eq!(code.load(Ordering::SeqCst), 4);
    assert!(!event_loop.is_running());
}

#[test]
fn process_stop_waits_for_a_background_loop() {
    let event_loop = Loop::new(()).unwrap();
    event_loop.start().unwrap();
    event_loop.set_timeout(|_| {}, Duration::from_secs(10));
    let (process, code) = recording_process(&event_loop);

    process.stop(0);
    assert!(!event_loop.is_running());
    assert_eq!(event_loop.pending_jobs(), 0);
    assert_eq!(code.load(Ordering::SeqCst), 0);
}

#[test]
fn process_stop_from_the_loop_thread_does_not_wait() {
    let event_loop = Loop::new(()).unwrap();
    event_loop.start().unwrap();
    let (process, code) = recording_process(&event_loop);

    event_loop.run_on_loop(move |_| process.stop(3));

    let deadline = Instant::now() + WAIT;
    while event_loop.is_running() {
        assert!(Instant::now() < deadline, "loop did not stop in time");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(code.load(Ordering::SeqCst), 3);
}

#[test]
fn process_exit_stops_the_loop_and_terminates() {
    let event_loop = Loop::new(()).unwrap();
    event_loop.start().unwrap();
    let (process, code) = recording_process(&event_loop);

    process.exit(1);
    assert_eq!(code.load(Ordering::SeqCst), 1);

    let deadline = Instant::now() + WAIT;
    while event_loop.is_running() {
        assert!(Instant::now() < deadline, "loop did not stop in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn process_exposes_environment_and_arguments() {
    let event_loop = Loop::new(()).unwrap();
    let (process, _) = recording_process(&event_loop);

    assert_eq!(process.args().len(), std::env::args_os().count());
    if let Some((key, value)) = std::env::vars_os().next() {
        let key = key.to_string_lossy().into_owned();
        let value = value.to_string_lossy().into_owned();
        assert_eq!(process.env().get(&key), Some(&value));
    }
    assert_eq!(process.cwd().unwrap(), std::env::current_dir().unwrap());
}

fn modules() -> ModuleRegistry<Vec<String>> {
    ModuleRegistry::new()
        .register(CONSOLE_MODULE, |e: &mut Vec<String>| e.push("console".into()))
        .register(tickloop::process::MODULE_NAME, |e: &mut Vec<String>| {
            e.push("process".into())
        })
}

#[test]
fn builder_installs_registered_modules() {
    let event_loop = Loop::builder(Vec::new())
        .registry(modules())
        .build()
        .unwrap();
    assert_eq!(
        event_loop.with_engine(|e| e.clone()),
        Some(vec!["console".to_string(), "process".to_string()])
    );
}

#[test]
fn builder_skips_console_when_disabled() {
    let event_loop = Loop::builder(Vec::new())
        .registry(modules())
        .enable_console(false)
        .build()
        .unwrap();
    assert_eq!(
        event_loop.with_engine(|e| e.clone()),
        Some(vec!["process".to_string()])
    );
}

#[test]
fn builder_reads_toml_settings() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        "[event_loop]\nenable_console = false\nmin_interval = \"20ms\"\nthread_name = \"configured\""
    )
    .unwrap();

    let event_loop = Loop::builder(Vec::new())
        .registry(modules())
        .with_toml(file.path().to_str().unwrap())
        .build()
        .unwrap();
    assert_eq!(
        event_loop.with_engine(|e| e.clone()),
        Some(vec!["process".to_string()])
    );

    event_loop.start().unwrap();
    let (tx, rx) = mpsc::channel();
    event_loop.run_on_loop(move |_| {
        tx.send(thread::current().name().map(String::from)).unwrap();
    });
    assert_eq!(rx.recv_timeout(WAIT).unwrap().as_deref(), Some("configured"));

    // A zero interval ticks at the configured 20ms minimum.
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let interval = event_loop.set_interval(
        move |_| {
            let _ = tx.send(started.elapsed());
        },
        Duration::ZERO,
    );
    assert!(rx.recv_timeout(WAIT).unwrap() >= Duration::from_millis(20));
    event_loop.clear_interval(interval);
    event_loop.stop();
}

#[test]
fn builder_accepts_explicit_config_and_shared_runtime() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();

    let event_loop = Loop::builder(0u32)
        .config(LoopConfig {
            thread_name: "shared-timers".to_string(),
            ..LoopConfig::default()
        })
        .timer_handle(runtime.handle().clone())
        .build()
        .unwrap();

    let handle = event_loop.clone();
    event_loop.run(move |_| {
        handle.set_timeout(|n| *n += 1, Duration::from_millis(5));
    });
    assert_eq!(event_loop.with_engine(|n| *n), Some(1));
}

#[test]
fn short_intervals_keep_their_period_under_a_larger_minimum() {
    let event_loop = Loop::builder(0u32)
        .config(LoopConfig {
            min_interval: "200ms".to_string(),
            ..LoopConfig::default()
        })
        .build()
        .unwrap();
    let handle = event_loop.clone();

    let started = Instant::now();
    event_loop.run(move |_| {
        let slot = Arc::new(Mutex::new(None));
        let me = Arc::clone(&slot);
        let inner = handle.clone();
        let interval = handle.set_interval(
            move |ticks: &mut u32| {
                *ticks += 1;
                if *ticks == 3 {
                    if let Some(interval) = *me.lock().unwrap() {
                        inner.clear_interval(interval);
                    }
                }
            },
            Duration::from_millis(5),
        );
        *slot.lock().unwrap() = Some(interval);
    });

    assert_eq!(event_loop.with_engine(|ticks| *ticks), Some(3));
    assert!(started.elapsed() < Duration::from_millis(200));
}
