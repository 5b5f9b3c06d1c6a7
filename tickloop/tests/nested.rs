use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickloop::Loop;

type Log = Vec<String>;

#[test]
fn child_interval_stops_itself_after_three_ticks() {
    let event_loop = Loop::new(Log::new()).unwrap();
    let parent = event_loop.clone();

    event_loop.run(move |log| {
        log.push("parent".into());
        parent
            .run_nested(log, |log, child, stop| {
                log.push("child".into());
                let mut ticks = 0;
                child.set_interval(
                    move |log: &mut Log| {
                        ticks += 1;
                        log.push(format!("tick {}", ticks));
                        if ticks == 3 {
                            stop.stop();
                        }
                    },
                    Duration::from_millis(2),
                );
            })
            .unwrap();
        log.push("back".into());
    });

    let log = event_loop.with_engine(|log| log.clone()).unwrap();
    assert_eq!(
        log,
        vec!["parent", "child", "tick 1", "tick 2", "tick 3", "back"]
    );
}

#[test]
fn child_ends_when_its_work_drains() {
    let event_loop = Loop::new(Log::new()).unwrap();
    let parent = event_loop.clone();

    event_loop.run(move |log| {
        parent
            .run_nested(log, |_, child, _| {
                let inner = child.clone();
                child.set_timeout(
                    move |log: &mut Log| {
                        log.push("timeout".into());
                        inner.set_immediate(|log| log.push("immediate".into()));
                    },
                    Duration::from_millis(5),
                );
            })
            .unwrap();
        log.push("back".into());
    });

    let log = event_loop.with_engine(|log| log.clone()).unwrap();
    assert_eq!(log, vec!["timeout", "immediate", "back"]);
}

#[test]
fn parent_timers_wait_while_child_runs() {
    let event_loop = Loop::new(Log::new()).unwrap();
    let parent = event_loop.clone();

    event_loop.run(move |log| {
        parent.set_timeout(|log| log.push("parent timeout".into()), Duration::from_millis(1));
        parent
            .run_nested(log, |_, child, _| {
                child.set_timeout(
                    |log: &mut Log| log.push("child timeout".into()),
                    Duration::from_millis(30),
                );
            })
            .unwrap();
    });

    let log = event_loop.with_engine(|log| log.clone()).unwrap();
    assert_eq!(log, vec!["child timeout", "parent timeout"]);
}

#[test]
fn child_has_no_engine_of_its_own() {
    let event_loop = Loop::new(()).unwrap();
    let parent = event_loop.clone();
    let checked = Arc::new(AtomicBool::new(false));

    let c = Arc::clone(&checked);
    event_loop.run(move |engine| {
        let outer = parent.clone();
        parent
            .run_nested(engine, move |_, child, stop| {
                assert!(child.is_running());
                assert!(child.is_loop_thread());
                assert!(!outer.is_loop_thread());
                assert_eq!(child.with_engine(|_| ()), None);
                assert!(stop.is_running());
                c.store(true, Ordering::SeqCst);
            })
            .unwrap();
    });

    assert!(checked.load(Ordering::SeqCst));
}

#[test]
fn child_panic_propagates_to_the_parent() {
    let event_loop = Loop::new(0u32).unwrap();
    let parent = event_loop.clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        event_loop.run(move |n| {
            parent
                .run_nested(n, |_, child, _| {
                    child.set_timeout(|_| panic!("child boom"), Duration::from_millis(1));
                })
                .unwrap();
        })
    }));
    assert!(result.is_err());
    assert!(!event_loop.is_running());

    event_loop.run(|n| *n += 1);
    assert_eq!(event_loop.with_engine(|n| *n), Some(1));
}
