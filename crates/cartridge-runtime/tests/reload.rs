//! Hot-reload tests: cold swaps, memory migration, failure recovery, and
//! the filesystem watcher path.

use std::fs;
use std::io::Write as _;
use std::time::{Duration, Instant};

use cartridge_runtime::{BackendCall, HeadlessBackend, ReloadState, Session};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();
}

fn write_module(wat: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(wat.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CLEAR_BLACK: BackendCall = BackendCall::Clear(cartridge_runtime::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
});

#[test]
fn cold_reload_runs_old_teardown_then_fresh_setup() {
    init_logging();
    // Flags 2: setup-after-reload, watcher off (reload is requested
    // manually). Teardown paints a black clear as its marker.
    let first = r#"(module
        (import "env" "ConfigSetFlags" (func $set (param i32)))
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (import "env" "GraphicsClear" (func $clear (param f32 f32 f32 f32)))
        (memory (export "memory") 1)
        (func (export "config") (call $set (i32.const 2)))
        (func (export "setup") (call $target (i32.const 1) (i32.const 1)))
        (func (export "teardown")
          (call $clear (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 1))))"#;
    let second = r#"(module
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (memory (export "memory") 1)
        (func (export "setup") (call $target (i32.const 2) (i32.const 2))))"#;

    let file = write_module(first);
    let backend = HeadlessBackend::new();
    let recorder = backend.recorder();
    let mut session = Session::new(file.path(), Box::new(backend)).unwrap();

    fs::write(file.path(), second).unwrap();
    session.request_reload();
    assert!(session.frame());

    assert_eq!(*session.reload_state(), ReloadState::Idle);
    assert_eq!(
        recorder.lock().as_slice(),
        [
            BackendCall::SetTargetSize(1, 1),
            CLEAR_BLACK,
            BackendCall::SetTargetSize(2, 2),
        ]
    );
}

#[test]
fn migrating_reload_carries_memory_and_skips_lifecycle_calls() {
    init_logging();
    // The old module spans two pages and plants a marker beyond the first
    // page boundary; the new module declares only one page, forcing the
    // migration to grow it. Teardown (rectangle) and setup (target size)
    // markers must not appear for a migrating swap.
    let first = r#"(module
        (import "env" "ConfigSetFlags" (func $set (param i32)))
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (import "env" "GraphicsClear" (func $clear (param f32 f32 f32 f32)))
        (import "env" "GraphicsRectangle"
          (func $rect (param f32 f32 f32 f32 f32 f32 f32 f32 i32)))
        (memory (export "memory") 2)
        (func (export "config") (call $set (i32.const 0)))
        (func (export "setup")
          (call $target (i32.const 7) (i32.const 7))
          (i32.store (i32.const 70000) (i32.const 171)))
        (func (export "update")
          (if (i32.eq (i32.load (i32.const 70000)) (i32.const 171))
            (then (call $clear (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 1)))))
        (func (export "teardown")
          (call $rect (f32.const 0) (f32.const 0) (f32.const 1) (f32.const 1)
                      (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 0)
                      (i32.const 0))))"#;
    let second = r#"(module
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (import "env" "GraphicsClear" (func $clear (param f32 f32 f32 f32)))
        (memory (export "memory") 1)
        (func (export "setup")
          (call $target (i32.const 9) (i32.const 9))
          (i32.store (i32.const 1024) (i32.const 55)))
        (func (export "update")
          (if (i32.eq (i32.load (i32.const 70000)) (i32.const 171))
            (then (call $clear (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 1))))))"#;

    let file = write_module(first);
    let backend = HeadlessBackend::new();
    let recorder = backend.recorder();
    let mut session = Session::new(file.path(), Box::new(backend)).unwrap();

    assert!(session.frame());
    assert_eq!(recorder.lock().len(), 2); // setup marker + one clear

    fs::write(file.path(), second).unwrap();
    session.request_reload();
    assert!(session.frame());

    assert_eq!(*session.reload_state(), ReloadState::Idle);
    let calls = recorder.lock();
    // No teardown rectangle, no fresh setup marker; the new instance sees
    // the migrated marker and keeps clearing.
    assert!(!calls.iter().any(|c| matches!(c, BackendCall::Rectangle { .. })));
    assert!(!calls.contains(&BackendCall::SetTargetSize(9, 9)));
    assert_eq!(calls.iter().filter(|c| **c == CLEAR_BLACK).count(), 2);
}

#[test]
fn failed_reload_keeps_the_old_instance_running() {
    init_logging();
    let good = r#"(module
        (import "env" "ConfigSetFlags" (func $set (param i32)))
        (import "env" "GraphicsClear" (func $clear (param f32 f32 f32 f32)))
        (memory (export "memory") 1)
        (func (export "config") (call $set (i32.const 0)))
        (func (export "update")
          (call $clear (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 1))))"#;

    let file = write_module(good);
    let backend = HeadlessBackend::new();
    let recorder = backend.recorder();
    let mut session = Session::new(file.path(), Box::new(backend)).unwrap();

    assert!(session.frame());
    assert_eq!(recorder.lock().len(), 1);

    fs::write(file.path(), "not a wasm module").unwrap();
    session.request_reload();
    assert!(session.frame());

    assert!(matches!(session.reload_state(), ReloadState::Failed(_)));
    // Old instance still drives frames.
    assert_eq!(recorder.lock().len(), 2);

    // A later good write recovers on the next requested reload. The new
    // module has no config; flags stay as the session declared them.
    let recovered = r#"(module
        (import "env" "GraphicsClear" (func $clear (param f32 f32 f32 f32)))
        (memory (export "memory") 1)
        (func (export "update")
          (call $clear (f32.const 0) (f32.const 0) (f32.const 0) (f32.const 1))))"#;
    fs::write(file.path(), recovered).unwrap();
    session.request_reload();
    assert!(session.frame());

    assert_eq!(*session.reload_state(), ReloadState::Idle);
    assert_eq!(recorder.lock().len(), 3);
}

#[test]
fn watcher_triggers_a_reload_on_file_write() {
    init_logging();
    // Flags 3: hot reload on, setup-after-reload on, so the swap shows up
    // as the new module's setup marker.
    let first = r#"(module
        (import "env" "ConfigSetFlags" (func $set (param i32)))
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (memory (export "memory") 1)
        (func (export "config") (call $set (i32.const 3)))
        (func (export "setup") (call $target (i32.const 1) (i32.const 1))))"#;
    let second = r#"(module
        (import "env" "GraphicsSetTargetSize" (func $target (param i32 i32)))
        (memory (export "memory") 1)
        (func (export "setup") (call $target (i32.const 2) (i32.const 2))))"#;

    let file = write_module(first);
    let backend = HeadlessBackend::new();
    let recorder = backend.recorder();
    let mut session = Session::new(file.path(), Box::new(backend)).unwrap();

    fs::write(file.path(), second).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut reloaded = false;
    while Instant::now() < deadline {
        assert!(session.frame());
        if recorder.lock().contains(&BackendCall::SetTargetSize(2, 2)) {
            reloaded = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    assert!(reloaded, "watcher never delivered the module change");
}
