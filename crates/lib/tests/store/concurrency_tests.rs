//! Mutual exclusion between sessions.
//!
//! `flock` locks belong to the open file description, so sessions on separate
//! threads contend the same way sessions in separate processes do.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use dbmkv_lib::{KvBackend, Session, SessionMode};

use super::common::TestStore;

fn read_counter(session: &Session) -> dbmkv_lib::Result<u64> {
  let raw = session.get(b"counter")?;
  Ok(
    raw
      .map(|bytes| String::from_utf8(bytes).unwrap().parse().unwrap())
      .unwrap_or(0),
  )
}

#[test]
fn concurrent_increments_are_not_lost() {
  const THREADS: usize = 4;
  const INCREMENTS: usize = 10;

  let env = TestStore::new();
  let barrier = Arc::new(Barrier::new(THREADS));

  let handles: Vec<_> = (0..THREADS)
    .map(|_| {
      let config = env.config();
      let barrier = Arc::clone(&barrier);
      thread::spawn(move || {
        barrier.wait();
        for _ in 0..INCREMENTS {
          Session::scoped(&config, SessionMode::ReadWrite, |session| {
            let current = read_counter(session)?;
            // Widen the read-modify-write window.
            thread::sleep(Duration::from_millis(1));
            session.insert(b"counter", (current + 1).to_string().as_bytes())
          })
          .unwrap();
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }

  let total = env.store.get("counter").unwrap().unwrap();
  assert_eq!(String::from_utf8(total).unwrap(), (THREADS * INCREMENTS).to_string());
}

#[test]
fn reader_waits_for_writer() {
  let env = TestStore::new();
  env.store.set("k", b"before").unwrap();

  let writer = Session::open(&env.config(), SessionMode::ReadWrite).unwrap();
  writer.insert(b"k", b"after").unwrap();

  let (started_tx, started_rx) = mpsc::channel();
  let (result_tx, result_rx) = mpsc::channel();
  let store = env.store.clone();
  let reader = thread::spawn(move || {
    started_tx.send(()).unwrap();
    result_tx.send(store.get("k").unwrap()).unwrap();
  });

  started_rx.recv().unwrap();
  thread::sleep(Duration::from_millis(200));
  assert_eq!(result_rx.try_recv(), Err(TryRecvError::Empty));

  writer.close().unwrap();
  let seen = result_rx.recv_timeout(Duration::from_secs(10)).unwrap();
  assert_eq!(seen, Some(b"after".to_vec()));
  reader.join().unwrap();
}

#[test]
fn writer_waits_for_reader() {
  let env = TestStore::new();
  env.store.set("k", b"v1").unwrap();

  let reader = Session::open(&env.config(), SessionMode::ReadOnly).unwrap();

  let (done_tx, done_rx) = mpsc::channel();
  let store = env.store.clone();
  let writer = thread::spawn(move || {
    store.set("k", b"v2").unwrap();
    done_tx.send(()).unwrap();
  });

  thread::sleep(Duration::from_millis(200));
  assert_eq!(done_rx.try_recv(), Err(TryRecvError::Empty));
  assert_eq!(reader.get(b"k").unwrap(), Some(b"v1".to_vec()));

  reader.close().unwrap();
  done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
  writer.join().unwrap();
  assert_eq!(env.store.get("k").unwrap(), Some(b"v2".to_vec()));
}

#[test]
fn readers_do_not_wait_for_each_other() {
  let env = TestStore::new();
  env.store.set("k", b"v").unwrap();

  let held = Session::open(&env.config(), SessionMode::ReadOnly).unwrap();

  let (tx, rx) = mpsc::channel();
  let store = env.store.clone();
  let other = thread::spawn(move || {
    tx.send(store.get("k").unwrap()).unwrap();
  });

  let seen = rx.recv_timeout(Duration::from_secs(10)).unwrap();
  assert_eq!(seen, Some(b"v".to_vec()));
  other.join().unwrap();
  held.close().unwrap();
}

#[test]
fn parallel_writers_keep_every_key() {
  const THREADS: usize = 8;

  let env = TestStore::new();
  let handles: Vec<_> = (0..THREADS)
    .map(|i| {
      let store = env.store.clone();
      thread::spawn(move || {
        for j in 0..5 {
          store.set(&format!("w{i}/{j}"), format!("{i}-{j}").as_bytes()).unwrap();
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }

  let mut keys = env.store.scan_prefix("w").unwrap();
  keys.sort();
  assert_eq!(keys.len(), THREADS * 5);
  assert_eq!(env.store.get("w3/4").unwrap(), Some(b"3-4".to_vec()));
}

#[test]
fn failed_open_does_not_deadlock_later_calls() {
  let env = TestStore::new();
  let config = env.config();
  std::fs::write(&config.path, b"not a store").unwrap();

  assert!(env.store.get("k").is_err());
  assert!(env.store.set("k", b"v").is_err());

  std::fs::remove_file(&config.path).unwrap();
  env.store.set("k", b"v").unwrap();
  assert_eq!(env.store.get("k").unwrap(), Some(b"v".to_vec()));
}
