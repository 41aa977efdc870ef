use crate::{SaveManager, SaveSlot};
use deckclimb_core::Profile;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum Message {
    Snapshot(Box<Profile>),
    Stop,
}

/// Background writer fed with profile snapshots.
///
/// Only the newest snapshot is kept; it is written once per interval and
/// flushed on `stop()` or drop.
pub struct Autosaver {
    sender: Option<Sender<Message>>,
    handle: Option<JoinHandle<()>>,
}

impl Autosaver {
    pub fn spawn(manager: SaveManager, slot: SaveSlot, interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let interval = interval.max(Duration::from_millis(10));
        let handle = thread::spawn(move || {
            let mut pending: Option<Box<Profile>> = None;
            let mut deadline = Instant::now() + interval;
            loop {
                let wait = deadline.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(wait) {
                    Ok(Message::Snapshot(profile)) => pending = Some(profile),
                    Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => {
                        flush(&manager, slot, &mut pending);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }
                if Instant::now() >= deadline {
                    flush(&manager, slot, &mut pending);
                    deadline = Instant::now() + interval;
                }
            }
            tracing::debug!(%slot, "autosaver stopped");
        });
        tracing::info!(%slot, interval_secs = interval.as_secs(), "autosave enabled");
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Queues a snapshot; replaces any snapshot not yet written.
    pub fn submit(&self, profile: &Profile) {
        if let Some(sender) = &self.sender {
            if sender.send(Message::Snapshot(Box::new(profile.clone()))).is_err() {
                tracing::warn!("autosaver thread is gone; snapshot dropped");
            }
        }
    }

    /// Writes any pending snapshot and joins the worker.
    pub fn stop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Message::Stop);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("autosaver thread panicked");
            }
        }
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn flush(manager: &SaveManager, slot: SaveSlot, pending: &mut Option<Box<Profile>>) {
    let Some(profile) = pending.take() else {
        return;
    };
    match manager.save(slot, &profile) {
        Ok(()) => tracing::info!(%slot, "autosaved"),
        Err(err) => tracing::warn!(%slot, error = %err, "autosave failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_flushes_the_latest_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = SaveManager::new(dir.path());
        let slot = SaveSlot::default();
        let mut saver = Autosaver::spawn(manager.clone(), slot, Duration::from_secs(3600));

        let mut profile = Profile::new();
        saver.submit(&profile);
        profile.level = 7;
        saver.submit(&profile);
        saver.stop();

        let loaded = manager.load(slot).expect("load").expect("saved");
        assert_eq!(loaded.level, 7);
    }

    #[test]
    fn short_interval_writes_without_stopping() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = SaveManager::new(dir.path());
        let slot = SaveSlot::new(2).expect("slot");
        let saver = Autosaver::spawn(manager.clone(), slot, Duration::from_millis(20));

        let mut profile = Profile::new();
        profile.experience = 42;
        saver.submit(&profile);

        let started = Instant::now();
        while !manager.exists(slot) && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(manager.exists(slot));
        drop(saver);
        let loaded = manager.load(slot).expect("load").expect("saved");
        assert_eq!(loaded.experience, 42);
    }

    #[test]
    fn nothing_is_written_without_snapshots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = SaveManager::new(dir.path());
        let mut saver = Autosaver::spawn(manager.clone(), SaveSlot::default(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));
        saver.stop();
        assert!(manager.occupied_slots().is_empty());
    }
}
