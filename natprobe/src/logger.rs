use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// Background file logger: lines go through a channel to a writer thread
/// so the query path never blocks on disk.
#[derive(Clone)]
pub struct Logger {
    tx: Sender<String>,
}

impl Logger {
    pub fn start(log_path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = log_path.into();
        let (tx, rx) = mpsc::channel::<String>();

        thread::spawn(move || {
            let file = OpenOptions::new().create(true).append(true).open(&path);
            if let Ok(mut file) = file {
                while let Ok(line) = rx.recv() {
                    let _ = writeln!(file, "{}", line);
                }
            }
        });

        Ok(Logger { tx })
    }

    pub fn info(&self, msg: &str) {
        let _ = self.tx.send(format!("[INFO][{}] {}", timestamp(), msg));
    }

    pub fn error(&self, msg: &str) {
        let _ = self.tx.send(format!("[ERROR][{}] {}", timestamp(), msg));
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
