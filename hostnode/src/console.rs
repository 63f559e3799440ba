// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-blocking console.
//!
//! Writers collect a line and hand it to the printer thread.
//! Lines are dropped, if the printer can't keep up.

use std::{
    fmt,
    io::Write as _,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
};

const QUEUE_LEN: usize = 64;

pub struct Console {
    tx: mpsc::SyncSender<String>,
    dropped: Arc<AtomicUsize>,
    line: String,
}

pub struct Printer {
    rx: mpsc::Receiver<String>,
    dropped: Arc<AtomicUsize>,
}

pub fn console() -> (Console, Printer) {
    let (tx, rx) = mpsc::sync_channel(QUEUE_LEN);
    let dropped = Arc::new(AtomicUsize::new(0));
    (
        Console {
            tx,
            dropped: Arc::clone(&dropped),
            line: String::new(),
        },
        Printer { rx, dropped },
    )
}

impl Console {
    fn flush_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if self.tx.try_send(line).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Clone for Console {
    /// Another writer with its own line buffer.
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
            line: String::new(),
        }
    }
}

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for part in s.split_inclusive('\n') {
            self.line.push_str(part);
            if part.ends_with('\n') {
                self.flush_line();
            }
        }
        Ok(())
    }
}

impl Printer {
    /// Print lines until all writers are gone.
    pub fn run(self) {
        let mut reported = 0;
        for line in self.rx {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();

            let dropped = self.dropped.load(Ordering::Relaxed);
            if dropped != reported {
                eprintln!("Console: {} lines dropped", dropped - reported);
                reported = dropped;
            }
        }
    }

    /// Lines waiting for the printer.
    #[cfg(test)]
    pub fn queued(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fmt::Write as _;

    #[test]
    fn test_lines() {
        let (mut con, printer) = console();
        let _ = write!(con, "abc");
        let _ = write!(con, "def\r\n\r\nx\r\n");
        let _ = write!(con, "unfinished");
        assert_eq!(printer.queued(), ["abcdef", "", "x"]);
    }

    #[test]
    fn test_clone_has_own_line() {
        let (mut con, printer) = console();
        let mut con2 = con.clone();
        let _ = write!(con, "one ");
        let _ = writeln!(con2, "two");
        let _ = writeln!(con, "three");
        assert_eq!(printer.queued(), ["two", "one three"]);
    }

    #[test]
    fn test_full_drops() {
        let (mut con, printer) = console();
        for i in 0..QUEUE_LEN + 10 {
            let _ = writeln!(con, "{i}");
        }
        assert_eq!(printer.dropped.load(Ordering::Relaxed), 10);
        assert_eq!(printer.queued().len(), QUEUE_LEN);
    }
}

// vim: ts=4 sw=4 expandtab
