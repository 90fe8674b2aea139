//! Lightweight terminal progress bar without external dependencies.
//!
//! Renders message, bar, pos/len, percentage and ETA on stderr, redrawing
//! in place with a carriage return. Status text lines scroll above the bar.

use super::ProgressTrait;
use std::cmp::min;
use std::env;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	start: Instant,
}

impl Inner {
	fn redraw(&self) {
		let len = self.len.max(1);
		let pos = self.pos.min(len);
		let percent = (pos as f64 * 100.0 / len as f64).floor() as u64;

		let elapsed = self.start.elapsed().as_secs_f64();
		let per_sec = if elapsed > 0.0 { pos as f64 / elapsed } else { 0.0 };
		let eta_secs = if per_sec > 0.0 {
			((len - pos) as f64 / per_sec).max(0.0)
		} else {
			0.0
		};
		let eta = format_eta(Duration::from_secs_f64(eta_secs));

		let right = format!("▏{pos}/{len} ({percent:>3}%) {eta:>5}");
		let bar = make_bar(pos, len, bar_width(&self.message, &right));

		let mut stderr = io::stderr();
		let _ = write!(stderr, "\r\x1b[2K{}▕{bar}{right}", self.message);
		let _ = stderr.flush();
	}
}

impl Default for Inner {
	fn default() -> Self {
		Inner {
			message: String::new(),
			len: 0,
			pos: 0,
			start: Instant::now(),
		}
	}
}

/// A terminal progress bar handle, cloneable and thread-safe.
#[derive(Clone, Default)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
}

impl ProgressTrait for ProgressBar {
	fn init(&self, message: &str, max_value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.message = message.to_string();
		inner.len = max_value;
		inner.pos = 0;
		inner.start = Instant::now();
		inner.redraw();
	}

	fn message(&self, text: &str) {
		let inner = self.inner.lock().unwrap();
		// print the status line, then restore the bar underneath it
		let mut stderr = io::stderr();
		let _ = write!(stderr, "\r\x1b[2K{text}\n");
		let _ = stderr.flush();
		inner.redraw();
	}

	fn set_position(&self, value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = min(value, inner.len);
		inner.redraw();
	}

	fn inc(&self, value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = inner.pos.saturating_add(value).min(inner.len);
		inner.redraw();
	}

	fn finish(&self) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = inner.len;
		inner.redraw();
		let _ = io::stderr().write_all(b"\n");
		let _ = io::stderr().flush();
	}

	fn remove(&self) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = inner.len;
		drop(inner);
		let _ = io::stderr().write_all(b"\r\x1b[2K");
		let _ = io::stderr().flush();
	}
}

// Terminal width heuristic: prefer $COLUMNS, fall back to 80.
fn terminal_width() -> usize {
	if let Ok(cols) = env::var("COLUMNS")
		&& let Ok(v) = cols.parse::<usize>()
	{
		return v.max(10);
	}
	80
}

fn bar_width(message: &str, right: &str) -> usize {
	let total = terminal_width();
	let taken = message.chars().count() + right.chars().count() + 1;
	let min_bar = 10usize;
	if total > taken + min_bar { total - taken } else { min_bar }
}

fn make_bar(pos: u64, len: u64, width: usize) -> String {
	let width = width.max(1);
	let frac = (pos as f64 / len.max(1) as f64).clamp(0.0, 1.0);
	let exact = frac * width as f64;
	let whole = exact.floor() as usize;
	let rem = exact - whole as f64;

	// 7 partial block steps between empty and full
	let partials = ["▏", "▎", "▍", "▌", "▋", "▊", "▉"];

	let mut bar = String::with_capacity(width * 3);
	for _ in 0..whole.min(width) {
		bar.push('█');
	}
	if whole < width {
		let idx = (rem * 8.0).floor() as usize;
		if idx > 0 {
			bar.push_str(partials[(idx - 1).min(6)]);
		} else {
			bar.push(' ');
		}
		for _ in (whole + 1)..width {
			bar.push(' ');
		}
	}
	bar
}

fn format_eta(d: Duration) -> String {
	let total = d.as_secs();
	let h = total / 3600;
	let m = (total % 3600) / 60;
	let s = total % 60;
	if h > 0 {
		format!("{h:02}:{m:02}:{s:02}")
	} else {
		format!("{m:02}:{s:02}")
	}
}
