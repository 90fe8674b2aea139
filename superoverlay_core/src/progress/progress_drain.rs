//! No-op progress indicator.
//!
//! Satisfies the progress interface without producing any terminal output.
//! Used under test and wherever a caller has no terminal to draw on.

use super::ProgressTrait;

#[derive(Clone, Copy, Default)]
pub struct ProgressDrain;

impl ProgressTrait for ProgressDrain {
	fn init(&self, _message: &str, _max_value: u64) {}

	fn message(&self, _text: &str) {}

	fn set_position(&self, _value: u64) {}

	fn inc(&self, _value: u64) {}

	fn finish(&self) {}

	fn remove(&self) {}
}
