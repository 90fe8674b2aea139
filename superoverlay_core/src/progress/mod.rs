//! Progress reporting for long-running tile generation.
//!
//! The engine reports through the [`ProgressTrait`] interface: a textual
//! status channel plus positional ticks. All calls happen synchronously on
//! the generating thread; implementations must not block indefinitely.
//!
//! [`get_progress_bar`] picks the terminal bar in normal builds and the
//! silent drain under test, so test output stays clean.

mod progress_bar;
mod progress_drain;

pub use progress_bar::ProgressBar;
pub use progress_drain::ProgressDrain;

/// Interface for progress indicators.
pub trait ProgressTrait: Send + Sync {
	/// Resets the indicator with a task description and a maximum value.
	fn init(&self, message: &str, max_value: u64);

	/// Publishes a line of status text without changing the position.
	fn message(&self, text: &str);

	/// Sets the absolute position.
	fn set_position(&self, value: u64);

	/// Advances the position by `value`.
	fn inc(&self, value: u64);

	/// Completes the indicator.
	fn finish(&self);

	/// Removes the indicator from the terminal.
	fn remove(&self);
}

/// Factory for a boxed progress indicator matching the build configuration.
#[must_use]
pub fn get_progress_bar(message: &str, max_value: u64) -> Box<dyn ProgressTrait> {
	#[cfg(all(not(feature = "test"), not(test)))]
	let progress = ProgressBar::default();
	#[cfg(any(feature = "test", test))]
	let progress = ProgressDrain::default();
	progress.init(message, max_value);
	Box::new(progress)
}
