use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

/// Cooperative cancellation flag, checked by the tile splitter between
/// stack iterations. Cloning shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
	cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Relaxed)
	}
}
