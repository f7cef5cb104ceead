use crate::audio::AudioClip;
use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
	#[error("resource not found at {0}")]
	NotFound(String),
	#[error("failed to fetch resource: {0}")]
	Fetch(String),
	#[error("loader dropped the request without answering")]
	Dropped,
}

/// Fetches resources from disk or the network. Completion can happen on any
/// later frame (or thread); the session polls once per update.
pub trait ResourceLoader {
	fn load_audio_clip(&mut self, path: &str, cache_if_remote: bool) -> PendingClip;
}

pub type ClipSender = oneshot::Sender<Result<AudioClip, LoadError>>;

#[derive(Debug)]
pub struct PendingClip(oneshot::Receiver<Result<AudioClip, LoadError>>);
impl PendingClip {
	pub fn channel() -> (ClipSender, PendingClip) {
		let (tx, rx) = oneshot::channel();
		(tx, PendingClip(rx))
	}
	pub fn ready(clip: AudioClip) -> Self {
		Self::finished(Ok(clip))
	}
	pub fn failed(error: LoadError) -> Self {
		Self::finished(Err(error))
	}
	fn finished(result: Result<AudioClip, LoadError>) -> Self {
		let (tx, pending) = Self::channel();
		let _ = tx.send(result);
		pending
	}

	/// `None` while the load is still in flight.
	pub fn poll(&mut self) -> Option<Result<AudioClip, LoadError>> {
		match self.0.try_recv() {
			Ok(result) => Some(result),
			Err(TryRecvError::Empty) => None,
			Err(TryRecvError::Closed) => Some(Err(LoadError::Dropped)),
		}
	}
}

/// Loader for hosts that only ever hand blocks in-memory clips.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoader;
impl ResourceLoader for NoLoader {
	fn load_audio_clip(&mut self, path: &str, _cache_if_remote: bool) -> PendingClip {
		PendingClip::failed(LoadError::NotFound(path.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pending_until_sent() {
		let (tx, mut pending) = PendingClip::channel();
		assert_eq!(pending.poll(), None);
		tx.send(Ok(AudioClip::new("click"))).unwrap();
		assert_eq!(pending.poll(), Some(Ok(AudioClip::new("click"))));
	}

	#[test]
	fn dropped_sender_is_a_failure() {
		let (tx, mut pending) = PendingClip::channel();
		drop(tx);
		assert_eq!(pending.poll(), Some(Err(LoadError::Dropped)));
	}
}
