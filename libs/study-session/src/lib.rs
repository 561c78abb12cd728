//! Study session layer: storage and recognition collaborator interfaces,
//! corpus-backed search, and the review deck scheduler.
//!
//! Built on `hanzi-core` for lexing, pinyin validation, and matching. The
//! durable storage engine, OCR service, and UI sit behind the traits
//! defined here.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod recognition;
pub mod search;
pub mod session;
pub mod store;

pub use error::{SessionError, StoreError};
pub use recognition::{HanziIndex, ImageSource, RecognizeError, RecognizedText, TextRecognizer};
pub use search::SearchService;
pub use session::{DeckTab, ReviewSession};
pub use store::{MemoryStore, StudyStore};
