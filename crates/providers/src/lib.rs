//! Remote text-generation providers for chatbridge.
//!
//! All providers implement the `chatbridge_core::Provider` trait.
//! [`build_from_config`] assembles the primary → secondary chain the
//! remote resolution tier talks to.

pub mod builder;
pub mod fallback;
pub mod huggingface;
pub mod lexicon;

pub use builder::build_from_config;
pub use fallback::FallbackProvider;
pub use huggingface::HuggingFaceProvider;
pub use lexicon::{Lexicon, LexiconProvider};
