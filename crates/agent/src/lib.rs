//! Response resolution — how chatbridge decides what to say.
//!
//! A reply comes from the first tier that produces one:
//!
//! 1. **Keyword** — a fixed reply for the first keyword found in the message
//! 2. **Remote** — text generated by the inference chain
//! 3. **Canned** — a random generic sentence (always answers)
//!
//! If even the canned pool is empty, the resolver answers with a fixed
//! apology, so [`ResponseResolver::resolve`] never fails and never returns
//! an empty string.

pub mod canned;
pub mod keyword;
pub mod remote;
pub mod resolver;

pub use canned::{CannedPool, RandomSource, ThreadRandom};
pub use keyword::{KeywordRule, KeywordTable};
pub use remote::RemoteTier;
pub use resolver::{APOLOGY, ReplySource, Resolution, ResolutionTier, ResponseResolver};
