// Resume data adapter: AI resume JSON ⇄ Universal Resume.
// Pure, synchronous transformations. No storage, no network.

pub mod adapter;
pub mod handlers;
pub mod plain_text;
pub mod resolve;
pub mod universal;

pub use adapter::resume_json_to_universal;
pub use plain_text::universal_to_plain_text_cv;
pub use universal::UniversalResumeData;
