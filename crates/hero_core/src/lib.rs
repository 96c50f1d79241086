//! Hero media transition engine: interaction gating, audio fades, seamless
//! video looping, scroll gesture classification and view state, composed
//! by [`Orchestrator`] and driven either by hand or through [`HeroRuntime`].

pub mod crossfade;
pub mod fade;
pub mod gate;
pub mod gesture;
pub mod orchestrator;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod view;

#[cfg(test)]
mod test_support;

pub use orchestrator::{HeroMedia, Orchestrator, PlaybackSession};
pub use runtime::{dispatch_command, HeroCommand, HeroRuntime};
pub use settings::{load_settings, load_settings_from, parse_settings, HeroSettings};
