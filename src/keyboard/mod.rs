//! Keyboard identity, layouts, suppression and state

mod event;
mod fallback;
mod key;
pub mod layout;
mod state;
mod suppress;

pub use event::{KeyEvent, KeyEventType};
pub use fallback::{hook_key, resolve_polled, FallbackListener};
pub use key::{fold_case, resolve, CanonicalKey, NamedKey};
pub use layout::{KeyCap, KeySlot, LayoutId, LayoutTable};
pub use state::{KeyVisualState, KeyboardState};
pub use suppress::{SuppressionPolicy, ALWAYS_SUPPRESSED};
