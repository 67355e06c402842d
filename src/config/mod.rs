//! Unified configuration system.
//!
//! Consolidates configuration from tiers with field-by-field YAML merging:
//! 1. **Defaults** - `Config::default()`
//! 2. **Project** - `$CWD/confpush/config.yaml` and `confpush/plan-*.yaml`
//! 3. **User** - `~/.confpush/config.yaml` and `~/.confpush/plan-*.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `CONFPUSH_CONFIG_PATH` - Explicit config file (skips the tiers)
//! - `CONFPUSH_PROJECT_DIR` - Project config dir (default: `./confpush`)
//! - `CONFPUSH_USER_DIR` - User config dir (default: `~/.confpush`)
//! - `CONFPUSH_ROOT` - Working tree artifacts are written into
//! - `CONFPUSH_GIT_BIN` - git executable
//! - `CONFPUSH_REMOTE` / `CONFPUSH_BRANCH` - Explicit push target

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
