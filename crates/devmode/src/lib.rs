//! Dev/publish mode toggling for nodes.
//!
//! In dev mode a node directory is a redirect (symlink, or junction on
//! Windows) to an external working checkout. In publish mode it is a real
//! submodule checkout. [`Toggler`] moves nodes between the two, with
//! timestamped backups, and reports status with optional VCS detail.

pub mod backup;
pub mod error;
pub mod link;
pub mod state;
pub mod status;
pub mod toggler;
pub mod vcs;

pub use {
    error::{Error, Result},
    link::LinkKind,
    state::NodeState,
    status::{NodeStatus, VcsInfo},
    toggler::{
        ALL_NODES, Mode, NodeOutcome, Outcome, Step, ToggleOptions, Toggler, TransitionReport,
    },
    vcs::{GitCli, RepoStatus, Vcs},
};
