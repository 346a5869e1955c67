//! The Market Secret Core - shared domain types and access policy.
//!
//! This crate provides the types and pure decision logic used by the portal:
//! - identities and profiles as delivered by the hosted auth/data service
//! - course videos and success stories managed from the admin dashboard
//! - the access policy (admin vs student) and the route gating built on it
//! - subscription-tier visibility for the student catalog
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! HTTP clients, no clocks except where a caller passes a timestamp in. Every
//! rule that decides who sees what lives here so it can be tested without a
//! server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, tiers and roles
//! - [`identity`] - Signed-in identity and profile records
//! - [`content`] - Videos, success stories and their form drafts
//! - [`policy`] - Role classification and the route state machine
//! - [`visibility`] - Tier gating and module filtering for students
//! - [`topics`] - Landing page expand/collapse state
//! - [`fixtures`] - Seed catalog used when no backend is configured

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod content;
pub mod fixtures;
pub mod identity;
pub mod policy;
pub mod topics;
pub mod types;
pub mod visibility;

pub use content::{ContentEntity, StoryDraft, SuccessStory, ValidationError, Video, VideoDraft};
pub use identity::{Identity, Profile, StudentContext};
pub use policy::{AccessPolicy, PortalPath, RouteDecision, View};
pub use topics::TopicToggles;
pub use types::*;
pub use visibility::{ModuleFilter, can_view, modules_of, visible_videos};
