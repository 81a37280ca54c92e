// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for stack manifests
//!
//! # Subject Pattern
//!
//! ```text
//! stacks.{stack}.{operation}
//! ```
//!
//! This allows for:
//! - Precise subscriptions (`stacks.image-reader.declared`)
//! - Stack-level wildcards (`stacks.image-reader.>`)
//! - Global subscriptions (`stacks.>`)
//!
//! # Examples
//!
//! ```rust
//! use cim_app_stack::subjects::{SubjectBuilder, StackOperation};
//!
//! let subject = SubjectBuilder::new("image-reader").build(StackOperation::Declared);
//! assert_eq!(subject, "stacks.image-reader.declared");
//!
//! let wildcard = SubjectBuilder::new("image-reader").build_wildcard();
//! assert_eq!(wildcard, "stacks.image-reader.>");
//! ```

use std::fmt;

/// Root namespace for all stack subjects
pub const STACKS_ROOT: &str = "stacks";

/// Events published about a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackOperation {
    /// A complete manifest was composed and handed off for realization
    Declared,
}

impl fmt::Display for StackOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackOperation::Declared => write!(f, "declared"),
        }
    }
}

/// Builder for stack NATS subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    stack: String,
}

impl SubjectBuilder {
    /// Subjects for one stack; the name is already a valid subject token
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
        }
    }

    /// Returns: `stacks.{stack}.{operation}`
    pub fn build(&self, operation: StackOperation) -> String {
        format!("{}.{}.{}", STACKS_ROOT, self.stack, operation)
    }

    /// Returns: `stacks.{stack}.>`
    pub fn build_wildcard(&self) -> String {
        format!("{}.{}.>", STACKS_ROOT, self.stack)
    }

    /// Returns: `stacks.>`
    pub fn build_all() -> String {
        format!("{}.>", STACKS_ROOT)
    }
}

/// `stacks.{stack}.declared`
pub fn stack_declared(stack: &str) -> String {
    SubjectBuilder::new(stack).build(StackOperation::Declared)
}
