// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod carving;
mod composition;
mod ingress;
