//! # User Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the compiled tree for the user query
//! language, a small filter/sort language that end users type into a single
//! search box.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison operators (`=`, `!=`, `^`, `*`, `<`, ...)
//! - **[query]** - Comparisons, conjunctions, the disjunctive query and the sort clause
//!
//! ## Quick Start
//!
//! ```text
//! rating > 5 & title * "waffles", genre = "jazz" orderby title
//! ```
//!
//! This query keeps records rated above 5 whose title contains "waffles",
//! plus every jazz record, ordered by title.
//!
//! ## Core Concepts
//!
//! ### Groups
//!
//! - `&` joins comparisons inside one group (logical AND)
//! - `,` separates groups (logical OR)
//!
//! ### Bare Literals
//!
//! A literal with no field name is compared against the schema's default
//! field with `*` (contains):
//!
//! ```text
//! 'waffles'          // same as: title * 'waffles'
//! ```
//!
//! ### Sorting
//!
//! `orderby <field>` and `orderbydescending <field>` may appear anywhere a
//! separator may. Only the last one counts.
//!
//! ## Tree Shape
//!
//! The compiled [`Query`] is a disjunction of [`Conjunction`]s of
//! [`Comparison`]s. It can be interpreted directly over in-memory records
//! (see [`crate::evaluator`]) or translated into another query language by an
//! adapter.
pub mod operators;
pub mod query;
pub mod tokens;

pub use operators::Operator;
pub use query::{Comparison, Conjunction, Operand, Query, SortClause};
pub use tokens::Token;
