//! This is a library for validating objects, such as data entry
//! forms, against declarative rules.
//!
//! Typically to use this library, you would describe the rules for
//! each field of your object in a [RuleTree](RuleTree), composing
//! checks such as [is_required()](is_required()) or
//! [length()](length()) with [v!](v!), and build an
//! [ObjectValidator](ObjectValidator) from it with
//! [validate()](validate()). Validating an object returns only the
//! fields that failed, each with its failure messages.
//!
//! ```
//! use object_validation::{is_required, is_valid, length, password_complexity, v, validate, RuleTree};
//! use serde_json::json;
//!
//! let validator = validate(
//!     RuleTree::new()
//!         .field("username", v![is_required(()), length(json!({ "length": 6 }))])
//!         .field("password", v![is_required(()), password_complexity(())]),
//! );
//!
//! let result = validator.validate(&json!({ "username": "bob", "password": "Secret1" }));
//! assert!(!is_valid(&result));
//! assert_eq!(
//!     Some(&["has to be at least 6 characters long".to_string()][..]),
//!     result.messages("username")
//! );
//! assert_eq!(None, result.messages("password"));
//! ```
//!
//! Your own rules are built with [create_validation()](create_validation()),
//! [with_validation()](with_validation()) or, for predicates that
//! report validity, [transform_validator()](transform_validator()).
//!
//! Default messages and the message transforms (templating of
//! `{{name}}` placeholders, localization) live in a
//! [DefaultsStore](DefaultsStore). The free functions of this crate
//! use a process-wide store, changed with
//! [set_defaults()](set_defaults()).

#![cfg_attr(docsrs, feature(doc_cfg))]

mod concat_results;
mod defaults;
mod error;
mod factory;
mod message;
mod object;
pub mod rules;
mod validatable;
mod validation;
mod validation_result;
mod validator;
mod validator_fn;

pub use concat_results::concat_results;
pub use defaults::*;
pub use error::*;
pub use factory::*;
pub use message::*;
pub use object::*;
pub use rules::{email, is_number, is_required, length, match_field, password_complexity};
pub use validatable::*;
pub use validation::*;
pub use validation_result::*;
pub use validator::*;
pub use validator_fn::*;
