// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The closed set of local operations and their argument checks.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::id_key;

/// Root type an operation is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => f.write_str("Query"),
            OperationKind::Mutation => f.write_str("Mutation"),
        }
    }
}

/// Name of a local operation, without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationName {
    CurrentUser,
    JwtToken,
    DappUser,
    SignIn,
    ConfirmUser,
    ConfirmDappUser,
}

impl OperationName {
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationName::CurrentUser => "currentUser",
            OperationName::JwtToken => "jwtToken",
            OperationName::DappUser => "dappUser",
            OperationName::SignIn => "signIn",
            OperationName::ConfirmUser => "confirmUser",
            OperationName::ConfirmDappUser => "confirmDappUser",
        }
    }

    pub const fn kind(self) -> OperationKind {
        match self {
            OperationName::CurrentUser | OperationName::JwtToken | OperationName::DappUser => {
                OperationKind::Query
            }
            OperationName::SignIn
            | OperationName::ConfirmUser
            | OperationName::ConfirmDappUser => OperationKind::Mutation,
        }
    }

    /// Validate `args` and build the operation.
    pub fn with_args(self, args: &Map<String, Value>) -> Result<Operation, ValidationError> {
        match self {
            OperationName::CurrentUser => Ok(Operation::CurrentUser),
            OperationName::JwtToken => Ok(Operation::JwtToken),
            OperationName::DappUser => {
                Operation::dapp_user(id_arg(args, "dappUserId").as_deref().unwrap_or_default())
            }
            OperationName::SignIn => Operation::sign_in(
                str_arg(args, "email").unwrap_or_default(),
                str_arg(args, "password").unwrap_or_default(),
            ),
            OperationName::ConfirmUser => Operation::confirm_user(
                str_arg(args, "oneTimeKey").unwrap_or_default(),
                str_arg(args, "password").unwrap_or_default(),
            ),
            OperationName::ConfirmDappUser => {
                Operation::confirm_dapp_user(str_arg(args, "requestKey").unwrap_or_default())
            }
        }
    }
}

/// A validated local operation.
///
/// Constructors reject missing or empty required arguments, so a value of
/// this type is always safe to execute.
#[derive(Clone, PartialEq, Eq)]
pub enum Operation {
    CurrentUser,
    JwtToken,
    DappUser { dapp_user_id: String },
    SignIn { email: String, password: String },
    ConfirmUser { one_time_key: String, password: String },
    ConfirmDappUser { request_key: String },
}

impl Operation {
    pub fn dapp_user(dapp_user_id: &str) -> Result<Self, ValidationError> {
        require(
            dapp_user_id,
            ValidationError::missing("dappUser", "dappUserId", "You must pass the dappUserId"),
        )?;
        Ok(Operation::DappUser {
            dapp_user_id: dapp_user_id.to_string(),
        })
    }

    pub fn sign_in(email: &str, password: &str) -> Result<Self, ValidationError> {
        require(
            email,
            ValidationError::missing("signIn", "email", "email must be provided"),
        )?;
        require(
            password,
            ValidationError::missing("signIn", "password", "password must be provided"),
        )?;
        Ok(Operation::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn confirm_user(one_time_key: &str, password: &str) -> Result<Self, ValidationError> {
        require(
            one_time_key,
            ValidationError::missing("confirmUser", "oneTimeKey", "oneTimeKey is not defined"),
        )?;
        require(
            password,
            ValidationError::missing("confirmUser", "password", "You must pass a password"),
        )?;
        Ok(Operation::ConfirmUser {
            one_time_key: one_time_key.to_string(),
            password: password.to_string(),
        })
    }

    pub fn confirm_dapp_user(request_key: &str) -> Result<Self, ValidationError> {
        require(
            request_key,
            ValidationError::missing("confirmDappUser", "requestKey", "requestKey is not defined"),
        )?;
        Ok(Operation::ConfirmDappUser {
            request_key: request_key.to_string(),
        })
    }

    pub fn name(&self) -> OperationName {
        match self {
            Operation::CurrentUser => OperationName::CurrentUser,
            Operation::JwtToken => OperationName::JwtToken,
            Operation::DappUser { .. } => OperationName::DappUser,
            Operation::SignIn { .. } => OperationName::SignIn,
            Operation::ConfirmUser { .. } => OperationName::ConfirmUser,
            Operation::ConfirmDappUser { .. } => OperationName::ConfirmDappUser,
        }
    }
}

// Arguments carry credentials; only the operation name is printed.
impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operation({})", self.name().as_str())
    }
}

fn require(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

fn str_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name)?.as_str()
}

fn id_arg(args: &Map<String, Value>, name: &str) -> Option<String> {
    id_key(args.get(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn sign_in_requires_email_then_password() {
        let err = Operation::sign_in("", "").unwrap_err();
        assert_eq!(err.argument, "email");
        assert_eq!(err.message, "email must be provided");

        let err = Operation::sign_in("a@notus.events", "").unwrap_err();
        assert_eq!(err.argument, "password");
        assert_eq!(err.message, "password must be provided");

        assert!(Operation::sign_in("a@notus.events", "pw").is_ok());
    }

    #[test]
    fn confirm_user_messages() {
        assert_eq!(
            Operation::confirm_user("", "pw").unwrap_err().message,
            "oneTimeKey is not defined"
        );
        assert_eq!(
            Operation::confirm_user("key", "").unwrap_err().message,
            "You must pass a password"
        );
    }

    #[test]
    fn with_args_reads_named_arguments() {
        let op = OperationName::SignIn
            .with_args(&args(json!({"email": "a", "password": "b"})))
            .unwrap();
        assert_eq!(
            op,
            Operation::SignIn {
                email: "a".to_string(),
                password: "b".to_string()
            }
        );

        let op = OperationName::DappUser
            .with_args(&args(json!({"dappUserId": 42})))
            .unwrap();
        assert_eq!(
            op,
            Operation::DappUser {
                dapp_user_id: "42".to_string()
            }
        );
    }

    #[test]
    fn with_args_rejects_missing_or_mistyped_arguments() {
        let err = OperationName::DappUser.with_args(&Map::new()).unwrap_err();
        assert_eq!(err.message, "You must pass the dappUserId");

        let err = OperationName::ConfirmDappUser
            .with_args(&args(json!({"requestKey": 5})))
            .unwrap_err();
        assert_eq!(err.message, "requestKey is not defined");

        let err = OperationName::SignIn
            .with_args(&args(json!({"email": null, "password": "x"})))
            .unwrap_err();
        assert_eq!(err.argument, "email");
    }

    #[test]
    fn names_and_kinds() {
        assert_eq!(OperationName::DappUser.kind(), OperationKind::Query);
        assert_eq!(OperationName::CurrentUser.kind(), OperationKind::Query);
        assert_eq!(OperationName::SignIn.kind(), OperationKind::Mutation);
        assert_eq!(OperationName::ConfirmDappUser.as_str(), "confirmDappUser");
        assert_eq!(Operation::JwtToken.name(), OperationName::JwtToken);
        assert_eq!(OperationKind::Mutation.to_string(), "Mutation");
    }

    #[test]
    fn debug_hides_arguments() {
        let op = Operation::sign_in("a@notus.events", "hunter2").unwrap();
        let printed = format!("{op:?}");
        assert_eq!(printed, "Operation(signIn)");
    }
}
