// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side queries and fragments the resolvers write through.

use crate::cache::{ClientQuery, Fragment};
use crate::models::DAPP_USER_TYPENAME;

/// Root field holding the session token.
pub const JWT_TOKEN_FIELD: &str = "jwtToken";

/// `query currentUserQuery { currentUser @client { id email confirmedAt } }`
pub const CURRENT_USER_QUERY: ClientQuery = ClientQuery {
    name: "currentUserQuery",
    root_field: "currentUser",
    fields: &["id", "email", "confirmedAt"],
};

/// `fragment DappUserFragment on DappUser { id name email ethereumAddress confirmedAt }`
///
/// The whole response is written; unselected fields are kept.
pub const DAPP_USER_FRAGMENT: Fragment = Fragment {
    name: "DappUserFragment",
    type_condition: DAPP_USER_TYPENAME,
};
